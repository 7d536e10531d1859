//! Label sheet editor state.

use crate::client::LabelPdfRequest;
use crate::error::{QrMagicError, QrResult};
use crate::labels::catalog::{find_label_type, LabelType};
use crate::labels::ids::validate_id_format;

/// Command line tool that prints a label list on the operator's machine.
pub const PRINT_TOOL: &str = "qrmagic-labelprint";

/// Default file name of the label list artifact.
pub const LABEL_LIST_NAME: &str = "labels.txt";

/// Default file name of the label PDF artifact.
pub const LABEL_PDF_NAME: &str = "labels.pdf";

/// One sheet of labels being edited.
///
/// `cells` always holds exactly `nrow * ncol` entries for the selected type,
/// row-major.
#[derive(Debug, Clone, Default)]
pub struct LabelSheet {
    label_type: Option<&'static LabelType>,
    layout: Option<&'static str>,
    cells: Vec<String>,
}

impl LabelSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn label_type(&self) -> Option<&'static LabelType> {
        self.label_type
    }

    pub fn layout(&self) -> Option<&'static str> {
        self.layout
    }

    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    /// Switch to another label type.
    ///
    /// The layout resets to the type's default. Existing cell text is kept up to
    /// the new sheet size; extra cells start empty.
    pub fn select(&mut self, name: &str) -> QrResult<&'static LabelType> {
        let label_type = find_label_type(name)?;
        self.label_type = Some(label_type);
        self.layout = Some(label_type.default_layout);
        self.cells.resize(label_type.per_sheet(), String::new());
        tracing::debug!(
            label_type = label_type.name,
            layout = label_type.default_layout,
            cells = self.cells.len(),
            "Label type selected"
        );
        Ok(label_type)
    }

    pub fn set_layout(&mut self, layout: &str) -> QrResult<()> {
        let label_type = self.label_type.ok_or(QrMagicError::NoLabelType)?;
        self.layout = Some(label_type.resolve_layout(Some(layout))?);
        Ok(())
    }

    pub fn set_cell(&mut self, index: usize, text: impl Into<String>) -> QrResult<()> {
        let len = self.cells.len();
        let cell = self
            .cells
            .get_mut(index)
            .ok_or(QrMagicError::IndexOutOfRange { index, len })?;
        *cell = text.into();
        Ok(())
    }

    /// Write `ids` into the cells in order, clearing the rest.
    ///
    /// Returns how many IDs did not fit on the sheet.
    pub fn fill<I, S>(&mut self, ids: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ids = ids.into_iter();
        for cell in self.cells.iter_mut() {
            *cell = ids.next().map(Into::into).unwrap_or_default();
        }
        let overflow = ids.count();
        if overflow > 0 {
            tracing::warn!(overflow, per_sheet = self.cells.len(), "IDs do not fit on one sheet");
        }
        overflow
    }

    /// Cells grouped by sheet row.
    pub fn rows(&self) -> impl Iterator<Item = &[String]> {
        let ncol = self.label_type.map_or(1, |lt| lt.ncol.max(1));
        self.cells.chunks(ncol)
    }

    /// Contents of the label list artifact.
    pub fn label_list(&self) -> String {
        self.cells.join("\n")
    }

    /// Shell command printing the label list, once a type is selected.
    pub fn command(&self) -> Option<String> {
        let label_type = self.label_type?;
        let layout = self.layout.unwrap_or(label_type.default_layout);
        Some(format!(
            "{PRINT_TOOL} --output {LABEL_PDF_NAME} --id-file {LABEL_LIST_NAME} --label-type {} --layout {}",
            label_type.name, layout
        ))
    }

    /// PDF request for the current cells.
    pub fn id_list_request(&self) -> QrResult<LabelPdfRequest> {
        self.ids_request(&self.cells)
    }

    /// PDF request for `ids` in this sheet's type and layout. The service adds
    /// sheets as needed, so `ids` may exceed one sheet.
    pub fn ids_request(&self, ids: &[String]) -> QrResult<LabelPdfRequest> {
        let (label_type, layout) = self.selection()?;
        Ok(LabelPdfRequest::IdList {
            label_type: label_type.name.to_string(),
            layout: layout.to_string(),
            ids_txt: ids.join("\n"),
        })
    }

    /// PDF request rendering `id_format` over `id_start..=id_end` server side.
    pub fn range_request(&self, id_format: &str, id_start: i64, id_end: i64) -> QrResult<LabelPdfRequest> {
        let (label_type, layout) = self.selection()?;
        validate_id_format(id_format)?;
        Ok(LabelPdfRequest::IdRange {
            label_type: label_type.name.to_string(),
            layout: layout.to_string(),
            id_format: id_format.to_string(),
            id_start,
            id_end,
        })
    }

    fn selection(&self) -> QrResult<(&'static LabelType, &'static str)> {
        let label_type = self.label_type.ok_or(QrMagicError::NoLabelType)?;
        Ok((label_type, self.layout.unwrap_or(label_type.default_layout)))
    }
}
