//! Label sheet types and their geometry.
//!
//! Sizes are in millimetres. The set and the numbers match the label maker
//! used by the PDF service, so a sheet previewed here prints the same there.

use serde::Serialize;

use crate::error::{QrMagicError, QrResult};

const STANDARD_LAYOUTS: &[&str] = &[
    "qr_left",
    "qr_left_texttop",
    "qr_right",
    "multiline_text",
    "multiline_text_right",
    "top_half",
    "qr_multiline",
];

/// A commercial label sheet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LabelType {
    pub name: &'static str,
    pub description: &'static str,
    pub layouts: &'static [&'static str],
    pub default_layout: &'static str,
    /// Sheet width × height.
    pub page_size: (f64, f64),
    pub ncol: usize,
    pub nrow: usize,
    /// Single label width × height.
    pub label_size: (f64, f64),
    /// Edge length of the QR code.
    pub qr_size: f64,
    pub font_size: u32,
}

impl LabelType {
    /// Labels on one sheet.
    pub fn per_sheet(&self) -> usize {
        self.nrow * self.ncol
    }

    pub fn title(&self) -> String {
        format!("{}: {}", self.name, self.description)
    }

    pub fn supports(&self, layout: &str) -> bool {
        self.layouts.contains(&layout)
    }

    /// The requested layout if supported, otherwise the type's default when none was asked for.
    pub fn resolve_layout(&self, layout: Option<&str>) -> QrResult<&'static str> {
        match layout {
            None => Ok(self.default_layout),
            Some(layout) => self
                .layouts
                .iter()
                .copied()
                .find(|l| *l == layout)
                .ok_or_else(|| QrMagicError::UnsupportedLayout {
                    label_type: self.name.to_string(),
                    layout: layout.to_string(),
                    supported: self.layouts.join(", "),
                }),
        }
    }

    /// One line of `labels list` output.
    pub fn list_line(&self) -> String {
        format!(
            "{}:  {} (supports layouts: {})",
            self.name,
            self.description,
            self.layouts.join(", ")
        )
    }
}

/// Every supported label type, in display order.
pub const LABEL_TYPES: &[LabelType] = &[
    LabelType {
        name: "L7636",
        description: "Mid-sized rounded rectangular labels (45x22mm) in sheets of 4x12",
        layouts: STANDARD_LAYOUTS,
        default_layout: "qr_left",
        page_size: (210.0, 297.0),
        ncol: 4,
        nrow: 12,
        label_size: (45.7, 21.2),
        qr_size: 16.0,
        font_size: 15,
    },
    LabelType {
        name: "L3667",
        description: "Mid-sized rectangular labels (48x17mm) in sheets of 4x16",
        layouts: STANDARD_LAYOUTS,
        default_layout: "qr_left",
        page_size: (210.0, 297.0),
        ncol: 4,
        nrow: 16,
        label_size: (48.5, 16.9),
        qr_size: 13.0,
        font_size: 12,
    },
    LabelType {
        name: "L3666",
        description: "Mid-sized rectangular labels (38x22mm) in sheets of 5x13",
        layouts: STANDARD_LAYOUTS,
        default_layout: "qr_left",
        page_size: (210.0, 297.0),
        ncol: 5,
        nrow: 13,
        label_size: (38.0, 21.2),
        qr_size: 13.0,
        font_size: 12,
    },
    LabelType {
        name: "L7658",
        description: "Small labels (25x10mm) in sheets of 7x27",
        layouts: &["qr_left", "qr_right"],
        default_layout: "qr_left",
        page_size: (210.0, 297.0),
        ncol: 7,
        nrow: 27,
        label_size: (25.4, 10.0),
        qr_size: 7.5,
        font_size: 11,
    },
    LabelType {
        name: "Avery94214",
        description: "Long Labels for 5mL eppies (American).",
        layouts: &["qr_left", "qr_right"],
        default_layout: "qr_left",
        page_size: (215.9, 279.4),
        ncol: 2,
        nrow: 16,
        label_size: (76.2, 15.875),
        qr_size: 8.0,
        font_size: 10,
    },
    LabelType {
        name: "Herma4265",
        description: "Large rectangular address labels (for large qrcodes), sheets of 18",
        layouts: &["qr_right_verticaltext", "qr_left_verticaltext"],
        default_layout: "qr_left_verticaltext",
        page_size: (210.0, 297.0),
        ncol: 3,
        nrow: 6,
        label_size: (63.5, 46.56),
        qr_size: 40.0,
        font_size: 24,
    },
    LabelType {
        name: "Zweckform6252",
        description: "Square 45mm labels, sheets of 20.",
        layouts: &["qr_top", "qr_right_verticaltext", "qr_left_verticaltext"],
        default_layout: "qr_top",
        page_size: (210.0, 297.0),
        ncol: 4,
        nrow: 5,
        label_size: (45.0, 45.0),
        qr_size: 35.0,
        font_size: 12,
    },
    LabelType {
        name: "Zweckform3671",
        description: "64x45mm labels, sheets of 18.",
        layouts: &[
            "qr_top",
            "qr_right_verticaltext",
            "qr_left_verticaltext",
            "qr_left",
            "qr_right",
        ],
        default_layout: "qr_left_verticaltext",
        page_size: (210.0, 297.0),
        ncol: 3,
        nrow: 6,
        label_size: (64.0, 45.0),
        qr_size: 38.0,
        font_size: 12,
    },
    LabelType {
        name: "CryoLabel",
        description: "Cryo Labels for screw-cap eppies. White on left half, clear on right. 63mmx15mm in sheets of 3x18",
        layouts: &["qr_left", "qr_left_texttop", "qr_multiline"],
        default_layout: "qr_left",
        page_size: (210.0, 297.0),
        ncol: 3,
        nrow: 18,
        label_size: (63.0, 15.0),
        qr_size: 9.0,
        font_size: 10,
    },
    LabelType {
        name: "LCRY1700",
        description: "Cryo Labels on American paper",
        layouts: &[
            "qr_left",
            "qr_right",
            "multiline_text",
            "multiline_text_right",
            "qr_multiline",
        ],
        default_layout: "qr_left",
        page_size: (215.9, 279.4),
        ncol: 5,
        nrow: 17,
        label_size: (32.512, 12.7),
        qr_size: 8.0,
        font_size: 8,
    },
];

/// Look up a label type by name; falls back to a case-insensitive match.
pub fn find_label_type(name: &str) -> QrResult<&'static LabelType> {
    LABEL_TYPES
        .iter()
        .find(|lt| lt.name == name)
        .or_else(|| LABEL_TYPES.iter().find(|lt| lt.name.eq_ignore_ascii_case(name)))
        .ok_or_else(|| QrMagicError::UnknownLabelType(name.to_string()))
}
