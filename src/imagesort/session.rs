//! Image sorter state.
//!
//! Holds everything the sorter view shows: the records in capture order, the
//! progress of the last import, the hide-filled filter and the zoomed preview.
//! Handlers receive the session by reference instead of sharing globals.

use std::path::{Path, PathBuf};

use crate::capture::{self, ndjson, BackfillPolicy, CaptureRecord, IdStyle};
use crate::client::{QrMagicClient, ScanResponse};
use crate::config::ImageSortConfig;
use crate::error::{QrMagicError, QrResult};
use crate::imagesort::batch::{scan_batch, BatchReport, Progress};
use crate::imagesort::script::renamer_script;

/// Image sorter session.
#[derive(Debug, Clone, Default)]
pub struct ImageSortSession {
    pub config: ImageSortConfig,
    records: Vec<CaptureRecord>,
    progress: Option<Progress>,
    /// Only show images that still lack an ID.
    pub hide_filled: bool,
    zoomed: Option<String>,
}

impl ImageSortSession {
    pub fn new(config: ImageSortConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn records(&self) -> &[CaptureRecord] {
        &self.records
    }

    pub fn progress(&self) -> Option<Progress> {
        self.progress
    }

    pub fn id_style(&self) -> IdStyle {
        IdStyle::from(&self.config)
    }

    pub fn backfill_policy(&self) -> BackfillPolicy {
        self.config.backfill_policy()
    }

    /// Add one scan result. Call [`sort_by_time`](Self::sort_by_time) after a batch.
    pub fn push_response(&mut self, response: ScanResponse) {
        let style = self.id_style();
        self.records.push(CaptureRecord::from_response(response, &style));
    }

    /// Add previously saved scan results and re-sort.
    pub fn import_responses(&mut self, responses: Vec<ScanResponse>) -> usize {
        let mut progress = Progress::new(responses.len());
        for response in responses {
            self.push_response(response);
            progress.done += 1;
        }
        self.progress = Some(progress);
        self.sort_by_time();
        progress.done
    }

    /// Import an NDJSON file written by `qrmagic scan`.
    ///
    /// Progress counts every non-blank line, including the ones skipped as
    /// malformed. Returns the number of records added.
    pub fn import_ndjson(&mut self, path: &Path) -> QrResult<usize> {
        let batch = ndjson::load_ndjson_file(path)?;
        let skipped = batch.skipped;
        let imported = self.import_responses(batch.responses);
        if let Some(progress) = self.progress.as_mut() {
            progress.total += skipped;
            progress.done += skipped;
        }
        Ok(imported)
    }

    /// Scan image files through the API and add the results.
    ///
    /// Failed images are skipped; the batch always runs to completion.
    pub async fn scan_files(&mut self, client: &QrMagicClient, paths: &[PathBuf]) -> BatchReport {
        self.progress = Some(Progress::new(paths.len()));

        let style = self.id_style();
        let records = &mut self.records;
        let report = scan_batch(client, paths, |response| {
            records.push(CaptureRecord::from_response(response, &style));
        })
        .await;

        self.progress = Some(report.progress);
        self.sort_by_time();
        report
    }

    pub fn sort_by_time(&mut self) {
        capture::sort_by_time(&mut self.records);
    }

    /// Fill every empty ID from its neighbours. Returns how many were set.
    pub fn autofill_all(&mut self) -> usize {
        let policy = self.backfill_policy();
        capture::fill_all(&mut self.records, &policy)
    }

    /// Fill a single record's ID from its neighbours.
    pub fn fill_one(&mut self, index: usize) -> QrResult<bool> {
        self.check_index(index)?;
        let policy = self.backfill_policy();
        Ok(capture::fill_one(&mut self.records, index, &policy))
    }

    /// Set an ID by hand.
    pub fn set_id(&mut self, index: usize, id: impl Into<String>) -> QrResult<()> {
        self.check_index(index)?;
        self.records[index].id = id.into();
        Ok(())
    }

    /// Drop a record from the session.
    pub fn remove(&mut self, index: usize) -> QrResult<CaptureRecord> {
        self.check_index(index)?;
        let removed = self.records.remove(index);
        if self.zoomed.is_some() && self.zoomed == removed.image {
            self.zoomed = None;
        }
        Ok(removed)
    }

    /// Records shown in the table, with their positions.
    pub fn visible(&self) -> impl Iterator<Item = (usize, &CaptureRecord)> {
        let hide_filled = self.hide_filled;
        self.records
            .iter()
            .enumerate()
            .filter(move |(_, r)| !(hide_filled && r.has_id()))
    }

    pub fn unlabelled_count(&self) -> usize {
        self.records.iter().filter(|r| !r.has_id()).count()
    }

    /// Show a record's preview, or hide it if it is already shown.
    pub fn toggle_zoom(&mut self, index: usize) -> QrResult<Option<&str>> {
        self.check_index(index)?;
        let image = self.records[index].image.clone();
        if self.zoomed.is_some() && self.zoomed == image {
            self.zoomed = None;
        } else {
            self.zoomed = image;
        }
        Ok(self.zoomed.as_deref())
    }

    pub fn clear_zoom(&mut self) {
        self.zoomed = None;
    }

    pub fn zoomed(&self) -> Option<&str> {
        self.zoomed.as_deref()
    }

    /// Shell script moving each labelled image into a directory named by its ID.
    pub fn renamer_script(&self) -> QrResult<String> {
        renamer_script(&self.records)
    }

    fn check_index(&self, index: usize) -> QrResult<()> {
        if index < self.records.len() {
            Ok(())
        } else {
            Err(QrMagicError::IndexOutOfRange {
                index,
                len: self.records.len(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(filename: &str, codes: &[&str], datetime: &str) -> ScanResponse {
        ScanResponse {
            filename: filename.into(),
            qrcodes: (!codes.is_empty()).then(|| codes.iter().map(|c| c.to_string()).collect()),
            datetime: Some(datetime.into()),
            midsize: Some(format!("data:image/jpeg;base64,{filename}")),
            ..Default::default()
        }
    }

    fn session() -> ImageSortSession {
        let mut session = ImageSortSession::new(ImageSortConfig::default());
        session.import_responses(vec![
            response("c.jpg", &[], "2021-05-03T12:00:40"),
            response("a.jpg", &["KDM001"], "2021-05-03T12:00:00"),
            response("b.jpg", &[], "2021-05-03T12:00:10"),
        ]);
        session
    }

    #[test]
    fn test_import_sorts_and_counts() {
        let session = session();
        let names: Vec<_> = session.records().iter().map(|r| r.filename.as_str()).collect();
        assert_eq!(names, vec!["a.jpg", "b.jpg", "c.jpg"]);
        assert_eq!(session.progress(), Some(Progress { done: 3, total: 3 }));
        assert_eq!(session.unlabelled_count(), 2);
    }

    #[test]
    fn test_ndjson_import_counts_skipped_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scans.ndjson");
        let mut bytes = Vec::new();
        ndjson::write_ndjson_line(&mut bytes, &response("b.jpg", &[], "2021-05-03T12:00:10")).unwrap();
        bytes.extend_from_slice(b"{\"filename\": \xff}\n\n{truncated\n");
        ndjson::write_ndjson_line(&mut bytes, &response("a.jpg", &["KDM001"], "2021-05-03T12:00:00")).unwrap();
        std::fs::write(&path, bytes).unwrap();

        let mut session = ImageSortSession::new(ImageSortConfig::default());
        assert_eq!(session.import_ndjson(&path).unwrap(), 2);
        assert_eq!(session.progress(), Some(Progress { done: 4, total: 4 }));
        assert!(session.progress().unwrap().is_complete());
        assert_eq!(session.records()[0].filename, "a.jpg");
    }

    #[test]
    fn test_autofill_and_hide_filled() {
        let mut session = session();
        assert_eq!(session.autofill_all(), 1);
        assert_eq!(session.records()[1].id, "KDM001");
        // c.jpg is 30s after b.jpg: not strictly below the threshold.
        assert_eq!(session.records()[2].id, "");

        session.hide_filled = true;
        let visible: Vec<_> = session.visible().map(|(i, _)| i).collect();
        assert_eq!(visible, vec![2]);
    }

    #[test]
    fn test_fill_one_and_manual_id() {
        let mut session = session();
        assert!(session.fill_one(1).unwrap());
        assert!(session.fill_one(2).is_ok());
        session.set_id(2, "KDM002").unwrap();
        assert_eq!(session.records()[2].id, "KDM002");
        assert!(matches!(
            session.fill_one(7),
            Err(QrMagicError::IndexOutOfRange { index: 7, len: 3 })
        ));
    }

    #[test]
    fn test_zoom_toggle_and_remove() {
        let mut session = session();
        assert_eq!(session.toggle_zoom(0).unwrap(), Some("data:image/jpeg;base64,a.jpg"));
        assert_eq!(session.toggle_zoom(0).unwrap(), None);
        session.toggle_zoom(2).unwrap();
        session.clear_zoom();
        assert!(session.zoomed().is_none());

        session.toggle_zoom(1).unwrap();
        let removed = session.remove(1).unwrap();
        assert_eq!(removed.filename, "b.jpg");
        assert!(session.zoomed().is_none());
        assert_eq!(session.records().len(), 2);
    }

    #[test]
    fn test_renamer_script_uses_current_ids() {
        let mut session = session();
        session.autofill_all();
        let script = session.renamer_script().unwrap();
        assert_eq!(script.lines().count(), 3);
        assert!(script.contains("KDM001/b.jpg"));
    }
}
