//! Batch scanning of image files.
//!
//! Every file is sent to the scan endpoint through the client's throttle. A
//! failed item is logged and skipped; the progress counter still advances, so
//! a finished batch always reports `done == total`.

use std::path::PathBuf;

use futures_util::stream::{self, StreamExt};
use serde::Serialize;

use crate::client::{QrMagicClient, ScanResponse};
use crate::observability::metrics;

/// Batch progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub done: usize,
    pub total: usize,
}

impl Progress {
    pub fn new(total: usize) -> Self {
        Self { done: 0, total }
    }

    pub fn is_complete(&self) -> bool {
        self.done >= self.total
    }
}

/// An item that could not be scanned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedItem {
    pub path: PathBuf,
    pub error: String,
}

/// Result of a whole batch.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub progress: Progress,
    pub scanned: usize,
    pub failed: Vec<FailedItem>,
}

/// Scan `paths`, calling `on_scanned` for each success in completion order.
pub async fn scan_batch<F>(client: &QrMagicClient, paths: &[PathBuf], mut on_scanned: F) -> BatchReport
where
    F: FnMut(ScanResponse),
{
    let mut report = BatchReport {
        progress: Progress::new(paths.len()),
        ..Default::default()
    };
    if paths.is_empty() {
        return report;
    }

    // Keep the throttle saturated without reading every file into memory up front.
    let read_ahead = client.throttle().max_in_flight() * 2;
    tracing::info!(total = paths.len(), max_in_flight = client.throttle().max_in_flight(), "Scanning images");

    let mut results = stream::iter(paths.iter().cloned())
        .map(|path| async move {
            let result = client.scan_file(&path).await;
            (path, result)
        })
        .buffer_unordered(read_ahead);

    while let Some((path, result)) = results.next().await {
        match result {
            Ok(response) => {
                metrics::record_scan("ok");
                report.scanned += 1;
                on_scanned(response);
            }
            Err(e) => {
                metrics::record_scan("failed");
                tracing::warn!(path = %path.display(), error = %e, "Scan failed, skipping image");
                report.failed.push(FailedItem {
                    path,
                    error: e.to_string(),
                });
            }
        }
        report.progress.done += 1;
        tracing::debug!(done = report.progress.done, total = report.progress.total, "Batch progress");
    }

    tracing::info!(
        scanned = report.scanned,
        failed = report.failed.len(),
        total = report.progress.total,
        "Batch complete"
    );
    report
}
