//! Newline-delimited JSON of scan responses.
//!
//! One `ScanResponse` object per line. Blank lines are ignored. Malformed lines,
//! including ones that are not valid UTF-8, are logged, counted and skipped.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::client::types::ScanResponse;
use crate::error::QrResult;

/// Responses parsed from an NDJSON source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NdjsonBatch {
    pub responses: Vec<ScanResponse>,
    /// Non-blank lines that could not be decoded.
    pub skipped: usize,
}

impl NdjsonBatch {
    /// Non-blank lines seen, decoded or not.
    pub fn lines(&self) -> usize {
        self.responses.len() + self.skipped
    }
}

/// Parse scan responses from NDJSON bytes.
///
/// Lines are decoded as raw bytes, so a line with invalid UTF-8 is skipped like
/// any other malformed line. Only read failures abort.
pub fn read_ndjson<R: BufRead>(reader: R) -> QrResult<NdjsonBatch> {
    let mut batch = NdjsonBatch::default();
    for (lineno, line) in reader.split(b'\n').enumerate() {
        let raw = line?;
        let line = raw.strip_suffix(b"\r").unwrap_or(&raw[..]);
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }
        match serde_json::from_slice::<ScanResponse>(line) {
            Ok(response) => batch.responses.push(response),
            Err(e) => {
                batch.skipped += 1;
                tracing::warn!(line = lineno + 1, error = %e, "Skipping malformed NDJSON line");
            }
        }
    }
    Ok(batch)
}

/// Read an NDJSON file of scan responses.
pub fn load_ndjson_file(path: &Path) -> QrResult<NdjsonBatch> {
    let file = File::open(path)?;
    let batch = read_ndjson(BufReader::new(file))?;
    tracing::info!(
        path = %path.display(),
        records = batch.responses.len(),
        skipped = batch.skipped,
        "Loaded scan results"
    );
    Ok(batch)
}

/// Append one response as a single NDJSON line.
pub fn write_ndjson_line<W: Write>(writer: &mut W, response: &ScanResponse) -> QrResult<()> {
    serde_json::to_writer(&mut *writer, response)?;
    writer.write_all(b"\n")?;
    Ok(())
}

/// Write all responses to `path`, one per line.
pub fn save_ndjson_file(path: &Path, responses: &[ScanResponse]) -> QrResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for response in responses {
        write_ndjson_line(&mut writer, response)?;
    }
    writer.flush()?;
    Ok(())
}
