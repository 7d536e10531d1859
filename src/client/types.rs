//! Wire types for the qrmagic API.

use serde::{Deserialize, Serialize};

/// Body of `POST /api/scan-image`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScanRequest {
    pub filename: String,
    /// Image bytes as a base64 data URL.
    pub content: String,
}

/// What the server found in one image.
///
/// Also the line format of scan NDJSON files.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScanResponse {
    pub filename: String,
    /// Decoded QR payloads, `null` when none were found.
    pub qrcodes: Option<Vec<String>>,
    pub camera: Option<String>,
    /// EXIF capture time, ISO-8601.
    pub datetime: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub alt: Option<f64>,
    /// Mid-size JPEG preview as a data URL.
    pub midsize: Option<String>,
}

/// Body of the label PDF endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum LabelPdfRequest {
    /// Explicit IDs, one per line.
    IdList {
        label_type: String,
        layout: String,
        ids_txt: String,
    },
    /// IDs rendered from a format over an inclusive range.
    IdRange {
        label_type: String,
        layout: String,
        id_format: String,
        id_start: i64,
        id_end: i64,
    },
}

impl LabelPdfRequest {
    pub fn label_type(&self) -> &str {
        match self {
            Self::IdList { label_type, .. } | Self::IdRange { label_type, .. } => label_type,
        }
    }

    pub fn layout(&self) -> &str {
        match self {
            Self::IdList { layout, .. } | Self::IdRange { layout, .. } => layout,
        }
    }
}
