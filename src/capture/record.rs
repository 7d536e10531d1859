//! Capture records: one photographed image and the ID derived from its QR codes.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::client::types::ScanResponse;
use crate::config::ImageSortConfig;

/// How QR payloads are turned into a record ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdStyle {
    /// Joins several codes found in one image.
    pub separator: String,
    /// Sort codes descending instead of ascending.
    pub reverse_sort: bool,
}

impl Default for IdStyle {
    fn default() -> Self {
        Self {
            separator: "_".to_string(),
            reverse_sort: false,
        }
    }
}

impl From<&ImageSortConfig> for IdStyle {
    fn from(config: &ImageSortConfig) -> Self {
        Self {
            separator: config.qr_separator.clone(),
            reverse_sort: config.reverse_sort,
        }
    }
}

/// One image in the sorter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaptureRecord {
    /// Specimen ID; empty when unknown.
    pub id: String,
    /// QR payloads in ID order.
    pub qrcodes: Vec<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub alt: Option<f64>,
    /// Capture time as recorded by the camera (no zone).
    pub datetime: Option<NaiveDateTime>,
    /// Preview image data URL.
    pub image: Option<String>,
    pub filename: String,
    pub camera: Option<String>,
}

impl CaptureRecord {
    /// Build a record from a scan result.
    pub fn from_response(response: ScanResponse, style: &IdStyle) -> Self {
        let mut qrcodes = response.qrcodes.unwrap_or_default();
        qrcodes.sort();
        if style.reverse_sort {
            qrcodes.reverse();
        }
        let id = qrcodes.join(&style.separator);

        let datetime = response.datetime.as_deref().and_then(|raw| {
            let parsed = parse_timestamp(raw);
            if parsed.is_none() {
                tracing::warn!(filename = %response.filename, datetime = %raw, "Unparseable capture time");
            }
            parsed
        });

        Self {
            id,
            qrcodes,
            lat: response.lat,
            lng: response.lng,
            alt: response.alt,
            datetime,
            image: response.midsize,
            filename: response.filename,
            camera: response.camera,
        }
    }

    /// Whether an ID is known for this image.
    pub fn has_id(&self) -> bool {
        !self.id.is_empty()
    }

    /// Capture time as ISO-8601 text, empty when unknown.
    pub fn datestr(&self) -> String {
        self.datetime
            .map(|dt| dt.format("%Y-%m-%dT%H:%M:%S").to_string())
            .unwrap_or_default()
    }

    /// Absolute time between two captures in milliseconds, if both are timestamped.
    pub fn millis_apart(&self, other: &CaptureRecord) -> Option<u64> {
        match (self.datetime, other.datetime) {
            (Some(a), Some(b)) => Some((a - b).num_milliseconds().unsigned_abs()),
            _ => None,
        }
    }
}

/// Parse a capture time: ISO-8601 without offset, RFC 3339, or EXIF `YYYY:MM:DD HH:MM:SS`.
///
/// Times without an offset are camera wall-clock times and are taken as local
/// time. Times carrying an offset are converted to local wall-clock time, so
/// both forms order consistently within one session.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    parse_timestamp_in(raw, &Local)
}

/// [`parse_timestamp`] with an explicit zone for offset-carrying times.
pub fn parse_timestamp_in<Tz: TimeZone>(raw: &str, zone: &Tz) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y:%m:%d %H:%M:%S"))
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.with_timezone(zone).naive_local())
        })
}

/// Stable sort by capture time; records without a time come first.
pub fn sort_by_time(records: &mut [CaptureRecord]) {
    records.sort_by_key(|r| r.datetime);
}
