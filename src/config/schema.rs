//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the client.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::capture::backfill::BackfillPolicy;

/// Root configuration for qrmagic.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct QrMagicConfig {
    /// API server location and endpoint paths.
    pub api: ApiConfig,

    /// Concurrent request ceiling.
    pub throttle: ThrottleConfig,

    /// Retry configuration.
    pub retries: RetryConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Image sorter behaviour (ID building and backfill).
    pub imagesort: ImageSortConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// API server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the qrmagic API server (e.g., "http://localhost:8000").
    pub base_url: String,

    /// Path of the image scanning endpoint, relative to `base_url`.
    ///
    /// A relative path keeps any path prefix of `base_url`. A path starting
    /// with '/' resolves against the host root instead.
    pub scan_path: String,

    /// Path of the label PDF generation endpoint, relative to `base_url`.
    pub labels_path: String,
}

impl ApiConfig {
    /// Resolve an endpoint path against `base_url`.
    ///
    /// `base_url` is treated as a directory even without a trailing '/', so
    /// `http://host/qrmagic` with `api/scan-image` gives
    /// `http://host/qrmagic/api/scan-image`.
    pub fn endpoint(&self, path: &str) -> Result<Url, url::ParseError> {
        let mut base = Url::parse(&self.base_url)?;
        if !base.path().ends_with('/') {
            let dir = format!("{}/", base.path());
            base.set_path(&dir);
        }
        base.join(path)
    }

    pub fn scan_url(&self) -> Result<Url, url::ParseError> {
        self.endpoint(&self.scan_path)
    }

    pub fn labels_url(&self) -> Result<Url, url::ParseError> {
        self.endpoint(&self.labels_path)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            scan_path: "api/scan-image".to_string(),
            labels_path: "api/label-pdf".to_string(),
        }
    }
}

/// Request throttle configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ThrottleConfig {
    /// Maximum number of requests in flight at once.
    pub max_in_flight: usize,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self { max_in_flight: 5 }
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Enable retries.
    pub enabled: bool,

    /// Maximum number of attempts, including the first one.
    pub max_attempts: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts: 5,
            base_delay_ms: 100,
            max_delay_ms: 5000,
        }
    }
}

/// Timeout configuration for HTTP calls.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 10,
        }
    }
}

/// Image sorter configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ImageSortConfig {
    /// An ID is copied to a neighbouring image taken less than this many seconds away.
    pub persist_id_for_secs: u64,

    /// Also fill an empty ID from the following image.
    pub fill_from_next: bool,

    /// Separator used when an image shows several QR codes.
    pub qr_separator: String,

    /// Sort QR codes descending before joining them.
    pub reverse_sort: bool,
}

impl Default for ImageSortConfig {
    fn default() -> Self {
        Self {
            persist_id_for_secs: 30,
            fill_from_next: false,
            qr_separator: "_".to_string(),
            reverse_sort: false,
        }
    }
}

impl ImageSortConfig {
    /// Backfill policy described by this configuration.
    pub fn backfill_policy(&self) -> BackfillPolicy {
        BackfillPolicy {
            threshold: Duration::from_secs(self.persist_id_for_secs),
            fill_from_next: self.fill_from_next,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Prometheus exporter bind address; no exporter when unset.
    pub metrics_address: Option<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_address: None,
        }
    }
}
