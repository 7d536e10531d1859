//! Crate-wide error type.

use thiserror::Error;

use crate::config::loader::ConfigError;

/// Errors that can occur while talking to the qrmagic API or producing artifacts.
#[derive(Debug, Error)]
pub enum QrMagicError {
    /// Connection, timeout or body decoding failure in the HTTP client.
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("{endpoint} returned status {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// Local file I/O failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// An endpoint path could not be joined onto the base URL.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Label type is not in the catalog.
    #[error("Unknown label type '{0}'")]
    UnknownLabelType(String),

    #[error("No label type selected")]
    NoLabelType,

    /// Layout is not supported by the selected label type.
    #[error("Layout '{layout}' is not supported by label type {label_type} (supports: {supported})")]
    UnsupportedLayout {
        label_type: String,
        layout: String,
        supported: String,
    },

    /// An ID format string could not be rendered.
    #[error("Invalid ID format '{format}': {reason}")]
    IdFormat { format: String, reason: String },

    #[error("Unknown locality '{0}'")]
    UnknownLocality(String),

    /// A filename or ID cannot be represented in a POSIX shell word.
    #[error("Cannot shell-quote '{0}'")]
    Quote(String),

    /// Index outside the current record list.
    #[error("No record at index {index} (have {len})")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Result alias used throughout the library.
pub type QrResult<T> = std::result::Result<T, QrMagicError>;
