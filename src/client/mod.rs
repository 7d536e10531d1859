//! API client subsystem.
//!
//! # Data Flow
//! ```text
//! imagesort / labels
//!     → api.rs (build body, assign request id)
//!     → throttle (wait for a slot)
//!     → reqwest POST with timeout
//!     → resilience (retry on 429/5xx/network error with backoff)
//!     → types.rs (decode ScanResponse, or raw PDF bytes)
//! ```

pub mod api;
pub mod types;

pub use api::QrMagicClient;
pub use types::{LabelPdfRequest, ScanRequest, ScanResponse};

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";
