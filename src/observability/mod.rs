//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! client / throttle / imagesort produce:
//!     → logging.rs (structured log events on stderr)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → terminal (stderr, so stdout stays pipeable)
//!     → Prometheus scrape, when an exporter address is configured
//! ```
//!
//! # Design Decisions
//! - Structured fields on every event (filename, request_id, status)
//! - Metrics are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
