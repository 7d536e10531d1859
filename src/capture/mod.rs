//! Capture records and the heuristics applied to them.
//!
//! # Data Flow
//! ```text
//! ScanResponse (live scan or NDJSON line)
//!     → record.rs (ID from sorted QR codes, timestamp parse)
//!     → sort_by_time (stable, oldest first)
//!     → backfill.rs (copy IDs to temporally adjacent unlabelled images)
//! ```

pub mod backfill;
pub mod ndjson;
pub mod record;

pub use backfill::{fill_all, fill_one, BackfillPolicy};
pub use record::{parse_timestamp, parse_timestamp_in, sort_by_time, CaptureRecord, IdStyle};
