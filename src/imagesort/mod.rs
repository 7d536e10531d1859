//! QR image sorter.
//!
//! # Data Flow
//! ```text
//! image files ──▶ batch.rs (throttled scan, failures skipped) ──┐
//! scans.ndjson ─────────────────────────────────────────────────┤
//!                                                               ▼
//!                         session.rs (records sorted by capture time)
//!                             → autofill / fill one / set id / remove
//!                             → script.rs (rename.sh)
//! ```

pub mod batch;
pub mod script;
pub mod session;

pub use batch::{scan_batch, BatchReport, FailedItem, Progress};
pub use script::{renamer_script, RELOCATE_FN, SCRIPT_NAME};
pub use session::ImageSortSession;
