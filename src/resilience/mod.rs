//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! API call:
//!     → reqwest timeout (every call has a deadline)
//!     → On failure: retries.rs (classify, decide whether to retry)
//!     → backoff.rs (exponential delay with jitter before the next attempt)
//! ```
//!
//! # Design Decisions
//! - Scan and label requests are idempotent, so POST is retried
//! - Connection errors and timeouts always retryable; 429 and 5xx retryable
//! - Other 4xx are final: the request itself is wrong

pub mod backoff;
pub mod retries;

pub use backoff::calculate_backoff;
pub use retries::{is_retryable, RetryPolicy};
