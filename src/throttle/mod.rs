//! Request throttling subsystem.
//!
//! # Data Flow
//! ```text
//! API call wants to go out
//!     → limiter.rs acquire() (waits in FIFO order while the ceiling is reached)
//!     → ThrottlePermit held for exactly one HTTP attempt
//!     → permit dropped on success, error or panic → next waiter admitted
//! ```
//!
//! # Design Decisions
//! - Tokio's semaphore is fair, so queued requests are admitted in arrival order
//! - The in-flight counter lives in the permit guard, never touched by hand
//! - Shared via Arc; safe on the multi-threaded runtime

pub mod limiter;

pub use limiter::{RequestThrottle, ThrottlePermit};
