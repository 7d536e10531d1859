//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! qrmagic.toml (optional)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → QrMagicConfig (validated)
//!     → CLI flags override individual fields
//!     → handed by reference to client, throttle and sessions
//! ```
//!
//! # Design Decisions
//! - All fields have defaults so an absent file is a valid configuration
//! - Validation separates syntactic (serde) from semantic checks
//! - Validation reports every problem, not just the first

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::ApiConfig;
pub use schema::ImageSortConfig;
pub use schema::ObservabilityConfig;
pub use schema::QrMagicConfig;
pub use schema::RetryConfig;
pub use schema::ThrottleConfig;
pub use schema::TimeoutConfig;
