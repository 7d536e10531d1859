//! qrmagic client library.
//!
//! Talks to the qrmagic image-scanning and label-PDF endpoints and does the
//! client-side work around them: ordering scanned photos by capture time,
//! filling missing specimen IDs from neighbouring photos, writing rename
//! scripts, editing label sheets and browsing locality maps.

// Data
pub mod capture;
pub mod config;
pub mod error;

// Remote API
pub mod client;
pub mod throttle;

// Front-ends
pub mod imagesort;
pub mod labels;
pub mod localities;

// Cross-cutting concerns
pub mod observability;
pub mod resilience;

pub use client::QrMagicClient;
pub use config::QrMagicConfig;
pub use error::{QrMagicError, QrResult};
pub use imagesort::ImageSortSession;
pub use labels::LabelSheet;
pub use localities::MapView;
pub use throttle::RequestThrottle;
