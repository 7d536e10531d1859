//! Structured logging.
//!
//! Uses the `tracing` crate. The filter comes from `RUST_LOG` when set,
//! otherwise from the configured level applied to this crate.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build the default filter directive for a level such as "info".
pub fn default_directive(level: &str) -> String {
    format!("qrmagic={level},warn")
}

/// Initialize the global tracing subscriber, writing to stderr.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(level)));

    let result = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();

    if result.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive("debug"), "qrmagic=debug,warn");
        assert!(EnvFilter::try_new(default_directive("info")).is_ok());
    }
}
