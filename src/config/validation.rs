//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (ceilings > 0, timeouts > 0)
//! - Check the base URL and endpoint paths can form request URLs
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: QrMagicConfig → Result<(), Vec<ValidationError>>

use std::fmt;

use url::Url;

use crate::config::schema::QrMagicConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check a parsed configuration for values serde cannot rule out.
pub fn validate_config(config: &QrMagicConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match Url::parse(&config.api.base_url) {
        Ok(url) if url.cannot_be_a_base() => {
            errors.push(ValidationError::new("api.base_url", "must be an absolute http(s) URL"));
        }
        Ok(_) => {}
        Err(e) => errors.push(ValidationError::new("api.base_url", e.to_string())),
    }
    for (field, path) in [
        ("api.scan_path", &config.api.scan_path),
        ("api.labels_path", &config.api.labels_path),
    ] {
        if path.trim().is_empty() {
            errors.push(ValidationError::new(field, "must not be empty"));
        } else if Url::parse(path).is_ok() {
            errors.push(ValidationError::new(field, "must be a path, not a full URL"));
        }
    }

    if config.throttle.max_in_flight == 0 {
        errors.push(ValidationError::new("throttle.max_in_flight", "must be at least 1"));
    }

    if config.retries.max_attempts == 0 {
        errors.push(ValidationError::new("retries.max_attempts", "must be at least 1"));
    }
    if config.retries.base_delay_ms > config.retries.max_delay_ms {
        errors.push(ValidationError::new(
            "retries.base_delay_ms",
            "must not exceed retries.max_delay_ms",
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }
    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::new("timeouts.connect_secs", "must be greater than 0"));
    }

    if let Some(addr) = &config.observability.metrics_address {
        if addr.parse::<std::net::SocketAddr>().is_err() {
            errors.push(ValidationError::new(
                "observability.metrics_address",
                format!("'{addr}' is not a socket address"),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
