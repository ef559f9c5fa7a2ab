//! Configuration validation.
//!
//! Semantic checks that serde cannot express. Returns every problem found,
//! not just the first.

use crate::config::schema::AppConfig;

/// A single semantic problem with a loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("server.port must not be 0")]
    ZeroPort,

    #[error("server.request_timeout_secs must be greater than 0")]
    ZeroRequestTimeout,

    #[error("logging.dir must not be empty")]
    EmptyLogDir,

    #[error("logging.skip_paths entry {pattern:?} is not a valid regular expression: {reason}")]
    InvalidSkipPath { pattern: String, reason: String },
}

/// Validate a parsed configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.port == 0 {
        errors.push(ValidationError::ZeroPort);
    }

    if config.server.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    if config.logging.dir.as_os_str().is_empty() {
        errors.push(ValidationError::EmptyLogDir);
    }

    for pattern in &config.logging.skip_paths {
        if let Err(e) = regex::Regex::new(pattern) {
            errors.push(ValidationError::InvalidSkipPath {
                pattern: pattern.clone(),
                reason: e.to_string(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
