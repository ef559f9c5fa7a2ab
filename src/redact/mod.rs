//! Sensitive-field redaction.
//!
//! # Responsibilities
//! - Null out named fields inside JSON bodies before they are logged
//! - Mask matching HTTP headers
//!
//! # Design Decisions
//! - Structural masking: matched leaves become `null`, document shape is kept
//!   so log lines stay parseable
//! - A key matches when it equals or contains a configured name. This
//!   over-masks (`password_hint` for `password`) and is kept that way
//! - Anything that cannot be parsed or re-serialized is returned unchanged;
//!   redaction never fails a request

pub mod headers;
pub mod json;

pub use headers::{header_fields, redact_headers, HeaderFields, HEADER_MASK};
pub use json::{redact_json, redact_serialize, redact_value};

use crate::config::LogConfig;

/// Header masked on every captured request.
pub const AUTH_HEADER: &str = "Authentication";

/// Redaction settings shared by the capture middleware.
#[derive(Debug, Clone, Default)]
pub struct Redactor {
    enabled: bool,
    fields: Vec<String>,
}

impl Redactor {
    /// Empty field names are dropped; they would match every key.
    pub fn new<I, S>(enabled: bool, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            enabled,
            fields: fields
                .into_iter()
                .map(Into::into)
                .filter(|f| !f.is_empty())
                .collect(),
        }
    }

    pub fn from_config(config: &LogConfig) -> Self {
        Self::new(config.desensitize, config.skip_fields.iter().cloned())
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Redact a captured body when redaction is enabled.
    pub fn body(&self, text: String) -> String {
        if self.enabled && !self.fields.is_empty() {
            redact_json(&text, &self.fields)
        } else {
            text
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_redactor_passes_through() {
        let redactor = Redactor::new(false, ["password"]);
        let body = r#"{"password":"secret"}"#.to_string();
        assert_eq!(redactor.body(body.clone()), body);
    }

    #[test]
    fn test_enabled_redactor_masks() {
        let redactor = Redactor::new(true, ["password", ""]);
        assert_eq!(redactor.fields(), ["password".to_string()]);
        assert_eq!(
            redactor.body(r#"{"password":"secret","user":"bob"}"#.to_string()),
            r#"{"password":null,"user":"bob"}"#
        );
    }

    #[test]
    fn test_from_config() {
        let config = LogConfig::default();
        let redactor = Redactor::from_config(&config);
        assert_eq!(redactor.is_enabled(), config.desensitize);
        assert_eq!(redactor.fields(), config.skip_fields.as_slice());
    }
}
