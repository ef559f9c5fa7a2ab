//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::observability::Severity;

/// Root configuration for the service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Deployment profile.
    pub application: ApplicationConfig,

    /// Listener and request handling.
    pub server: ServerConfig,

    /// Log sink and request/response capture settings.
    pub logging: LogConfig,
}

/// Deployment profile selection.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ApplicationConfig {
    pub profile: Profile,
}

/// Deployment profile.
///
/// `dev` mirrors every log destination to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    #[default]
    Dev,
    Test,
    Prod,
}

impl Profile {
    pub fn is_dev(self) -> bool {
        self == Profile::Dev
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Profile::Dev => "dev",
            Profile::Test => "test",
            Profile::Prod => "prod",
        };
        f.write_str(name)
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: String,

    /// TCP port to bind.
    pub port: u16,

    /// Request timeout (total time for request/response) in seconds.
    pub request_timeout_secs: u64,

    /// Time in-flight requests get to finish once shutdown starts.
    pub shutdown_grace_secs: u64,
}

impl ServerConfig {
    /// `host:port` string suitable for binding.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            request_timeout_secs: 30,
            shutdown_grace_secs: 5,
        }
    }
}

/// Logging configuration, shared by the log sink and the capture middleware.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LogConfig {
    /// Minimum severity written to `default.log` (debug, info, warn, error, fatal).
    pub level: String,

    /// Directory holding `default.log` and `error.log`.
    pub dir: PathBuf,

    /// Maximum size of a log file in megabytes before it is rotated.
    pub max_size: u64,

    /// Maximum number of rotated files to retain (0 keeps all).
    pub max_backups: usize,

    /// Maximum age of rotated files in days (0 keeps all).
    pub max_age: u64,

    /// Request paths (regular expressions) excluded from request/response capture.
    pub skip_paths: Vec<String>,

    /// Mask sensitive fields in captured bodies.
    pub desensitize: bool,

    /// Field names masked when `desensitize` is on.
    pub skip_fields: Vec<String>,

    /// Queries slower than this are logged at warn level (0 disables).
    pub slow_query_ms: u64,
}

impl LogConfig {
    /// Minimum severity for the general destination.
    ///
    /// Unknown level names fall back to debug.
    pub fn min_severity(&self) -> Severity {
        Severity::parse_lenient(&self.level)
    }

    pub fn slow_query_threshold(&self) -> Duration {
        Duration::from_millis(self.slow_query_ms)
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: PathBuf::from("logs"),
            max_size: 100,
            max_backups: 10,
            max_age: 30,
            skip_paths: Vec::new(),
            desensitize: true,
            skip_fields: vec!["password".to_string()],
            slow_query_ms: 200,
        }
    }
}
