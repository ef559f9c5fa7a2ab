//! Structured log sink.
//!
//! # Responsibilities
//! - Own the two rotating destinations: `default.log` (everything at or above
//!   the configured level) and `error.log` (error and fatal only)
//! - Mirror both destinations to stdout in the dev profile
//! - Turn `tracing` events into single-line JSON records
//! - Flush everything before a fatal record terminates the process
//!
//! # Design Decisions
//! - The sink is a `tracing_subscriber::Layer`; nothing outside this module
//!   builds records by hand
//! - Each destination serializes its writes behind its own mutex
//! - The sink is an explicit handle; [`SinkCell`] gives exactly-once lazy init

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use once_cell::sync::OnceCell;
use serde_json::{Map, Value};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

use crate::config::{LogConfig, Profile};
use crate::observability::record::{LogRecord, Severity};
use crate::observability::rotate::{RotatingFile, RotationPolicy};

/// File name of the general destination.
pub const DEFAULT_FILE: &str = "default.log";

/// File name of the error-only destination.
pub const ERROR_FILE: &str = "error.log";

/// Field set by `log_fatal!`; the sink exits the process after writing it.
pub const FATAL_FIELD: &str = "log.fatal";

/// Fields named `json.<key>` carry serialized JSON and are logged as a
/// nested value under `<key>`.
pub const JSON_FIELD_PREFIX: &str = "json.";

/// Prefix given to event fields that would shadow a top-level record key.
pub const SHADOWED_FIELD_PREFIX: &str = "fields.";

const TRACE_FIELD: &str = "trace_id";
const MESSAGE_FIELD: &str = "message";
const RECORD_KEYS: [&str; 5] = ["timestamp", "level", "message", "trace_id", "caller"];

/// Errors raised while building the sink. All of them are fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("failed to create log directory {path}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("failed to open log file {path}: {source}")]
    OpenFile { path: PathBuf, source: io::Error },
}

/// One output stream: a rotating file plus an optional stdout mirror.
#[derive(Debug)]
struct Destination {
    file: Mutex<RotatingFile>,
    min_severity: Severity,
    mirror_stdout: bool,
}

impl Destination {
    fn open(
        path: PathBuf,
        policy: RotationPolicy,
        min_severity: Severity,
        mirror_stdout: bool,
    ) -> Result<Self, SinkError> {
        let file = RotatingFile::open(&path, policy)
            .map_err(|source| SinkError::OpenFile { path, source })?;
        Ok(Self {
            file: Mutex::new(file),
            min_severity,
            mirror_stdout,
        })
    }

    fn accepts(&self, severity: Severity) -> bool {
        severity >= self.min_severity
    }

    fn write_line(&self, line: &str) {
        {
            let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);
            if let Err(e) = file.write_line(line) {
                eprintln!("failed to write log record to {}: {}", file.path().display(), e);
            }
        }

        if self.mirror_stdout {
            let mut out = io::stdout().lock();
            let _ = writeln!(out, "{line}");
        }
    }

    fn sync(&self) -> io::Result<()> {
        if self.mirror_stdout {
            io::stdout().flush()?;
        }
        self.file
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .sync()
    }
}

/// Process-wide structured log sink.
#[derive(Debug)]
pub struct LogSink {
    dir: PathBuf,
    general: Destination,
    error: Destination,
}

impl LogSink {
    /// Create the log directory if needed and open both destinations.
    pub fn new(config: &LogConfig, profile: Profile) -> Result<Self, SinkError> {
        let dir = config.dir.clone();
        std::fs::create_dir_all(&dir).map_err(|source| SinkError::CreateDir {
            path: dir.clone(),
            source,
        })?;

        let policy = RotationPolicy::from_units(config.max_size, config.max_age, config.max_backups);
        let mirror = profile.is_dev();

        let general = Destination::open(
            dir.join(DEFAULT_FILE),
            policy.clone(),
            config.min_severity(),
            mirror,
        )?;
        let error = Destination::open(dir.join(ERROR_FILE), policy, Severity::Error, mirror)?;

        Ok(Self {
            dir,
            general,
            error,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the general destination.
    pub fn default_path(&self) -> PathBuf {
        self.dir.join(DEFAULT_FILE)
    }

    /// Path of the error-only destination.
    pub fn error_path(&self) -> PathBuf {
        self.dir.join(ERROR_FILE)
    }

    /// Route a record to every destination that accepts its severity.
    pub fn write(&self, record: &LogRecord) {
        let line = match record.to_json_line() {
            Ok(line) => line,
            Err(e) => {
                eprintln!("failed to serialize log record {:?}: {}", record.message, e);
                return;
            }
        };

        for destination in [&self.general, &self.error] {
            if destination.accepts(record.level) {
                destination.write_line(&line);
            }
        }
    }

    /// Flush both destinations. Call once during shutdown.
    pub fn sync(&self) -> io::Result<()> {
        let general = self.general.sync();
        let error = self.error.sync();
        general.and(error)
    }

    /// A `tracing` layer that feeds this sink.
    pub fn layer(self: &Arc<Self>) -> SinkLayer {
        SinkLayer {
            sink: Arc::clone(self),
        }
    }
}

/// Exactly-once lazy initialization of a [`LogSink`].
///
/// Racing callers block until the first initializer finishes and then all
/// observe the same sink.
#[derive(Debug, Default)]
pub struct SinkCell {
    cell: OnceCell<Arc<LogSink>>,
}

impl SinkCell {
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    /// Return the sink, building it from `config` on first use.
    ///
    /// A failed initialization leaves the cell empty.
    pub fn get_or_try_init(
        &self,
        config: &LogConfig,
        profile: Profile,
    ) -> Result<Arc<LogSink>, SinkError> {
        self.cell
            .get_or_try_init(|| LogSink::new(config, profile).map(Arc::new))
            .cloned()
    }

    pub fn get(&self) -> Option<&Arc<LogSink>> {
        self.cell.get()
    }
}

/// `tracing` layer writing every event to a [`LogSink`].
#[derive(Debug, Clone)]
pub struct SinkLayer {
    sink: Arc<LogSink>,
}

impl<S> Layer<S> for SinkLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let mut visitor = RecordVisitor::default();
        event.record(&mut visitor);

        let level = if visitor.fatal {
            Severity::Fatal
        } else {
            Severity::from_level(metadata.level())
        };

        let caller = match (metadata.file(), metadata.line()) {
            (Some(file), Some(line)) => format!("{file}:{line}"),
            _ => metadata.target().to_string(),
        };

        let record = LogRecord {
            timestamp: LogRecord::now_timestamp(),
            level,
            message: visitor.message,
            trace_id: visitor.trace_id,
            caller,
            fields: visitor.fields,
        };
        self.sink.write(&record);

        if level == Severity::Fatal {
            let _ = self.sink.sync();
            std::process::exit(1);
        }
    }
}

/// Collects event fields into a JSON map.
#[derive(Default)]
struct RecordVisitor {
    message: String,
    trace_id: Option<String>,
    fatal: bool,
    fields: Map<String, Value>,
}

impl RecordVisitor {
    fn insert(&mut self, field: &Field, value: Value) {
        let (name, value) = match (field.name().strip_prefix(JSON_FIELD_PREFIX), value) {
            (Some(name), Value::String(text)) => {
                let value = serde_json::from_str(&text).unwrap_or(Value::String(text));
                (name, value)
            }
            (Some(name), value) => (name, value),
            (None, value) => (field.name(), value),
        };

        let key = if RECORD_KEYS.contains(&name) {
            format!("{SHADOWED_FIELD_PREFIX}{name}")
        } else {
            name.to_string()
        };
        self.fields.insert(key, value);
    }
}

impl Visit for RecordVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let text = format!("{value:?}");
        match field.name() {
            MESSAGE_FIELD => self.message = text,
            TRACE_FIELD => self.trace_id = Some(text),
            _ => self.insert(field, Value::String(text)),
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            MESSAGE_FIELD => self.message = value.to_string(),
            TRACE_FIELD => self.trace_id = Some(value.to_string()),
            _ => self.insert(field, Value::String(value.to_string())),
        }
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        if field.name() == FATAL_FIELD {
            self.fatal = value;
        } else {
            self.insert(field, Value::Bool(value));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.insert(field, Value::from(value));
    }
}
