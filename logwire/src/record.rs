//! Log entry metadata and OTLP log record construction.
//!
//! [`build_record`] combines an [`Entry`] with its ordered fields into an
//! OTLP `LogRecord`. It never fails; field values that cannot be encoded
//! faithfully fall back to strings (see [`crate::value::encode`]).

use crate::field::Field;
use crate::value::{encode, key_value, Value, WireValue};
use chrono::{DateTime, Utc};
use opentelemetry_proto::tonic::logs::v1::{LogRecord, SeverityNumber};
use serde::{Deserialize, Serialize};

/// Log severity level of the logging front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Detailed debug information.
    Trace,
    /// Debug information.
    Debug,
    /// Informational messages.
    Info,
    /// Warning conditions.
    Warn,
    /// Error conditions.
    Error,
    /// Critical/fatal conditions.
    Fatal,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
            Self::Fatal => write!(f, "fatal"),
        }
    }
}

impl Default for LogLevel {
    fn default() -> Self {
        Self::Info
    }
}

impl LogLevel {
    /// Maps the level onto the OTLP severity scale.
    #[must_use]
    pub fn severity(self) -> SeverityNumber {
        match self {
            Self::Trace => SeverityNumber::Trace,
            Self::Debug => SeverityNumber::Debug,
            Self::Info => SeverityNumber::Info,
            Self::Warn => SeverityNumber::Warn,
            Self::Error => SeverityNumber::Error,
            Self::Fatal => SeverityNumber::Fatal,
        }
    }
}

/// Metadata of a single log write, as produced by the logging front-end.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    /// When the entry was written.
    pub time: DateTime<Utc>,
    /// Severity level.
    pub level: LogLevel,
    /// Name of the (sub-)logger; becomes the instrumentation scope.
    pub logger_name: String,
    /// The log message.
    pub message: String,
}

impl Entry {
    /// Creates an entry stamped with the current time and no logger name.
    #[must_use]
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            time: Utc::now(),
            level,
            logger_name: String::new(),
            message: message.into(),
        }
    }

    /// Sets the logger name.
    #[must_use]
    pub fn with_logger_name(mut self, name: impl Into<String>) -> Self {
        self.logger_name = name.into();
        self
    }

    /// Sets the timestamp.
    #[must_use]
    pub fn with_time(mut self, time: DateTime<Utc>) -> Self {
        self.time = time;
        self
    }

    /// Nanoseconds since the Unix epoch; `0` for times outside the
    /// representable range (before 1970 or after 2262).
    #[must_use]
    pub fn time_unix_nano(&self) -> u64 {
        self.time
            .timestamp_nanos_opt()
            .and_then(|nanos| u64::try_from(nanos).ok())
            .unwrap_or(0)
    }
}

/// Builds an OTLP log record from entry metadata and ordered fields.
///
/// Skipped fields are omitted. A trace context field sets the record's trace
/// and span IDs instead of producing an attribute; if several are supplied
/// the last valid one wins.
pub fn build_record(entry: &Entry, fields: impl IntoIterator<Item = Field>) -> LogRecord {
    let severity = entry.level.severity();
    let mut record = LogRecord {
        time_unix_nano: entry.time_unix_nano(),
        severity_number: severity as i32,
        severity_text: severity.as_str_name().to_string(),
        body: WireValue::String(entry.message.clone()).into_any_value(),
        ..Default::default()
    };

    for field in fields {
        match field.value {
            Value::SpanContext(Some(ctx)) if ctx.is_valid() => {
                record.trace_id = ctx.trace_id().to_bytes().to_vec();
                record.span_id = ctx.span_id().to_bytes().to_vec();
            }
            Value::SpanContext(_) => {}
            value => {
                if let Some(attribute) = key_value(field.key, encode(value)) {
                    record.attributes.push(attribute);
                }
            }
        }
    }

    record
}
