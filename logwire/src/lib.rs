//! Logwire
//!
//! Bridges structured logging fields to OpenTelemetry log records and ships
//! them to an OTLP collector in batches over gRPC.
//!
//! # Modules
//!
//! - [`value`] - Field value encoding into OTLP attribute values
//! - [`field`] - Named, ordered fields attached to a log entry
//! - [`record`] - Log entries and OTLP `LogRecord` construction
//! - [`frame`] - Scope-prefixed framing of encoded records
//! - [`exporter`] - Batching exporter and gRPC transport
//! - [`logger`] - Leveled logger front-end
//! - [`config`] - Environment-driven exporter configuration
//! - [`trace`] - Trace and span identifiers
//!
//! # Example
//!
//! ```
//! use logwire::{split_frame, Entry, Field, LogLevel, RecordEncoder};
//!
//! let entry = Entry::new(LogLevel::Info, "user logged in").with_logger_name("auth");
//! let frame = RecordEncoder::new()
//!     .encode_entry(&entry, vec![Field::string("user", "xyz")])
//!     .unwrap();
//!
//! let (scope, _payload) = split_frame(&frame).unwrap();
//! assert_eq!(scope, "auth");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod exporter;
pub mod field;
pub mod frame;
pub mod logger;
pub mod record;
pub mod trace;
pub mod value;

pub use config::{ConfigError, ExporterConfig};
pub use exporter::{
    BatchExporter, ExportError, GrpcTransport, LogsTransport, ResourceMetadata, TransportOptions,
};
pub use field::Field;
pub use frame::{frame, split_frame, unframe, FrameError, RecordEncoder, SENTINEL};
pub use logger::Logger;
pub use record::{build_record, Entry, LogLevel};
pub use trace::{SpanContext, SpanId, TraceContextProvider, TraceId};
pub use value::{encode, Value, WireValue};

/// Re-export common dependencies for convenience.
pub use chrono;
pub use opentelemetry_proto;
pub use serde_json;
