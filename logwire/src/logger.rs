//! Leveled logger front-end feeding a shared [`BatchExporter`].
//!
//! A [`Logger`] turns each call into an [`Entry`], frames it with a
//! [`RecordEncoder`], and appends the frame to the exporter. Named child
//! loggers share the exporter; their name becomes the instrumentation scope.
//!
//! # Example
//!
//! ```no_run
//! use logwire::{BatchExporter, Field, GrpcTransport, Logger, ResourceMetadata, TransportOptions};
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), logwire::ExportError> {
//! let transport = GrpcTransport::connect(&TransportOptions::default()).await?;
//! let resource = ResourceMetadata::new("https://opentelemetry.io/schemas/1.12.0")
//!     .with_service_name("example application");
//! let exporter = Arc::new(BatchExporter::new(transport, 2, &resource)?);
//!
//! let logger = Logger::new(Arc::clone(&exporter)).named("my");
//! logger.info("test log", vec![Field::string("user", "xyz")]).await?;
//!
//! exporter.close().await?;
//! # Ok(())
//! # }
//! ```

use crate::exporter::{BatchExporter, ExportError, LogsTransport};
use crate::field::Field;
use crate::frame::RecordEncoder;
use crate::record::{Entry, LogLevel};
use std::sync::Arc;

/// Structured logger writing OTLP records through a batch exporter.
pub struct Logger<T> {
    name: String,
    level: LogLevel,
    context: Vec<Field>,
    encoder: RecordEncoder,
    exporter: Arc<BatchExporter<T>>,
}

impl<T> Clone for Logger<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            level: self.level,
            context: self.context.clone(),
            encoder: self.encoder,
            exporter: Arc::clone(&self.exporter),
        }
    }
}

impl<T> std::fmt::Debug for Logger<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("level", &self.level)
            .field("context", &self.context.len())
            .finish_non_exhaustive()
    }
}

impl<T: LogsTransport> Logger<T> {
    /// Creates an unnamed logger at [`LogLevel::Info`].
    #[must_use]
    pub fn new(exporter: Arc<BatchExporter<T>>) -> Self {
        Self {
            name: String::new(),
            level: LogLevel::default(),
            context: Vec::new(),
            encoder: RecordEncoder::new(),
            exporter,
        }
    }

    /// Returns a child logger whose name is appended to this one with a `.`.
    #[must_use]
    pub fn named(&self, name: &str) -> Self {
        let mut child = self.clone();
        child.name = match (self.name.is_empty(), name.is_empty()) {
            (_, true) => self.name.clone(),
            (true, false) => name.to_string(),
            (false, false) => format!("{}.{name}", self.name),
        };
        child
    }

    /// Returns a logger that drops entries below `level`.
    #[must_use]
    pub fn with_level(&self, level: LogLevel) -> Self {
        let mut child = self.clone();
        child.level = level;
        child
    }

    /// Returns a logger that adds `fields` ahead of every call's own fields.
    #[must_use]
    pub fn with(&self, fields: impl IntoIterator<Item = Field>) -> Self {
        let mut child = self.clone();
        child.context.extend(fields);
        child
    }

    /// The logger name, used as the instrumentation scope.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether entries at `level` are written.
    #[must_use]
    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= self.level
    }

    /// Writes one entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry cannot be framed, the exporter is closed,
    /// or this write filled a batch whose export failed.
    pub async fn log(
        &self,
        level: LogLevel,
        message: &str,
        fields: Vec<Field>,
    ) -> Result<(), ExportError> {
        if !self.enabled(level) {
            return Ok(());
        }

        let entry = Entry::new(level, message).with_logger_name(self.name.clone());
        let frame = self
            .encoder
            .encode_entry(&entry, self.context.iter().cloned().chain(fields))?;
        self.exporter.append(&frame).await
    }

    /// Writes a debug entry.
    ///
    /// # Errors
    ///
    /// See [`log`](Self::log).
    pub async fn debug(&self, message: &str, fields: Vec<Field>) -> Result<(), ExportError> {
        self.log(LogLevel::Debug, message, fields).await
    }

    /// Writes an info entry.
    ///
    /// # Errors
    ///
    /// See [`log`](Self::log).
    pub async fn info(&self, message: &str, fields: Vec<Field>) -> Result<(), ExportError> {
        self.log(LogLevel::Info, message, fields).await
    }

    /// Writes a warning entry.
    ///
    /// # Errors
    ///
    /// See [`log`](Self::log).
    pub async fn warn(&self, message: &str, fields: Vec<Field>) -> Result<(), ExportError> {
        self.log(LogLevel::Warn, message, fields).await
    }

    /// Writes an error entry.
    ///
    /// # Errors
    ///
    /// See [`log`](Self::log).
    pub async fn error(&self, message: &str, fields: Vec<Field>) -> Result<(), ExportError> {
        self.log(LogLevel::Error, message, fields).await
    }

    /// Writes a fatal entry. Unlike many loggers this does not exit the process.
    ///
    /// # Errors
    ///
    /// See [`log`](Self::log).
    pub async fn fatal(&self, message: &str, fields: Vec<Field>) -> Result<(), ExportError> {
        self.log(LogLevel::Fatal, message, fields).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exporter::ResourceMetadata;
    use opentelemetry_proto::tonic::collector::logs::v1::{
        ExportLogsServiceRequest, ExportLogsServiceResponse,
    };
    use opentelemetry_proto::tonic::common::v1::any_value;
    use opentelemetry_proto::tonic::logs::v1::SeverityNumber;
    use std::sync::Mutex;
    use tokio_test::assert_ok;

    #[derive(Default)]
    struct CollectingTransport {
        requests: Mutex<Vec<ExportLogsServiceRequest>>,
    }

    #[tonic::async_trait]
    impl LogsTransport for CollectingTransport {
        async fn export(
            &self,
            request: ExportLogsServiceRequest,
        ) -> Result<ExportLogsServiceResponse, tonic::Status> {
            self.requests.lock().unwrap().push(request);
            Ok(ExportLogsServiceResponse::default())
        }
    }

    fn logger(batch_size: usize) -> Logger<CollectingTransport> {
        let exporter = BatchExporter::new(
            CollectingTransport::default(),
            batch_size,
            &ResourceMetadata::new("schema"),
        )
        .unwrap();
        Logger::new(Arc::new(exporter))
    }

    fn scopes(logger: &Logger<CollectingTransport>) -> Vec<(String, usize)> {
        logger.exporter.transport().requests.lock().unwrap()[0].resource_logs[0]
            .scope_logs
            .iter()
            .map(|sl| {
                (
                    sl.scope.as_ref().unwrap().name.clone(),
                    sl.log_records.len(),
                )
            })
            .collect()
    }

    #[test]
    fn test_named_joins_with_dot() {
        let root = logger(10);
        assert_eq!(root.name(), "");
        assert_eq!(root.named("my").name(), "my");
        assert_eq!(root.named("my").named("http").name(), "my.http");
        assert_eq!(root.named("my").named("").name(), "my");
    }

    #[test]
    fn test_level_filtering() {
        let root = logger(10);
        assert!(!root.enabled(LogLevel::Debug));
        assert!(root.enabled(LogLevel::Info));
        assert!(root.enabled(LogLevel::Fatal));

        let verbose = root.with_level(LogLevel::Trace);
        assert!(verbose.enabled(LogLevel::Trace));
    }

    #[tokio::test]
    async fn test_named_loggers_share_the_exporter() {
        let root = logger(3);

        assert_ok!(root.named("my").info("test log", Vec::new()).await);
        assert_ok!(root.named("my1").warn("test log1", Vec::new()).await);
        assert_ok!(root.named("my").error("test log2", Vec::new()).await);

        assert_eq!(
            scopes(&root),
            vec![("my".to_string(), 2), ("my1".to_string(), 1)]
        );
    }

    #[tokio::test]
    async fn test_disabled_level_writes_nothing() {
        let root = logger(1);

        assert_ok!(root.debug("hidden", Vec::new()).await);

        assert_eq!(root.exporter.pending().await, 0);
        assert!(root.exporter.transport().requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_context_fields_precede_call_fields() {
        let root = logger(1).with(vec![Field::string("request_id", "abc")]);

        assert_ok!(root.fatal("boom", vec![Field::int("code", 7)]).await);

        let requests = root.exporter.transport().requests.lock().unwrap();
        let record = &requests[0].resource_logs[0].scope_logs[0].log_records[0];
        assert_eq!(record.severity_number, SeverityNumber::Fatal as i32);
        let keys: Vec<&str> = record.attributes.iter().map(|kv| kv.key.as_str()).collect();
        assert_eq!(keys, vec!["request_id", "code"]);
        assert_eq!(
            record.body.as_ref().unwrap().value,
            Some(any_value::Value::StringValue("boom".to_string()))
        );
    }

    #[tokio::test]
    async fn test_log_after_close_fails() {
        let root = logger(10);
        root.exporter.close().await.unwrap();

        let result = root.info("late", Vec::new()).await;
        assert!(matches!(result, Err(ExportError::Closed)));
    }
}
