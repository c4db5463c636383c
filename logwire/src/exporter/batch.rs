//! Size-triggered batching of framed log records.

use super::{ExportError, LogsTransport, ResourceMetadata};
use crate::frame::unframe;
use opentelemetry_proto::tonic::collector::logs::v1::ExportLogsServiceRequest;
use opentelemetry_proto::tonic::common::v1::InstrumentationScope;
use opentelemetry_proto::tonic::logs::v1::{LogRecord, ResourceLogs, ScopeLogs};
use opentelemetry_proto::tonic::resource::v1::Resource;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedRwLockReadGuard, RwLock};

/// Buffered records and lifecycle flag, guarded by one mutex.
#[derive(Debug, Default)]
struct Buffer {
    records: Vec<(String, LogRecord)>,
    closed: bool,
}

/// Accumulates framed records and exports them in batches.
///
/// A batch is sent when the buffer reaches `batch_size` records, on
/// [`flush`](Self::flush), and on [`close`](Self::close). There is no timer:
/// a quiet producer's records stay buffered until one of those happens.
///
/// The buffer is swapped out under its lock and the network call runs after
/// the lock is released, so producers are never blocked on a slow collector.
/// Each batch carries the shared resource and schema URL exactly once.
pub struct BatchExporter<T> {
    transport: T,
    batch_size: usize,
    resource: Resource,
    schema_url: String,
    buffer: Mutex<Buffer>,
    /// Read-held by every transmit in progress; `close` takes it for writing
    /// to wait until they have all finished.
    in_flight: Arc<RwLock<()>>,
}

impl<T: LogsTransport> BatchExporter<T> {
    /// Creates an exporter sending batches of `batch_size` records.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::InvalidBatchSize`] if `batch_size` is zero.
    pub fn new(
        transport: T,
        batch_size: usize,
        resource: &ResourceMetadata,
    ) -> Result<Self, ExportError> {
        if batch_size == 0 {
            return Err(ExportError::InvalidBatchSize);
        }

        Ok(Self {
            transport,
            batch_size,
            resource: resource.to_proto(),
            schema_url: resource.schema_url().to_string(),
            buffer: Mutex::new(Buffer::default()),
            in_flight: Arc::new(RwLock::new(())),
        })
    }

    /// The configured batch size threshold.
    #[must_use]
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// The underlying transport.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Number of records currently buffered.
    pub async fn pending(&self) -> usize {
        self.buffer.lock().await.records.len()
    }

    /// Whether [`close`](Self::close) has been called.
    pub async fn is_closed(&self) -> bool {
        self.buffer.lock().await.closed
    }

    /// Buffers one framed record, exporting the batch if it is full.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The exporter is closed
    /// - The frame cannot be decoded (nothing is buffered)
    /// - This call filled the batch and exporting it failed
    pub async fn append(&self, frame: &[u8]) -> Result<(), ExportError> {
        let (scope, record) = unframe(frame)?;

        let (records, _in_flight) = {
            let mut buffer = self.buffer.lock().await;
            if buffer.closed {
                return Err(ExportError::Closed);
            }

            buffer.records.push((scope, record));
            if buffer.records.len() < self.batch_size {
                return Ok(());
            }

            self.swap_out(&mut buffer).await
        };

        self.transmit(records).await
    }

    /// Exports whatever is buffered, if anything.
    ///
    /// # Errors
    ///
    /// Returns an error if exporting the batch failed.
    pub async fn flush(&self) -> Result<(), ExportError> {
        let (records, _in_flight) = {
            let mut buffer = self.buffer.lock().await;
            if buffer.records.is_empty() {
                return Ok(());
            }
            self.swap_out(&mut buffer).await
        };

        self.transmit(records).await
    }

    /// Flushes the remaining records, waits for in-flight exports, and
    /// releases the transport.
    ///
    /// Later calls to `append` fail with [`ExportError::Closed`]. Calling
    /// `close` again only waits for in-flight exports.
    ///
    /// # Errors
    ///
    /// Returns the error of the final flush, if it failed. The transport is
    /// shut down either way.
    pub async fn close(&self) -> Result<(), ExportError> {
        let records = {
            let mut buffer = self.buffer.lock().await;
            if buffer.closed {
                drop(buffer);
                let _drained = self.in_flight.write().await;
                return Ok(());
            }
            buffer.closed = true;
            std::mem::take(&mut buffer.records)
        };

        let result = if records.is_empty() {
            Ok(())
        } else {
            self.transmit(records).await
        };

        let _drained = self.in_flight.write().await;
        self.transport.shutdown().await;

        tracing::debug!("Exporter closed");
        result
    }

    /// Takes the buffered records and registers a transmit in progress.
    ///
    /// Called with the buffer locked, so no `close` can be waiting on
    /// `in_flight` yet.
    async fn swap_out(
        &self,
        buffer: &mut Buffer,
    ) -> (Vec<(String, LogRecord)>, OwnedRwLockReadGuard<()>) {
        let guard = Arc::clone(&self.in_flight).read_owned().await;
        (std::mem::take(&mut buffer.records), guard)
    }

    async fn transmit(&self, records: Vec<(String, LogRecord)>) -> Result<(), ExportError> {
        let count = records.len();
        let request = self.build_request(records);

        match self.transport.export(request).await {
            Ok(response) => {
                if let Some(partial) = response.partial_success {
                    if partial.rejected_log_records > 0 {
                        tracing::warn!(
                            rejected = partial.rejected_log_records,
                            message = %partial.error_message,
                            "Collector rejected part of a log batch"
                        );
                    }
                }
                tracing::debug!(records = count, "Exported log batch");
                Ok(())
            }
            Err(status) => {
                tracing::warn!(records = count, error = %status, "Failed to export log batch");
                Err(ExportError::Transport {
                    records: count,
                    status: Box::new(status),
                })
            }
        }
    }

    /// Groups records into one `ScopeLogs` per scope name, in order of first
    /// appearance, under a single `ResourceLogs`.
    fn build_request(&self, records: Vec<(String, LogRecord)>) -> ExportLogsServiceRequest {
        let mut scope_logs: Vec<ScopeLogs> = Vec::new();

        for (scope, record) in records {
            let existing = scope_logs
                .iter_mut()
                .find(|s| s.scope.as_ref().is_some_and(|sc| sc.name == scope));

            match existing {
                Some(logs) => logs.log_records.push(record),
                None => scope_logs.push(ScopeLogs {
                    scope: Some(InstrumentationScope {
                        name: scope,
                        ..Default::default()
                    }),
                    log_records: vec![record],
                    ..Default::default()
                }),
            }
        }

        ExportLogsServiceRequest {
            resource_logs: vec![ResourceLogs {
                resource: Some(self.resource.clone()),
                scope_logs,
                schema_url: self.schema_url.clone(),
                ..Default::default()
            }],
        }
    }
}

impl<T> std::fmt::Debug for BatchExporter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchExporter")
            .field("batch_size", &self.batch_size)
            .field("schema_url", &self.schema_url)
            .finish_non_exhaustive()
    }
}
