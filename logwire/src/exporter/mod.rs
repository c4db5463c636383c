//! Batched export of framed log records to an OTLP collector.
//!
//! - [`BatchExporter`] buffers frames and ships them in batches
//! - [`LogsTransport`] abstracts the network channel; [`GrpcTransport`] is
//!   the tonic implementation
//! - [`ResourceMetadata`] is attached once per outbound batch

mod batch;
mod resource;
mod transport;

pub use batch::BatchExporter;
pub use resource::ResourceMetadata;
pub use transport::{GrpcTransport, LogsTransport, TransportOptions};

use crate::frame::FrameError;
use thiserror::Error;

/// Errors that can occur while exporting log records.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The exporter was closed; no further records are accepted.
    #[error("Exporter is closed")]
    Closed,

    /// The batch size threshold is zero.
    #[error("Batch size must be at least 1")]
    InvalidBatchSize,

    /// A frame could not be decoded.
    #[error(transparent)]
    Frame(#[from] FrameError),

    /// The collector or channel rejected an export request.
    #[error("Failed to export {records} log records: {status}")]
    Transport {
        /// Number of records in the failed batch.
        records: usize,
        /// Status returned by the channel.
        status: Box<tonic::Status>,
    },

    /// The collector endpoint is not a valid URI.
    #[error("Invalid collector endpoint {0:?}")]
    InvalidEndpoint(String),

    /// Connecting to the collector failed.
    #[error("Failed to connect to collector: {0}")]
    Connect(#[from] tonic::transport::Error),
}
