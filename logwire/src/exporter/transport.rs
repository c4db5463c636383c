//! Network channel to the collector.

use super::ExportError;
use opentelemetry_proto::tonic::collector::logs::v1::logs_service_client::LogsServiceClient;
use opentelemetry_proto::tonic::collector::logs::v1::{
    ExportLogsServiceRequest, ExportLogsServiceResponse,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tonic::transport::{Channel, ClientTlsConfig, Endpoint};
use tonic::Status;

/// Sends export requests to a collector.
///
/// Implementations must be thread-safe (Send + Sync). Retries, timeouts and
/// cancellation belong here, not in the exporter.
#[tonic::async_trait]
pub trait LogsTransport: Send + Sync {
    /// Sends one export request.
    async fn export(
        &self,
        request: ExportLogsServiceRequest,
    ) -> Result<ExportLogsServiceResponse, Status>;

    /// Releases the underlying channel. Later exports should fail.
    async fn shutdown(&self) {}
}

#[tonic::async_trait]
impl<T: LogsTransport + ?Sized> LogsTransport for Arc<T> {
    async fn export(
        &self,
        request: ExportLogsServiceRequest,
    ) -> Result<ExportLogsServiceResponse, Status> {
        (**self).export(request).await
    }

    async fn shutdown(&self) {
        (**self).shutdown().await;
    }
}

/// Connection settings for [`GrpcTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportOptions {
    /// Collector address, either a full URI or a bare `host:port`.
    pub endpoint: String,
    /// Use a plaintext channel instead of TLS.
    pub insecure: bool,
    /// Timeout for establishing the connection.
    pub connect_timeout: Duration,
    /// Timeout for each export request.
    pub request_timeout: Duration,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            endpoint: "127.0.0.1:4317".to_string(),
            insecure: true,
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl TransportOptions {
    /// Returns the endpoint as a URI, adding a scheme to bare `host:port`
    /// addresses according to `insecure`.
    #[must_use]
    pub fn uri(&self) -> String {
        if self.endpoint.contains("://") {
            self.endpoint.clone()
        } else if self.insecure {
            format!("http://{}", self.endpoint)
        } else {
            format!("https://{}", self.endpoint)
        }
    }
}

/// OTLP/gRPC transport over a tonic channel.
#[derive(Debug)]
pub struct GrpcTransport {
    client: RwLock<Option<LogsServiceClient<Channel>>>,
}

impl GrpcTransport {
    /// Connects to the collector described by `options`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The endpoint is not a valid URI
    /// - TLS cannot be configured
    /// - The connection cannot be established within the connect timeout
    pub async fn connect(options: &TransportOptions) -> Result<Self, ExportError> {
        let uri = options.uri();
        let mut endpoint = Endpoint::from_shared(uri.clone())
            .map_err(|_| ExportError::InvalidEndpoint(uri.clone()))?
            .connect_timeout(options.connect_timeout)
            .timeout(options.request_timeout);

        if !options.insecure {
            endpoint = endpoint.tls_config(ClientTlsConfig::new().with_native_roots())?;
        }

        let channel = endpoint.connect().await?;

        tracing::info!(endpoint = %uri, tls = !options.insecure, "Connected to OTLP collector");

        Ok(Self::from_channel(channel))
    }

    /// Wraps an already configured channel.
    #[must_use]
    pub fn from_channel(channel: Channel) -> Self {
        Self {
            client: RwLock::new(Some(LogsServiceClient::new(channel))),
        }
    }
}

#[tonic::async_trait]
impl LogsTransport for GrpcTransport {
    async fn export(
        &self,
        request: ExportLogsServiceRequest,
    ) -> Result<ExportLogsServiceResponse, Status> {
        let mut client = self
            .client
            .read()
            .await
            .clone()
            .ok_or_else(|| Status::unavailable("transport has been shut down"))?;

        client.export(request).await.map(tonic::Response::into_inner)
    }

    async fn shutdown(&self) {
        if self.client.write().await.take().is_some() {
            tracing::debug!("Released OTLP channel");
        }
    }
}
