//! Logwire CLI
//!
//! Demo host process that writes structured logs to an OTLP collector.
//!
//! # Usage
//!
//! ```bash
//! logwire --help
//! logwire --target 127.0.0.1:4317 demo --users 3
//! logwire config
//! ```

#![deny(unsafe_code)]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use logwire::{
    BatchExporter, ExporterConfig, Field, GrpcTransport, Logger, SpanContext, SpanId, TraceId,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Logwire CLI - structured logs to an OTLP collector
#[derive(Parser, Debug)]
#[command(name = "logwire")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// OTLP collector address
    #[arg(short, long, env = "OTEL_EXPORTER_OTLP_ENDPOINT")]
    target: Option<String>,

    /// Records per batch
    #[arg(short, long, env = "LOGWIRE_BATCH_SIZE")]
    batch_size: Option<usize>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Write demo log lines and flush them on exit
    Demo {
        /// Number of simulated user requests
        #[arg(short, long, default_value_t = 1)]
        users: usize,
    },
    /// Print the resolved exporter configuration
    Config,
}

#[derive(Serialize)]
struct RandStruct {
    field1: &'static str,
    field2: i32,
}

impl Cli {
    fn config(&self) -> Result<ExporterConfig> {
        let mut config = ExporterConfig::from_env().context("Invalid exporter configuration")?;
        if let Some(target) = &self.target {
            config.endpoint.clone_from(target);
        }
        if let Some(batch_size) = self.batch_size {
            anyhow::ensure!(batch_size > 0, "Batch size must be at least 1");
            config.batch_size = batch_size;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.config()?;

    match cli.command.unwrap_or(Commands::Demo { users: 1 }) {
        Commands::Demo { users } => run_demo(&config, users).await,
        Commands::Config => {
            println!("{}", logwire::serde_json::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

async fn run_demo(config: &ExporterConfig, users: usize) -> Result<()> {
    let transport = GrpcTransport::connect(&config.transport_options())
        .await
        .with_context(|| format!("Failed to connect to {}", config.endpoint))?;
    let exporter = Arc::new(BatchExporter::new(
        transport,
        config.batch_size,
        &config.resource(),
    )?);
    let logger = Logger::new(Arc::clone(&exporter)).with_level(logwire::LogLevel::Debug);

    let result = tokio::select! {
        result = greet_users(&logger, users) => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted, flushing buffered records");
            Ok(())
        }
    };

    exporter.close().await?;
    result
}

async fn greet_users(logger: &Logger<GrpcTransport>, users: usize) -> Result<()> {
    for i in 0..users {
        tokio::time::sleep(Duration::from_secs(1)).await;
        hello(logger, &format!("{i}user: xyz")).await?;
    }
    Ok(())
}

async fn hello(logger: &Logger<GrpcTransport>, user: &str) -> Result<()> {
    let span = demo_span();
    let data = [("hello", "world")]
        .into_iter()
        .collect::<std::collections::BTreeMap<_, _>>();

    logger
        .info(
            &format!("unnamed: hello from the function to user: {user}"),
            vec![
                Field::any(
                    "rand struct",
                    &RandStruct {
                        field1: "asadadas",
                        field2: 10,
                    },
                ),
                Field::any("test", &data),
                Field::string("user", user),
                Field::span_ctx(Some(span)),
                Field::duration("duration", Duration::from_secs(2)),
            ],
        )
        .await?;

    for name in ["my", "my1"] {
        logger
            .named(name)
            .info(
                &format!("{name}: hello from the function to user: {user}"),
                vec![
                    Field::string("user", user),
                    Field::span_ctx(Some(span)),
                    Field::duration("duration", Duration::from_secs(2)),
                ],
            )
            .await?;
    }

    tracing::info!(user, "Wrote demo log lines");
    Ok(())
}

/// Span context derived from the clock; there is no tracer in this process.
fn demo_span() -> SpanContext {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(1, |d| d.as_nanos().max(1));

    let mut span_id = [0u8; 8];
    span_id.copy_from_slice(&nanos.to_be_bytes()[8..]);
    span_id[0] |= 0x80;

    SpanContext::new(
        TraceId::from_bytes(nanos.to_be_bytes()),
        SpanId::from_bytes(span_id),
    )
}
