//! citra-server: HTTP service for grayscale, edge blur and resize of uploads.

use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tracing::info;

mod config;
mod error;
mod routes;
mod service;

use config::ServerConfig;
use service::ImageService;

/// HTTP image transformation service
#[derive(Parser, Debug)]
#[command(name = "citra-server")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Address to bind (overrides CITRA_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Port to bind (overrides CITRA_PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Largest accepted request body in bytes (overrides CITRA_MAX_UPLOAD_BYTES)
    #[arg(long)]
    max_upload_bytes: Option<usize>,

    /// JPEG quality 1-100 (overrides CITRA_JPEG_QUALITY)
    #[arg(long)]
    jpeg_quality: Option<u8>,

    /// Log filter when RUST_LOG is unset (overrides CITRA_LOG_LEVEL)
    #[arg(long)]
    log_level: Option<String>,

    /// Emit JSON log lines
    #[arg(long)]
    log_json: bool,
}

impl Cli {
    fn apply(self, config: &mut ServerConfig) {
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(limit) = self.max_upload_bytes {
            config.max_upload_bytes = limit;
        }
        if let Some(quality) = self.jpeg_quality {
            config.jpeg_quality = quality;
        }
        if let Some(level) = self.log_level {
            config.log_level = level;
        }
        config.log_json |= self.log_json;
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = ServerConfig::from_env().context("Failed to read configuration")?;
    cli.apply(&mut config);
    config.validate()?;

    citra_telemetry::init_with_config(&citra_telemetry::TelemetryConfig {
        log_level: config.log_level.clone(),
        json: config.log_json,
        ..Default::default()
    })?;

    let bind_addr = config.bind_addr();
    let service = Arc::new(ImageService::new(config));
    let app = routes::router(service);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to address {bind_addr}"))?;
    info!(
        name = env!("CARGO_PKG_NAME"),
        version = env!("CARGO_PKG_VERSION"),
        address = %listener.local_addr()?,
        "Server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown");
}
