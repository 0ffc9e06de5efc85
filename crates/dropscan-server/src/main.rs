//! HTTP service for invoice capture.
//!
//! Wires the dropscan-core pipeline into a small axum surface: start
//! folder monitoring, upload region specs and images, and run region
//! OCR over a downloaded image.

mod error;
mod routes;
mod state;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use dropscan_core::sync::DriveClient;
use dropscan_core::DropscanConfig;

use state::AppState;

/// Invoice capture service - folder monitoring and region OCR
#[derive(Parser)]
#[command(name = "dropscan")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Address to listen on
    #[arg(short, long, default_value = "127.0.0.1:8080")]
    listen: String,

    /// Path to a JSON config file
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = match cli.config.as_deref() {
        Some(path) => DropscanConfig::from_file(std::path::Path::new(path))?,
        None => DropscanConfig::default(),
    };

    // Token acquisition (OAuth flow, refresh) is outside this service;
    // it expects a ready access token in the environment.
    let access_token = std::env::var("DRIVE_ACCESS_TOKEN").unwrap_or_default();
    if access_token.is_empty() {
        tracing::warn!("DRIVE_ACCESS_TOKEN is not set; Drive requests will fail");
    }

    tokio::fs::create_dir_all(&config.storage.downloads_dir).await?;

    let state = AppState::new(config, DriveClient::new(access_token));
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(&cli.listen).await?;
    tracing::info!("dropscan listening on {}", cli.listen);
    axum::serve(listener, app).await?;

    Ok(())
}
