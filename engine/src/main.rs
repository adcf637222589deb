use anyhow::Context;
use candle_core::Device;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use xray_engine::{create_app, AppState, Config, ResNetClassifier};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "xray_engine=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::parse();

    tracing::info!(path = %config.model_path.display(), "Loading classifier checkpoint");
    let classifier = ResNetClassifier::load(&config.model_path, &Device::Cpu)
        .context("Refusing to start without a usable model")?;

    let app = create_app(AppState::new(classifier), config.max_upload_bytes);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    tracing::info!("X-ray classifier listening on http://{}", listener.local_addr()?);
    tracing::info!("Available endpoints:");
    tracing::info!("  - GET  /health        - Health check");
    tracing::info!("  - POST /api/predict/  - Classify an uploaded X-ray (multipart field 'file')");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, draining in-flight requests");
}
