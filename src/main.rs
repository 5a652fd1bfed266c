use anyhow::{Context, Result};
use pixelhub::api::create_app;
use pixelhub::config::{apply_env_overrides, load_config, HubConfig};
use pixelhub::gateway::{run_regen_ticker, SessionGateway};
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pixelhub=info".into()),
        )
        .init();

    info!("PixelHub starting...");

    let mut config = match std::env::var("PIXELHUB_CONFIG") {
        Ok(path) => {
            info!(path = %path, "Loading configuration file");
            load_config(&path)?
        }
        Err(_) => HubConfig::default(),
    };
    apply_env_overrides(&mut config);
    config.validate().context("Invalid configuration")?;

    info!(
        bind_addr = %config.server.bind_addr,
        width = config.canvas.width,
        height = config.canvas.height,
        max_pixels = config.economy.max_pixels,
        regen_interval_ms = config.economy.regen_interval_ms,
        cooldown_ms = config.economy.cooldown_ms,
        "Configuration loaded"
    );

    let bind_addr = config.server.bind_addr.clone();
    let tick_interval = config.economy.tick_interval();
    let gateway = Arc::new(SessionGateway::new(config));

    let ticker = tokio::spawn(run_regen_ticker(Arc::clone(&gateway), tick_interval));
    info!("Regeneration ticker started");

    let app = create_app(gateway);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;
    info!(addr = %bind_addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    ticker.abort();
    info!("PixelHub stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
