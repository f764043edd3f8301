//! tiergate server
//!
//! Serves the tier status and event listing endpoints.

use anyhow::Result;
use tiergate_server::{api, build_state, ServerConfig};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerConfig::from_env()?;

    // Prefer RUST_LOG, fall back to TIERGATE_LOG_LEVEL
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let registry = tracing_subscriber::registry().with(filter);
    if config.log_json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    info!("Starting tiergate");
    info!(
        listen_addr = %config.listen_addr,
        strict_tier_labels = config.strict_tier_labels,
        "Configuration loaded"
    );

    let state = match build_state(&config) {
        Ok(state) => state,
        Err(e) => {
            error!(error = %e, "Failed to initialize");
            return Err(e.into());
        }
    };

    let app = api::create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    info!(addr = %config.listen_addr, "Listening for connections");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for shutdown signal");
            }
            info!("Received shutdown signal");
        })
        .await?;

    info!("Server stopped");
    Ok(())
}
