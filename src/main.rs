//! Smart Fraud Detector - Main Entry Point
//!
//! Loads the model and explainer artifacts, then serves the dashboard.
//! Usage: `fraud-dashboard [config.toml]`

use anyhow::{Context, Result};
use fraud_dashboard::{
    config::{AppConfig, LoggingConfig, DEFAULT_CONFIG_PATH},
    models::inference::InferenceEngine,
    server::{router, AppState},
};
use tracing::info;

fn init_logging(logging: &LoggingConfig) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().or_else(|_| {
        tracing_subscriber::EnvFilter::try_new(format!(
            "fraud_dashboard={level},tower_http={level}",
            level = logging.level
        ))
    })?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = AppConfig::load_from_path(&config_path)?;

    init_logging(&config.logging)?;
    info!(config = %config_path, "Starting Smart Fraud Detector");

    // Both artifacts must load before anything is served
    let engine = InferenceEngine::new(&config)?;
    info!(
        model = %engine.model_name(),
        model_path = %config.models.model_path,
        explainer_path = %config.models.explainer_path,
        "Artifacts loaded"
    );

    let state = AppState::new(engine);
    let metrics = state.metrics.clone();
    let app = router(state);

    let addr = config.server.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Dashboard running on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Dashboard shutting down...");
    metrics.print_summary();

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
