//! triage-api - Ticket triage service entry point
//!
//! Loads the classifier artifact once, then serves classification, routing
//! and metrics endpoints until Ctrl+C or SIGTERM.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use triage_api::classifier::{Classifier, NaiveBayesClassifier};
use triage_api::{build_router, AppState};
use triage_common::config::{load_config, resolve_config_path, CONFIG_ENV_VAR};

/// Command-line arguments for triage-api
#[derive(Parser, Debug)]
#[command(name = "triage-api")]
#[command(about = "Support ticket classification and confidence routing service")]
#[command(version)]
struct Args {
    /// Config file (TOML)
    #[arg(short, long, env = CONFIG_ENV_VAR)]
    config: Option<PathBuf>,

    /// Address to bind
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "TRIAGE_PORT")]
    port: Option<u16>,

    /// Classifier model artifact (JSON)
    #[arg(short, long, env = "TRIAGE_MODEL")]
    model: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config is read before tracing so its log level can seed the filter
    let config_path = resolve_config_path(args.config.as_deref(), CONFIG_ENV_VAR);
    let mut config = load_config(config_path.as_deref()).context("Failed to load configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting Ticket Triage API (triage-api) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    match &config_path {
        Some(path) => info!("Config: {}", path.display()),
        None => info!("Config: compiled defaults"),
    }

    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(model) = args.model {
        config.model.path = model;
    }

    let thresholds = config.routing;
    info!(
        "Routing thresholds: auto-resolve > {}, human review < {}",
        thresholds.auto_resolve_threshold, thresholds.human_review_threshold
    );

    let model_path = &config.model.path;
    let classifier = NaiveBayesClassifier::load(model_path)
        .with_context(|| format!("Failed to load model from {}", model_path.display()))?;
    info!(
        "✓ Loaded {} v{} from {} ({} classes, {} features)",
        classifier.name(),
        classifier.version(),
        model_path.display(),
        classifier.categories().len(),
        classifier.feature_count()
    );

    let history_capacity = config.metrics.capacity_limit();
    match history_capacity {
        Some(limit) => info!("Prediction history capped at {} records", limit),
        None => info!("Prediction history unbounded"),
    }

    let state = AppState::new(Arc::new(classifier), thresholds, history_capacity);
    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("triage-api listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
