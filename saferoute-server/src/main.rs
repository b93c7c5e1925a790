//! HTTP boundary for the saferoute engine.

mod config;
mod handlers;
mod store;

use std::path::PathBuf;
use std::sync::Arc;

use axum::error_handling::HandleErrorLayer;
use axum::http::{HeaderValue, StatusCode};
use axum::Json;
use clap::Parser;
use serde_json::json;
use tower::{BoxError, ServiceBuilder, timeout::TimeoutLayer};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{HttpConfig, ServerConfig};
use crate::handlers::AppState;
use crate::store::PgStore;

#[derive(Parser)]
#[command(name = "saferoute-server", about = "Safe-route navigator backend")]
struct Args {
    /// Path to the TOML configuration file
    #[arg(long, default_value = "saferoute.toml")]
    config: PathBuf,
    /// Override the bind address from the config file
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = ServerConfig::load(&args.config)?;
    let bind = args.bind.unwrap_or_else(|| config.bind.clone());

    // The store is a startup requirement: coming up without it would
    // turn every request into a retry storm against a dead database.
    let store = Arc::new(PgStore::connect(&config.database)?);
    let state = AppState::new(store, config.engine);

    let app = handlers::router(state)
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .layer(TimeoutLayer::new(config.request_timeout())),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.http));

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    info!("Listening on {bind}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

fn cors_layer(http: &HttpConfig) -> CorsLayer {
    if http.allowed_origins.is_empty() {
        return CorsLayer::permissive();
    }
    let origins: Vec<HeaderValue> = http
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn handle_middleware_error(err: BoxError) -> (StatusCode, Json<serde_json::Value>) {
    let (status, message) = if err.is::<tower::timeout::error::Elapsed>() {
        (StatusCode::REQUEST_TIMEOUT, "request timed out")
    } else {
        (StatusCode::INTERNAL_SERVER_ERROR, "internal error")
    };
    (status, Json(json!({"status": "error", "error": message})))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
