//! Pizza service telemetry host.
//!
//! Runs a small Axum service wrapped in the telemetry pipeline.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request      ┌──────────────────────────────────────────────────┐
//!     ────────────────────┼─▶ instrument ──▶ handler ──▶ instrument ──────────┼──▶ Client Response
//!                         │       │                          │                 │
//!                         │       ▼                          ▼                 │
//!                         │  active users             registry + purchase     │
//!                         │       │                          │                 │
//!                         │       └──────────┬───────────────┘                 │
//!                         │                  ▼                                 │
//!                         │   sampler ──▶ exporter ──▶ transport ──────────────┼──▶ Metrics / Logs
//!                         │  (every 10s)  (envelopes)  (detached POST)         │      backend
//!                         └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use axum::{
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use clap::Parser;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use pizza_telemetry::config::{load_config, TelemetryConfig};
use pizza_telemetry::lifecycle::shutdown_signal;
use pizza_telemetry::observability::logging;
use pizza_telemetry::Pipeline;

#[derive(Parser)]
#[command(name = "pizza-telemetry")]
#[command(about = "Pizza service with metrics and log push", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let cli = Cli::parse();
    let config = match cli.config {
        Some(path) => load_config(&path)?,
        None => TelemetryConfig::default(),
    };

    tracing::info!(
        bind_address = %config.listener.bind_address,
        sample_period_ms = config.sampler.period_ms,
        purchase_route = %config.instrumentation.purchase_route,
        "Configuration loaded"
    );

    let bind_address = config.listener.bind_address.clone();
    let pipeline = Pipeline::new(config)?;
    let sampler = pipeline.start_sampler();

    let app = pipeline
        .instrument(service_routes())
        .layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(&bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if !pipeline.shutdown(sampler).await {
        tracing::warn!("Some telemetry was still in flight at exit");
    }
    tracing::info!("Shutdown complete");
    Ok(())
}

/// Minimal order endpoints standing in for the host service's handlers.
fn service_routes() -> Router {
    Router::new()
        .route("/health", get(|| async { StatusCode::OK }))
        .route("/api/order/menu", get(menu))
        .route("/api/order", post(create_order))
}

async fn menu() -> Json<Value> {
    Json(json!([
        {"id": 1, "title": "Veggie", "description": "A garden of delight", "price": 0.0038},
        {"id": 2, "title": "Pepperoni", "description": "Spicy treat", "price": 0.0042},
    ]))
}

async fn create_order(Json(order): Json<Value>) -> (StatusCode, Json<Value>) {
    if order.get("items").and_then(Value::as_array).is_none() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"message": "order must contain items"})),
        );
    }
    (StatusCode::OK, Json(json!({"order": order})))
}
