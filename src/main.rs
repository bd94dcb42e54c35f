// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Stridecoin API Server
//!
//! Move-to-earn backend: validates GPS movement telemetry, computes SC
//! rewards through the deterministic pipeline, and settles every economy
//! action through the transactional ledger.

use std::sync::Arc;

use stridecoin::{config::Config, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Stridecoin API");

    if config.admin_emails.is_empty() {
        tracing::warn!("ADMIN_EMAILS is empty; admin endpoints are unreachable");
    }

    // Wire up store, ledger, and services; seed the catalogs
    let state = Arc::new(AppState::new(config.clone()));
    tracing::info!(
        templates = state.store.list_templates().len(),
        store_items = state.store.list_store_items().len(),
        booster_codes = config.booster_codes.len(),
        "Catalogs seeded"
    );

    // Build router
    let app = stridecoin::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("stridecoin=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
