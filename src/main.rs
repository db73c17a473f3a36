// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! EuroFood Market API Server

use eurofood_market::{
    config::{Config, COUNTRIES_SEED_PATH},
    db::FirestoreDb,
    services::{CatalogService, NotificationService, StorageService},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging()?;

    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting EuroFood Market API");

    let db = if config.use_in_memory_store {
        tracing::warn!("Using in-memory document store; data is lost on exit");
        FirestoreDb::new_in_memory()
    } else {
        FirestoreDb::new(&config.gcp_project_id).await?
    };

    if config.seed_countries {
        let countries = CatalogService::load_countries_from_file(COUNTRIES_SEED_PATH)?;
        let seeded = CatalogService::new(db.clone())
            .seed_countries(&countries)
            .await?;
        tracing::info!(count = seeded, path = COUNTRIES_SEED_PATH, "Countries seeded");
    }

    let notifier = NotificationService::new(config.notification_webhook_url.clone());
    if config.notification_webhook_url.is_none() {
        tracing::warn!("NOTIFICATION_WEBHOOK_URL not set, order notifications will be dropped");
    }
    let storage = StorageService::new(&config);

    let state = Arc::new(AppState::new(config.clone(), db, notifier, storage));
    let app = eurofood_market::routes::create_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("eurofood_market=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
