// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! NutriTrack API Server
//!
//! Tracks nutrition by scanning food photos, correlating symptoms with
//! nutrient intake, and classifying upcoming calendar events by stress.

use nutritrack::{
    config::Config,
    db::FirestoreDb,
    services::{AdvisorService, CalendarClient, CalendarService, FdcClient, FoodScanService, GeminiClient},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting NutriTrack API");

    // Initialize Firestore database
    let db = FirestoreDb::new(&config.gcp_project_id)
        .await
        .expect("Failed to connect to Firestore");

    // External API clients
    let gemini = GeminiClient::new(config.gemini_api_key.clone());
    let fdc = FdcClient::new(config.fdc_api_key.clone());
    if config.fdc_api_key.is_none() {
        tracing::warn!("FDC_API_KEY not set; nutrition lookups will fall back to AI estimation");
    }

    let calendar_client = CalendarClient::new(
        config.google_client_id.clone(),
        config.google_client_secret.clone(),
        config.google_redirect_uri.clone(),
    );

    // Services
    let calendar = CalendarService::new(calendar_client, db.clone());
    let scanner = FoodScanService::new(gemini.clone(), fdc, db.clone());
    let advisor = AdvisorService::new(gemini, db.clone());
    tracing::info!("Services initialized");

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        calendar,
        scanner,
        advisor,
    });

    // Build router
    let app = nutritrack::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("nutritrack=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
