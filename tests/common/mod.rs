// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use nutritrack::config::Config;
use nutritrack::db::FirestoreDb;
use nutritrack::routes::create_router;
use nutritrack::services::{
    AdvisorService, CalendarClient, CalendarService, FdcClient, FoodScanService, GeminiClient,
};
use nutritrack::AppState;
use std::sync::Arc;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> FirestoreDb {
    FirestoreDb::new_mock()
}

/// Create a test app with offline mock dependencies.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let db = test_db_offline();

    let gemini = GeminiClient::new(config.gemini_api_key.clone());
    let fdc = FdcClient::new(config.fdc_api_key.clone());
    let calendar_client = CalendarClient::new(
        config.google_client_id.clone(),
        config.google_client_secret.clone(),
        config.google_redirect_uri.clone(),
    );

    let calendar = CalendarService::new(calendar_client, db.clone());
    let scanner = FoodScanService::new(gemini.clone(), fdc, db.clone());
    let advisor = AdvisorService::new(gemini, db.clone());

    let state = Arc::new(AppState {
        config,
        db,
        calendar,
        scanner,
        advisor,
    });

    (create_router(state.clone()), state)
}
