// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated users.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{CalendarEvent, NutritionSummary};
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;
use axum::{
    extract::{Query, State},
    routing::{delete, get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me))
        .route("/api/calendar/events", get(get_calendar_events))
        .route("/api/calendar/connection", delete(disconnect_calendar))
        .route("/api/scan-food", post(scan_food))
        .route("/api/chat", post(chat))
        .route("/api/intake/summary", get(get_intake_summary))
}

// ─── User Profile ────────────────────────────────────────────

/// Current user response.
#[derive(Serialize)]
pub struct UserResponse {
    pub user_id: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub created_at: String,
}

/// Get current user profile.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UserResponse>> {
    let profile = state
        .db
        .get_user(&user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user.user_id)))?;

    Ok(Json(UserResponse {
        user_id: profile.user_id,
        email: profile.email,
        display_name: profile.display_name,
        created_at: profile.created_at,
    }))
}

// ─── Calendar Events ─────────────────────────────────────────

#[derive(Serialize)]
pub struct EventsResponse {
    pub events: Vec<CalendarEvent>,
}

/// Upcoming calendar events with stress classification.
///
/// Auth-shaped failures carry `needs_auth` so the client can re-initiate
/// the OAuth flow (403 never connected, 401 grant expired).
async fn get_calendar_events(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<EventsResponse>> {
    let events = state.calendar.upcoming_events(&user.user_id).await?;

    tracing::debug!(
        user_id = %user.user_id,
        count = events.len(),
        "Fetched calendar events"
    );

    Ok(Json(EventsResponse { events }))
}

#[derive(Serialize)]
pub struct DisconnectResponse {
    pub success: bool,
}

/// Drop the stored Google grant so the user can reconnect cleanly.
async fn disconnect_calendar(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<DisconnectResponse>> {
    state.db.delete_oauth_token(&user.user_id, "google").await?;

    tracing::info!(user_id = %user.user_id, "Calendar disconnected");
    Ok(Json(DisconnectResponse { success: true }))
}

// ─── Food Scanning ───────────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct ScanFoodRequest {
    /// Base64 image payload, with or without a data-URL prefix
    #[validate(length(min = 1, message = "image is required"))]
    pub image: String,
}

#[derive(Serialize)]
pub struct ScanFoodResponse {
    pub result: NutritionSummary,
}

/// Scan a food photo into a nutrition summary.
async fn scan_food(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<ScanFoodRequest>,
) -> Result<Json<ScanFoodResponse>> {
    request
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let result = state.scanner.scan(&user.user_id, &request.image).await?;

    Ok(Json(ScanFoodResponse { result }))
}

// ─── Symptom Chat ────────────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct ChatRequest {
    /// Free-text symptom description
    #[validate(length(min = 1, message = "message is required"))]
    pub message: String,
}

#[derive(Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub nutrients: Vec<String>,
    pub diet_recommendations: Vec<String>,
}

/// Analyze symptoms against recent nutrient intake.
async fn chat(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>> {
    request
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let analysis = state.advisor.analyze(&user.user_id, &request.message).await;

    Ok(Json(ChatResponse {
        response: analysis.analysis,
        nutrients: analysis.recommended_nutrients,
        diet_recommendations: analysis.diet_suggestions,
    }))
}

// ─── Intake Summary ──────────────────────────────────────────

/// Key nutrients tracked on the dashboard, with daily targets.
const KEY_NUTRIENTS: &[(&str, f64, &str)] = &[
    ("Protein", 50.0, "g"),
    ("Carbohydrates", 300.0, "g"),
    ("Fiber", 30.0, "g"),
    ("Vitamin C", 90.0, "mg"),
    ("Iron", 18.0, "mg"),
    ("Calcium", 1000.0, "mg"),
];

const DEFAULT_SUMMARY_DAYS: u32 = 7;
const MAX_SUMMARY_DAYS: u32 = 90;

#[derive(Deserialize)]
struct IntakeSummaryQuery {
    /// Window length in days
    days: Option<u32>,
}

#[derive(Serialize)]
pub struct NutrientProgress {
    pub name: String,
    /// Total intake over the window
    pub current: f64,
    /// Daily target
    pub target: f64,
    pub unit: String,
    /// Percent of target, capped at 100
    pub percent: u32,
}

#[derive(Serialize)]
pub struct IntakeSummaryResponse {
    pub days: u32,
    pub nutrients: Vec<NutrientProgress>,
}

/// Aggregate recent intake for the dashboard's key nutrients.
async fn get_intake_summary(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<IntakeSummaryQuery>,
) -> Result<Json<IntakeSummaryResponse>> {
    let days = params.days.unwrap_or(DEFAULT_SUMMARY_DAYS);
    if days == 0 || days > MAX_SUMMARY_DAYS {
        return Err(AppError::BadRequest(format!(
            "days must be between 1 and {}",
            MAX_SUMMARY_DAYS
        )));
    }

    let cutoff = chrono::Utc::now() - chrono::Duration::days(days as i64);
    let rows = state
        .db
        .get_intake_since(&user.user_id, &format_utc_rfc3339(cutoff))
        .await?;

    let nutrients = KEY_NUTRIENTS
        .iter()
        .map(|(name, target, unit)| {
            let current: f64 = rows
                .iter()
                .filter(|r| r.nutrient_name.eq_ignore_ascii_case(name))
                .map(|r| r.amount)
                .sum();
            let percent = ((current / target * 100.0).round() as u32).min(100);

            NutrientProgress {
                name: name.to_string(),
                current: (current * 10.0).round() / 10.0,
                target: *target,
                unit: unit.to_string(),
                percent,
            }
        })
        .collect();

    Ok(Json(IntakeSummaryResponse { days, nutrients }))
}
