// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google Calendar API client and token lifecycle.
//!
//! Handles:
//! - OAuth authorization URL construction
//! - Authorization-code exchange and refresh-token grants
//! - Event listing with stress classification
//! - Transparent token refresh against the stored expiry epoch

use crate::error::AppError;
use serde::Deserialize;

/// OAuth scopes requested when connecting a calendar.
pub const OAUTH_SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/calendar.readonly",
    "https://www.googleapis.com/auth/userinfo.email",
];

/// Google Calendar API client.
#[derive(Clone)]
pub struct CalendarClient {
    http: reqwest::Client,
    api_base_url: String,
    token_url: String,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

impl CalendarClient {
    /// Create a new Calendar client with OAuth credentials.
    pub fn new(client_id: String, client_secret: String, redirect_uri: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base_url: "https://www.googleapis.com/calendar/v3".to_string(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            client_id,
            client_secret,
            redirect_uri,
        }
    }

    /// Build the authorization URL the user is redirected to.
    ///
    /// `access_type=offline` + `prompt=consent` force Google to issue a
    /// refresh token, without which expiry would require a full re-auth.
    pub fn authorize_url(&self, state: &str) -> String {
        format!(
            "https://accounts.google.com/o/oauth2/v2/auth?\
             client_id={}&\
             redirect_uri={}&\
             response_type=code&\
             scope={}&\
             access_type=offline&\
             prompt=consent&\
             state={}",
            self.client_id,
            urlencoding::encode(&self.redirect_uri),
            urlencoding::encode(&OAUTH_SCOPES.join(" ")),
            state
        )
    }

    /// Exchange an authorization code for tokens.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenExchangeResponse, AppError> {
        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| AppError::GoogleApi(format!("Token exchange failed: {}", e)))?;

        self.check_response_json(response).await
    }

    /// Refresh an expired access token.
    ///
    /// Google only echoes a refresh token on the original consent, so the
    /// response carries the new access token and expiry alone.
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<TokenRefreshResponse, AppError> {
        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(|e| AppError::GoogleApi(format!("Token refresh request failed: {}", e)))?;

        self.check_response_json(response).await
    }

    /// List events from the user's primary calendar within a time window.
    pub async fn list_events(
        &self,
        access_token: &str,
        time_min: &str,
        time_max: &str,
        max_results: u32,
    ) -> Result<Vec<GoogleEvent>, AppError> {
        let url = format!("{}/calendars/primary/events", self.api_base_url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .query(&[
                ("timeMin", time_min),
                ("timeMax", time_max),
                ("singleEvents", "true"),
                ("orderBy", "startTime"),
                ("maxResults", &max_results.to_string()),
            ])
            .send()
            .await
            .map_err(|e| AppError::GoogleApi(e.to_string()))?;

        let data: EventListResponse = self.check_response_json(response).await?;
        Ok(data.items)
    }

    /// Check response status and parse the JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            // 401 or a rejected grant both mean the user must reconnect
            if status.as_u16() == 401 || body.contains("invalid_grant") {
                return Err(AppError::GoogleApi(format!(
                    "{}: {}",
                    AppError::GOOGLE_AUTH_ERROR,
                    body
                )));
            }

            return Err(AppError::GoogleApi(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::GoogleApi(format!("JSON parse error: {}", e)))
    }
}

/// Token exchange response from Google OAuth.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenExchangeResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Lifetime in seconds
    pub expires_in: i64,
    #[serde(default)]
    pub scope: Option<String>,
}

/// Token refresh response from Google OAuth.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenRefreshResponse {
    pub access_token: String,
    pub expires_in: i64,
}

#[derive(Debug, Deserialize)]
struct EventListResponse {
    #[serde(default)]
    items: Vec<GoogleEvent>,
}

/// Raw event from the Calendar API.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleEvent {
    pub id: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub start: Option<EventStart>,
}

/// Event start time: dateTime for timed events, date for all-day events.
#[derive(Debug, Clone, Deserialize)]
pub struct EventStart {
    #[serde(rename = "dateTime", default)]
    pub date_time: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// CalendarService - token lifecycle plus event projection
// ─────────────────────────────────────────────────────────────────────────────

use crate::db::FirestoreDb;
use crate::models::{CalendarEvent, OAuthToken, User};
use crate::services::classifier;
use crate::time_utils::format_utc_rfc3339;
use chrono::{Duration, Utc};

/// How far ahead events are fetched.
const EVENT_WINDOW_DAYS: i64 = 30;
/// Page size for the events list call.
const MAX_EVENT_RESULTS: u32 = 50;

const PROVIDER: &str = "google";

/// High-level calendar service that manages the token lifecycle and
/// projects raw events into classified calendar entries.
#[derive(Clone)]
pub struct CalendarService {
    client: CalendarClient,
    db: FirestoreDb,
}

impl CalendarService {
    pub fn new(client: CalendarClient, db: FirestoreDb) -> Self {
        Self { client, db }
    }

    /// Authorization URL for the given opaque state parameter.
    pub fn authorize_url(&self, state: &str) -> String {
        self.client.authorize_url(state)
    }

    /// Handle OAuth callback: exchange the code and persist the grant.
    pub async fn handle_oauth_callback(&self, user_id: &str, code: &str) -> Result<(), AppError> {
        let token_response = self.client.exchange_code(code).await?;

        let now = Utc::now();
        let expires_at = now.timestamp() + token_response.expires_in;

        let token = OAuthToken {
            user_id: user_id.to_string(),
            provider: PROVIDER.to_string(),
            access_token: token_response.access_token,
            refresh_token: token_response.refresh_token,
            expires_at: Some(expires_at),
            scopes: token_response
                .scope
                .map(|s| s.split_whitespace().map(str::to_string).collect())
                .unwrap_or_else(|| OAUTH_SCOPES.iter().map(|s| s.to_string()).collect()),
            updated_at: format_utc_rfc3339(now),
        };

        self.db.upsert_oauth_token(&token).await?;

        // Make sure a profile row exists so /api/me has something to return
        let user = match self.db.get_user(user_id).await {
            Ok(Some(mut existing)) => {
                existing.last_active = format_utc_rfc3339(now);
                existing
            }
            _ => User {
                user_id: user_id.to_string(),
                email: None,
                display_name: None,
                created_at: format_utc_rfc3339(now),
                last_active: format_utc_rfc3339(now),
            },
        };

        if let Err(e) = self.db.upsert_user(&user).await {
            tracing::warn!(error = %e, "Failed to store user profile, continuing anyway");
        }

        tracing::info!(user_id, "OAuth callback handled, calendar tokens stored");
        Ok(())
    }

    /// Get a valid access token for the user, refreshing transparently.
    ///
    /// Error mapping follows the API contract:
    /// - no token record: the calendar was never connected (403)
    /// - expired without a refresh token: the user must re-auth (401)
    /// - refresh rejected by Google: the grant is dead, re-auth (401)
    pub async fn valid_access_token(&self, user_id: &str) -> Result<String, AppError> {
        let token = self
            .db
            .get_oauth_token(user_id, PROVIDER)
            .await?
            .ok_or(AppError::CalendarNotConnected)?;

        let now = Utc::now();
        if !token.is_expired_at(now.timestamp()) {
            return Ok(token.access_token);
        }

        let refresh_token = token.refresh_token.clone().ok_or(AppError::AuthExpired)?;

        tracing::info!(user_id, "Access token expired, refreshing");

        let refreshed = match self.client.refresh_token(&refresh_token).await {
            Ok(r) => r,
            Err(e) if e.is_auth_expired() => return Err(AppError::AuthExpired),
            Err(e) => return Err(e),
        };

        let updated = OAuthToken {
            access_token: refreshed.access_token.clone(),
            expires_at: Some(now.timestamp() + refreshed.expires_in),
            updated_at: format_utc_rfc3339(now),
            ..token
        };
        self.db.upsert_oauth_token(&updated).await?;

        tracing::info!(user_id, "Token refreshed and stored");
        Ok(refreshed.access_token)
    }

    /// Fetch the next 30 days of events, classified for stress and category.
    pub async fn upcoming_events(&self, user_id: &str) -> Result<Vec<CalendarEvent>, AppError> {
        let access_token = self.valid_access_token(user_id).await?;

        let time_min = Utc::now();
        let time_max = time_min + Duration::days(EVENT_WINDOW_DAYS);

        let items = match self
            .client
            .list_events(
                &access_token,
                &format_utc_rfc3339(time_min),
                &format_utc_rfc3339(time_max),
                MAX_EVENT_RESULTS,
            )
            .await
        {
            Ok(items) => items,
            Err(e) if e.is_auth_expired() => return Err(AppError::AuthExpired),
            Err(e) => return Err(e),
        };

        let events = items.into_iter().map(project_event).collect();
        Ok(events)
    }
}

/// Project a raw Google event into a classified calendar entry.
fn project_event(event: GoogleEvent) -> CalendarEvent {
    let title = event
        .summary
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "Untitled Event".to_string());
    let description = event.description;

    let classification = classifier::classify_event(&title, description.as_deref().unwrap_or(""));

    let date = event
        .start
        .and_then(|s| s.date_time.or(s.date))
        .unwrap_or_else(|| format_utc_rfc3339(Utc::now()));

    CalendarEvent {
        id: event.id,
        title,
        date,
        category: classification.category,
        stress_level: classification.stress_level,
        description,
        location: event.location,
        food_suggestions: classifier::food_suggestions(classification.stress_level).to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EventCategory, StressLevel};

    fn raw_event(summary: Option<&str>, description: Option<&str>) -> GoogleEvent {
        GoogleEvent {
            id: "evt1".to_string(),
            summary: summary.map(str::to_string),
            description: description.map(str::to_string),
            location: None,
            start: Some(EventStart {
                date_time: Some("2026-03-02T09:00:00Z".to_string()),
                date: None,
            }),
        }
    }

    #[test]
    fn test_project_event_classifies() {
        let projected = project_event(raw_event(Some("Final exam"), None));
        assert_eq!(projected.stress_level, StressLevel::High);
        assert_eq!(projected.category, EventCategory::Exam);
        assert_eq!(projected.date, "2026-03-02T09:00:00Z");
        assert_eq!(projected.food_suggestions.len(), 6);
    }

    #[test]
    fn test_project_event_untitled_fallback() {
        let projected = project_event(raw_event(None, None));
        assert_eq!(projected.title, "Untitled Event");
        assert_eq!(projected.stress_level, StressLevel::Medium);
    }

    #[test]
    fn test_project_event_all_day_date_fallback() {
        let mut event = raw_event(Some("Holiday"), None);
        event.start = Some(EventStart {
            date_time: None,
            date: Some("2026-03-05".to_string()),
        });
        let projected = project_event(event);
        assert_eq!(projected.date, "2026-03-05");
    }

    #[test]
    fn test_authorize_url_carries_scopes_and_state() {
        let client = CalendarClient::new(
            "cid".to_string(),
            "secret".to_string(),
            "http://localhost:8080/auth/google/callback".to_string(),
        );
        let url = client.authorize_url("opaque-state");

        assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
        assert!(url.contains("client_id=cid"));
        assert!(url.contains("access_type=offline"));
        assert!(url.contains("prompt=consent"));
        assert!(url.contains("state=opaque-state"));
        assert!(url.contains(&urlencoding::encode(&OAUTH_SCOPES.join(" ")).into_owned()));
    }
}
