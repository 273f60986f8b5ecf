// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google Calendar OAuth routes.
//!
//! The connect endpoint requires a session and redirects to Google; the
//! callback is public (Google calls it) and recovers the user from the
//! HMAC-signed state parameter.

use axum::{
    extract::{Extension, Query, State},
    response::Redirect,
    routing::get,
    Router,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::Deserialize;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::AppState;

use hmac::{Hmac, Mac};
use sha2::Sha256;

// Type alias for HMAC-SHA256
type HmacSha256 = Hmac<Sha256>;

/// Routes reachable without a session (Google redirects here).
pub fn callback_routes() -> Router<Arc<AppState>> {
    Router::new().route("/auth/google/callback", get(auth_callback))
}

/// Routes that require a session (applied auth middleware in routes/mod.rs).
pub fn connect_routes() -> Router<Arc<AppState>> {
    Router::new().route("/auth/google", get(auth_connect))
}

/// Query parameters for starting the OAuth flow.
#[derive(Deserialize)]
pub struct ConnectParams {
    /// Frontend URL to redirect back to after OAuth completes.
    /// If not provided, uses the configured frontend URL.
    #[serde(default)]
    redirect_uri: Option<String>,
}

/// Start OAuth flow - redirect to Google authorization.
async fn auth_connect(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<ConnectParams>,
) -> Result<Redirect> {
    let frontend_url = params
        .redirect_uri
        .unwrap_or_else(|| state.config.frontend_url.clone());

    let oauth_state = sign_state(&user.user_id, &frontend_url, &state.config.oauth_state_key)?;
    let auth_url = state.calendar.authorize_url(&oauth_state);

    tracing::info!(
        user_id = %user.user_id,
        frontend_url = %frontend_url,
        "Starting calendar OAuth flow, redirecting to Google"
    );

    Ok(Redirect::temporary(&auth_url))
}

#[derive(Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
    state: String,
    #[serde(default)]
    error: Option<String>,
}

/// OAuth callback - exchange code for tokens and store them.
///
/// All outcomes redirect to the frontend; the query string tells the UI
/// what happened.
async fn auth_callback(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CallbackParams>,
) -> Redirect {
    // Recover user and frontend URL from the signed state parameter
    let Some((user_id, frontend_url)) =
        verify_and_decode_state(&params.state, &state.config.oauth_state_key)
    else {
        tracing::warn!("Invalid or tampered OAuth state parameter");
        let redirect = format!("{}/calendar?error=invalid_state", state.config.frontend_url);
        return Redirect::temporary(&redirect);
    };

    // User denied access (or Google reported another error)
    if let Some(error) = params.error {
        tracing::warn!(user_id = %user_id, error = %error, "OAuth error from Google");
        let redirect = format!("{}/calendar?error=access_denied", frontend_url);
        return Redirect::temporary(&redirect);
    }

    let Some(code) = params.code else {
        tracing::warn!(user_id = %user_id, "Missing authorization code in callback");
        let redirect = format!("{}/calendar?error=missing_params", frontend_url);
        return Redirect::temporary(&redirect);
    };

    tracing::info!(user_id = %user_id, "Exchanging authorization code for tokens");

    match state.calendar.handle_oauth_callback(&user_id, &code).await {
        Ok(()) => {
            let redirect = format!("{}/calendar?connected=true", frontend_url);
            Redirect::temporary(&redirect)
        }
        Err(e) => {
            tracing::error!(user_id = %user_id, error = %e, "OAuth callback failed");
            let redirect = format!("{}/calendar?error=callback_failed", frontend_url);
            Redirect::temporary(&redirect)
        }
    }
}

/// Sign `user_id|frontend_url|timestamp` with HMAC-SHA256 and base64-encode.
fn sign_state(user_id: &str, frontend_url: &str, secret: &[u8]) -> Result<String> {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("System time error: {}", e)))?
        .as_millis();

    let payload = format!("{}|{}|{:x}", user_id, frontend_url, timestamp);

    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("HMAC init failed: {}", e)))?;
    mac.update(payload.as_bytes());
    let signature = mac.finalize().into_bytes();

    let signed = format!("{}|{}", payload, hex::encode(signature));
    Ok(URL_SAFE_NO_PAD.encode(signed.as_bytes()))
}

/// Verify the HMAC signature and decode (user_id, frontend_url).
fn verify_and_decode_state(state: &str, secret: &[u8]) -> Option<(String, String)> {
    let bytes = URL_SAFE_NO_PAD.decode(state).ok()?;
    let state_str = String::from_utf8(bytes).ok()?;

    // Format is "user_id|frontend_url|timestamp_hex|signature_hex"
    let parts: Vec<&str> = state_str.splitn(4, '|').collect();
    if parts.len() != 4 {
        return None;
    }

    let user_id = parts[0];
    let frontend_url = parts[1];
    let timestamp_hex = parts[2];
    let signature_hex = parts[3];

    // Reconstruct payload and verify signature
    let payload = format!("{}|{}|{}", user_id, frontend_url, timestamp_hex);

    let mut mac = HmacSha256::new_from_slice(secret).ok()?;
    mac.update(payload.as_bytes());

    let expected_signature = hex::encode(mac.finalize().into_bytes());

    if signature_hex != expected_signature {
        tracing::error!("OAuth state signature mismatch! Potential tampering.");
        return None;
    }

    Some((user_id.to_string(), frontend_url.to_string()))
}
