//! User and OAuth token models for storage and API.

use serde::{Deserialize, Serialize};

/// User profile stored in Firestore.
///
/// Accounts are created by the external auth provider; this record is a
/// minimal projection upserted when the user first connects a calendar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Auth-provider user ID (also used as document ID)
    pub user_id: String,
    /// Email address (may be None if not shared)
    pub email: Option<String>,
    /// Display name
    pub display_name: Option<String>,
    /// When user first connected
    pub created_at: String,
    /// Last activity timestamp
    pub last_active: String,
}

/// A user's OAuth tokens for one provider.
///
/// Keyed by `{user_id}_{provider}` so the datastore enforces the
/// one-token-per-(user, provider) invariant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthToken {
    pub user_id: String,
    /// Provider name ("google")
    pub provider: String,
    pub access_token: String,
    /// Absent when Google did not grant offline access
    pub refresh_token: Option<String>,
    /// Access token expiry (Unix epoch seconds)
    pub expires_at: Option<i64>,
    /// Granted OAuth scopes
    pub scopes: Vec<String>,
    /// Last update timestamp (ISO 8601)
    pub updated_at: String,
}

impl OAuthToken {
    /// Document ID for the (user, provider) pair.
    pub fn document_id(user_id: &str, provider: &str) -> String {
        format!("{}_{}", user_id, provider)
    }

    /// Whether the access token is expired at the given wall-clock epoch.
    /// Tokens without a stored expiry are assumed valid.
    pub fn is_expired_at(&self, now_epoch: i64) -> bool {
        matches!(self.expires_at, Some(exp) if exp < now_epoch)
    }
}
