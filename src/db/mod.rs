//! Database layer (Firestore).

pub mod firestore;

pub use firestore::FirestoreDb;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    /// OAuth tokens, keyed by `{user_id}_{provider}`
    pub const OAUTH_TOKENS: &str = "oauth_tokens";
    pub const MEALS: &str = "meals";
    pub const NUTRIENT_INTAKE: &str = "nutrient_intake";
    pub const SYMPTOM_LOGS: &str = "symptom_logs";
}
