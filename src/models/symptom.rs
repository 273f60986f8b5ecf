//! Symptom chat models.

use serde::{Deserialize, Serialize};

/// The advisor's verdict for one symptom message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SymptomAnalysis {
    /// Free-text analysis shown in the chat
    pub analysis: String,
    /// Nutrients the user may be deficient in
    pub recommended_nutrients: Vec<String>,
    /// Concrete diet suggestions
    pub diet_suggestions: Vec<String>,
}

/// A symptom chat exchange stored in Firestore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymptomLog {
    pub user_id: String,
    /// The user's free-text symptom description
    pub symptoms: String,
    /// The analysis text returned to the user
    pub analysis: String,
    pub created_at: String,
}
