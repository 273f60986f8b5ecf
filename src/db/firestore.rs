// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (profile storage)
//! - OAuth tokens (keyed by user and provider)
//! - Meals and nutrient intake rows (scan results)
//! - Symptom logs (chat history)

use crate::db::collections;
use crate::error::AppError;
use crate::models::{Meal, NutrientIntake, OAuthToken, SymptomLog, User};
use futures_util::{stream, StreamExt};

const MAX_CONCURRENT_DB_OPS: usize = 50;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user by their auth-provider ID.
    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or update a user.
    pub async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.user_id)
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── OAuth Token Operations ──────────────────────────────────

    /// Get stored tokens for a (user, provider) pair.
    pub async fn get_oauth_token(
        &self,
        user_id: &str,
        provider: &str,
    ) -> Result<Option<OAuthToken>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::OAUTH_TOKENS)
            .obj()
            .one(&OAuthToken::document_id(user_id, provider))
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Store tokens for a (user, provider) pair.
    ///
    /// The document ID encodes the pair, so re-connecting overwrites the
    /// previous grant instead of accumulating duplicates.
    pub async fn upsert_oauth_token(&self, token: &OAuthToken) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::OAUTH_TOKENS)
            .document_id(OAuthToken::document_id(&token.user_id, &token.provider))
            .object(token)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Delete tokens for a (user, provider) pair (disconnect).
    pub async fn delete_oauth_token(&self, user_id: &str, provider: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::OAUTH_TOKENS)
            .document_id(OAuthToken::document_id(user_id, provider))
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Meal Operations ─────────────────────────────────────────

    /// Store a scanned meal (auto-generated document ID).
    pub async fn insert_meal(&self, meal: &Meal) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .insert()
            .into(collections::MEALS)
            .generate_document_id()
            .object(meal)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Nutrient Intake Operations ──────────────────────────────

    /// Store a batch of intake rows.
    ///
    /// Uses concurrent writes with a limit to avoid overloading Firestore.
    pub async fn batch_insert_intake(&self, rows: &[NutrientIntake]) -> Result<(), AppError> {
        let client = self.get_client()?;

        stream::iter(rows.to_vec())
            .map(|row| async move {
                let _: () = client
                    .fluent()
                    .insert()
                    .into(collections::NUTRIENT_INTAKE)
                    .generate_document_id()
                    .object(&row)
                    .execute()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;

                Ok::<_, AppError>(())
            })
            .buffer_unordered(MAX_CONCURRENT_DB_OPS)
            .collect::<Vec<Result<(), AppError>>>()
            .await
            .into_iter()
            .collect::<Result<Vec<()>, AppError>>()?;

        Ok(())
    }

    /// Get a user's intake rows with meal_time at or after the cutoff.
    pub async fn get_intake_since(
        &self,
        user_id: &str,
        cutoff_rfc3339: &str,
    ) -> Result<Vec<NutrientIntake>, AppError> {
        let user_id = user_id.to_string();
        let cutoff = cutoff_rfc3339.to_string();

        self.get_client()?
            .fluent()
            .select()
            .from(collections::NUTRIENT_INTAKE)
            .filter(move |q| {
                q.for_all([
                    q.field("user_id").eq(user_id.clone()),
                    q.field("meal_time").greater_than_or_equal(cutoff.clone()),
                ])
            })
            .order_by([(
                "meal_time",
                firestore::FirestoreQueryDirection::Descending,
            )])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Symptom Log Operations ──────────────────────────────────

    /// Store one symptom chat exchange (auto-generated document ID).
    pub async fn insert_symptom_log(&self, log: &SymptomLog) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .insert()
            .into(collections::SYMPTOM_LOGS)
            .generate_document_id()
            .object(log)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
