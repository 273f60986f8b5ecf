// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore integration tests (require the emulator).
//!
//! Run with: FIRESTORE_EMULATOR_HOST=localhost:8080 cargo test

use nutritrack::models::{NutrientIntake, OAuthToken, User};
use nutritrack::time_utils::format_utc_rfc3339;

mod common;

#[tokio::test]
async fn test_user_roundtrip() {
    require_emulator!();
    let db = common::test_db().await;

    let now = format_utc_rfc3339(chrono::Utc::now());
    let user = User {
        user_id: "it-user-1".to_string(),
        email: Some("it@example.com".to_string()),
        display_name: Some("Integration Tester".to_string()),
        created_at: now.clone(),
        last_active: now,
    };

    db.upsert_user(&user).await.expect("upsert user");

    let fetched = db
        .get_user("it-user-1")
        .await
        .expect("get user")
        .expect("user exists");
    assert_eq!(fetched.email.as_deref(), Some("it@example.com"));
}

#[tokio::test]
async fn test_oauth_token_upsert_overwrites_per_provider() {
    require_emulator!();
    let db = common::test_db().await;

    let mut token = OAuthToken {
        user_id: "it-user-2".to_string(),
        provider: "google".to_string(),
        access_token: "first".to_string(),
        refresh_token: Some("refresh".to_string()),
        expires_at: Some(1_700_000_000),
        scopes: vec!["calendar.readonly".to_string()],
        updated_at: format_utc_rfc3339(chrono::Utc::now()),
    };
    db.upsert_oauth_token(&token).await.expect("store token");

    // Re-connecting replaces the grant instead of adding a second row
    token.access_token = "second".to_string();
    db.upsert_oauth_token(&token).await.expect("replace token");

    let fetched = db
        .get_oauth_token("it-user-2", "google")
        .await
        .expect("get token")
        .expect("token exists");
    assert_eq!(fetched.access_token, "second");

    db.delete_oauth_token("it-user-2", "google")
        .await
        .expect("delete token");
    let gone = db.get_oauth_token("it-user-2", "google").await.expect("get");
    assert!(gone.is_none());
}

#[tokio::test]
async fn test_intake_query_respects_cutoff() {
    require_emulator!();
    let db = common::test_db().await;

    let user_id = "it-user-3";
    let recent = chrono::Utc::now() - chrono::Duration::days(1);
    let old = chrono::Utc::now() - chrono::Duration::days(30);

    let rows = vec![
        NutrientIntake {
            user_id: user_id.to_string(),
            nutrient_name: "Protein".to_string(),
            amount: 12.0,
            unit: "g".to_string(),
            meal_time: format_utc_rfc3339(recent),
        },
        NutrientIntake {
            user_id: user_id.to_string(),
            nutrient_name: "Protein".to_string(),
            amount: 99.0,
            unit: "g".to_string(),
            meal_time: format_utc_rfc3339(old),
        },
    ];
    db.batch_insert_intake(&rows).await.expect("insert intake");

    let cutoff = chrono::Utc::now() - chrono::Duration::days(7);
    let fetched = db
        .get_intake_since(user_id, &format_utc_rfc3339(cutoff))
        .await
        .expect("query intake");

    assert_eq!(fetched.len(), 1);
    assert_eq!(fetched[0].amount, 12.0);
}
