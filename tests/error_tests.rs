// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use nutritrack::error::AppError;

#[test]
fn test_is_auth_expired_matches() {
    let err = AppError::AuthExpired;
    assert!(err.is_auth_expired());

    let err = AppError::GoogleApi("error: invalid_grant".to_string());
    assert!(err.is_auth_expired());

    let err = AppError::GoogleApi(AppError::GOOGLE_AUTH_ERROR.to_string());
    assert!(err.is_auth_expired());
}

#[test]
fn test_is_auth_expired_no_match() {
    let err = AppError::GoogleApi("HTTP 500: backend unavailable".to_string());
    assert!(!err.is_auth_expired());

    let err = AppError::CalendarNotConnected;
    assert!(!err.is_auth_expired());

    let err = AppError::BadRequest("Bad Request".to_string());
    assert!(!err.is_auth_expired());
}

mod response_mapping {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    #[test]
    fn test_auth_errors_map_to_conventional_codes() {
        assert_eq!(
            AppError::Unauthorized.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::CalendarNotConnected.into_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::AuthExpired.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_upstream_errors_map_to_bad_gateway() {
        assert_eq!(
            AppError::GoogleApi("boom".to_string()).into_response().status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::Gemini("boom".to_string()).into_response().status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::NutritionDb("boom".to_string())
                .into_response()
                .status(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_internal_errors_hide_details() {
        assert_eq!(
            AppError::Database("connection dropped".to_string())
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::Internal(anyhow::anyhow!("oops"))
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
