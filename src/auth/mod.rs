//! Service key authentication and viewer sessions.
//!
//! The service key guards this backend itself and is compared in constant time.
//! The viewer's bearer token is separate: it is carried by [`Session`] and
//! passed through to the remote clip API.

mod session;

pub use session::*;

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use subtle::ConstantTimeEq;

use crate::errors::{codes, ErrorDetails, ErrorResponse};

/// Header name for the service key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Service key layer function that takes the expected key as a parameter.
pub async fn psk_auth_layer(
    expected_psk: Option<String>,
    request: Request,
    next: Next,
) -> Response {
    // No key configured: development mode
    let Some(expected) = expected_psk else {
        return next.run(request).await;
    };

    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());

    match provided {
        Some(provided_key) if constant_time_compare(provided_key, &expected) => {
            next.run(request).await
        }
        Some(_) => unauthorized_response("Invalid API key"),
        None => unauthorized_response("Missing API key"),
    }
}

/// Perform constant-time string comparison.
fn constant_time_compare(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

fn unauthorized_response(message: &str) -> Response {
    let body = ErrorResponse {
        success: false,
        error: ErrorDetails {
            code: codes::UNAUTHORIZED.to_string(),
            message: message.to_string(),
            details: None,
        },
    };

    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_key_comparison() {
        assert!(constant_time_compare("clips-service-key", "clips-service-key"));
        assert!(!constant_time_compare("clips-service-key", "clips-service-kez"));
        assert!(!constant_time_compare("short", "clips-service-key"));
        assert!(!constant_time_compare("", "clips-service-key"));
        assert!(constant_time_compare("", ""));
    }

    #[tokio::test]
    async fn test_unauthorized_response_envelope() {
        let response = unauthorized_response("Missing API key");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");
        assert_eq!(body["error"]["message"], "Missing API key");
    }
}
