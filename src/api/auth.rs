//! Optional API key authentication
//!
//! When `ApiConfig::api_key` is set, every request must carry a matching `X-Api-Key`
//! header or it is rejected with 401 and an `unauthorized` error body.

use crate::error::ApiError;
use axum::{
    Json,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Header carrying the API key
pub const API_KEY_HEADER: &str = "x-api-key";

/// Middleware that checks the `X-Api-Key` header against the configured key
///
/// # Examples
///
/// ```no_run
/// use axum::{Router, middleware};
/// use media_dl::api::auth::require_api_key;
///
/// let router: Router = Router::new().layer(middleware::from_fn_with_state(
///     Some("secret-key-123".to_string()),
///     require_api_key,
/// ));
/// ```
pub async fn require_api_key(
    State(expected_api_key): State<Option<String>>,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected_key) = expected_api_key else {
        return next.run(request).await;
    };

    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok());

    match provided {
        Some(key) if constant_time_eq(key.as_bytes(), expected_key.as_bytes()) => {
            next.run(request).await
        }
        Some(_) => {
            tracing::debug!(path = %request.uri().path(), "Rejected request with invalid API key");
            unauthorized("Invalid API key")
        }
        None => unauthorized("Missing X-Api-Key header"),
    }
}

/// Compare all bytes regardless of where the first mismatch is
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

fn unauthorized(message: &str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(ApiError::unauthorized(message))).into_response()
}
