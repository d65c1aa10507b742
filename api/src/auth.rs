/// Shared-secret request gate.
use axum::extract::{Query, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, warn};

use ytrelay_shared::errors::{RelayError, RelayResult};

use crate::errors::ApiError;
use crate::AppState;

/// Header carrying the shared secret.
pub const HEADER_API_KEY: &str = "x-api-key";
/// Query parameter carrying the shared secret.
pub const QUERY_API_KEY: &str = "api_key";
/// Liveness probe path, the only ungated route.
pub const HEALTH_PATH: &str = "/health";

/// Reject requests that do not carry the configured API key.
pub async fn require_api_key(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if req.uri().path() == HEALTH_PATH {
        return Ok(next.run(req).await);
    }

    match check_api_key(state.config.api_key.as_deref(), extract_api_key(&req).as_deref()) {
        Ok(()) => Ok(next.run(req).await),
        Err(e) => {
            match &e {
                RelayError::Config(_) => error!("API_KEY is not configured, rejecting {}", req.uri().path()),
                _ => warn!("Rejected unauthenticated request to {}", req.uri().path()),
            }
            Err(ApiError::from_relay("Request rejected", e))
        }
    }
}

/// Decide a request against the configured secret. No secret fails closed.
pub fn check_api_key(expected: Option<&str>, given: Option<&str>) -> RelayResult<()> {
    let Some(expected) = expected else {
        return Err(RelayError::Config(
            "Server configuration error: API key not set".to_string(),
        ));
    };
    match given {
        Some(key) if keys_match(key, expected) => Ok(()),
        _ => Err(RelayError::Auth(
            "Unauthorized: Invalid or missing API key".to_string(),
        )),
    }
}

/// Read the key from the header, falling back to the query string.
fn extract_api_key(req: &Request) -> Option<String> {
    if let Some(value) = req
        .headers()
        .get(HEADER_API_KEY)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
    {
        return Some(value.to_string());
    }

    Query::<HashMap<String, String>>::try_from_uri(req.uri())
        .ok()
        .and_then(|Query(mut params)| params.remove(QUERY_API_KEY))
        .filter(|v| !v.is_empty())
}

/// Compare without bailing out at the first differing byte.
fn keys_match(given: &str, expected: &str) -> bool {
    let (a, b) = (given.as_bytes(), expected.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
