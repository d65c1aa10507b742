/// HTTP error responses.
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use std::any::Any;
use tracing::error;

use ytrelay_shared::errors::RelayError;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// A status code plus the body sent to the caller.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    error: String,
    details: Option<String>,
}

impl ApiError {
    fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn bad_request(error: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error)
    }

    pub fn unauthorized(error: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, error)
    }

    /// The server itself is misconfigured; not the caller's fault.
    pub fn config(error: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, error)
    }

    pub fn not_found(error: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, error)
    }

    pub fn internal(error: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, error)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Translate a domain error. `context` becomes the top-level message for
    /// failures that carry a diagnostic, which goes into `details`.
    pub fn from_relay(context: &str, err: RelayError) -> Self {
        match err {
            RelayError::Validation(msg) => Self::bad_request(msg),
            RelayError::Auth(msg) => Self::unauthorized(msg),
            RelayError::Config(msg) => Self::config(msg),
            RelayError::NotFound(name) => Self::not_found(context).with_details(name),
            RelayError::Tool(e) => Self::internal(context).with_details(e.to_string()),
            RelayError::Parse(msg) => Self::internal(context).with_details(msg),
            RelayError::Io(e) => Self::internal(context).with_details(e.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request("Invalid JSON body").with_details(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.error,
                details: self.details,
            }),
        )
            .into_response()
    }
}

/// Response for a panic escaping a handler. Detail is logged, never returned.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    error!("Unhandled fault: {}", detail);
    ApiError::internal("Something went wrong!").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ytrelay_shared::errors::ToolError;

    #[test]
    fn test_relay_mapping() {
        let err = ApiError::from_relay("Download failed", RelayError::Validation("bad".into()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err = ApiError::from_relay("Gone", RelayError::NotFound("a.mp4".into()));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let err = ApiError::from_relay("Failed to get video info", RelayError::Parse("eof".into()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.error, "Failed to get video info");
        assert_eq!(err.details.as_deref(), Some("eof"));
    }

    #[test]
    fn test_tool_details_include_stderr() {
        let tool = ToolError::Exited { code: Some(1), stderr: "ERROR: Private video".into() };
        let err = ApiError::from_relay("Download failed", tool.into());
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.details.unwrap().contains("ERROR: Private video"));
    }

    #[tokio::test]
    async fn test_panic_response_is_generic() {
        let resp = handle_panic(Box::new("index out of bounds: secret detail"));
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, serde_json::json!({ "error": "Something went wrong!" }));
    }
}
