/// Unified error types for the YtRelay system.
use thiserror::Error;

/// Top-level error type for YtRelay operations.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for RelayError {
    fn from(e: serde_json::Error) -> Self {
        RelayError::Parse(e.to_string())
    }
}

/// Errors raised while running the external downloader.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Failed to start downloader: {0}")]
    SpawnFailed(String),

    #[error("Downloader exited with code {code:?}: {stderr}")]
    Exited { code: Option<i32>, stderr: String },

    #[error("Downloader timed out after {0}s")]
    Timeout(u64),

    #[error("Downloader produced non UTF-8 output")]
    InvalidOutput,
}

impl ToolError {
    /// Diagnostic text reported by the tool itself, if any.
    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            ToolError::Exited { stderr, .. } if !stderr.is_empty() => Some(stderr.as_str()),
            _ => None,
        }
    }
}

/// Result type alias for YtRelay operations.
pub type RelayResult<T> = Result<T, RelayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_error_becomes_parse() {
        let err: RelayError = serde_json::from_str::<serde_json::Value>("{not json")
            .unwrap_err()
            .into();
        assert!(matches!(err, RelayError::Parse(_)));
    }

    #[test]
    fn test_tool_diagnostic() {
        let err = ToolError::Exited { code: Some(1), stderr: "ERROR: Unsupported URL".into() };
        assert_eq!(err.diagnostic(), Some("ERROR: Unsupported URL"));
        assert!(err.to_string().contains("Unsupported URL"));

        assert_eq!(ToolError::Timeout(5).diagnostic(), None);
    }
}
