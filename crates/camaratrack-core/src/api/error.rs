use thiserror::Error;

/// Failure talking to one of the remote sources.
///
/// Nothing below the batch runner handles this: it propagates unchanged out of
/// the collector so the runner can abandon the whole party.
#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Unauthorized request")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limited by remote source")]
    RateLimited,

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl RemoteError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            401 => RemoteError::Unauthorized,
            403 => RemoteError::AccessDenied(truncated),
            404 => RemoteError::NotFound(truncated),
            429 => RemoteError::RateLimited,
            500..=599 => RemoteError::ServerError(truncated),
            _ => RemoteError::InvalidResponse(format!("Status {}: {}", status, truncated)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status_maps_known_codes() {
        assert!(matches!(
            RemoteError::from_status(StatusCode::UNAUTHORIZED, ""),
            RemoteError::Unauthorized
        ));
        assert!(matches!(
            RemoteError::from_status(StatusCode::NOT_FOUND, "missing"),
            RemoteError::NotFound(ref body) if body == "missing"
        ));
        assert!(matches!(
            RemoteError::from_status(StatusCode::TOO_MANY_REQUESTS, ""),
            RemoteError::RateLimited
        ));
        assert!(matches!(
            RemoteError::from_status(StatusCode::BAD_GATEWAY, "upstream"),
            RemoteError::ServerError(_)
        ));
        assert!(matches!(
            RemoteError::from_status(StatusCode::IM_A_TEAPOT, ""),
            RemoteError::InvalidResponse(_)
        ));
    }

    #[test]
    fn test_long_body_is_truncated() {
        let body = "x".repeat(MAX_ERROR_BODY_LENGTH * 2);
        let err = RemoteError::from_status(StatusCode::INTERNAL_SERVER_ERROR, &body);
        match err {
            RemoteError::ServerError(msg) => {
                assert!(msg.contains("truncated, 1000 total bytes"));
                assert!(msg.len() < body.len());
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
