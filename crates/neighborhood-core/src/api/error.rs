use thiserror::Error;

/// Failures talking to the neighborhood backend.
#[derive(Error, Debug)]
pub enum ApiError {
    /// 401: no `Authorization: Token` header, or the backend rejected it
    #[error("Not authenticated - set a valid API token")]
    Unauthorized,

    /// 403: the token's account may not do this
    #[error("Access denied by the backend: {0}")]
    AccessDenied(String),

    #[error("No such resource: {0}")]
    NotFound(String),

    /// 400: the backend's field errors, usually a JSON object
    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("Still rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("Backend error {status}: {body}")]
    ServerError { status: u16, body: String },

    #[error("Unexpected status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// The request never got a response
    #[error("Could not reach {url}")]
    Unreachable {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body on a char boundary
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
        let body = Self::truncate_body(body);
        match status.as_u16() {
            400 => ApiError::Rejected(body),
            401 => ApiError::Unauthorized,
            403 => ApiError::AccessDenied(body),
            404 => ApiError::NotFound(body),
            429 => ApiError::RateLimited { retries: 0 },
            status @ 500..=599 => ApiError::ServerError { status, body },
            status => ApiError::UnexpectedStatus { status, body },
        }
    }

    /// Whether the backend was never reached, as opposed to answering with
    /// an error.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, ApiError::Unreachable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status_mapping() {
        assert!(matches!(
            ApiError::from_status(StatusCode::UNAUTHORIZED, ""),
            ApiError::Unauthorized
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::FORBIDDEN, "nope"),
            ApiError::AccessDenied(body) if body == "nope"
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::NOT_FOUND, "/residents/9"),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::TOO_MANY_REQUESTS, ""),
            ApiError::RateLimited { retries: 0 }
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_GATEWAY, "upstream"),
            ApiError::ServerError { status: 502, .. }
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_REQUEST, r#"{"email":["required"]}"#),
            ApiError::Rejected(body) if body.contains("email")
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::CONFLICT, "taken"),
            ApiError::UnexpectedStatus { status: 409, .. }
        ));
    }

    #[test]
    fn test_long_body_truncated() {
        let body = "é".repeat(400);
        match ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, &body) {
            ApiError::ServerError { body, .. } => {
                assert!(body.contains("truncated, 800 total bytes"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_unauthorized_message_names_token() {
        assert!(ApiError::Unauthorized.to_string().contains("API token"));
    }
}
