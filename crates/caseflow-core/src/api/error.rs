use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

use crate::notify::Notification;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized - session expired")]
    AuthenticationExpired,

    #[error("Request failed with status {status}{}", detail_suffix(.detail))]
    RequestFailed {
        status: StatusCode,
        detail: Option<String>,
    },

    #[error("Network error: {0}")]
    NetworkUnreachable(#[source] reqwest::Error),

    #[error("Request timed out: {0}")]
    Timeout(#[source] reqwest::Error),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail.as_deref().map(|d| format!(": {}", d)).unwrap_or_default()
}

/// Maximum length for server detail messages
const MAX_DETAIL_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a detail message to avoid showing or logging excessive data
    fn truncate_detail(detail: &str) -> String {
        if detail.len() <= MAX_DETAIL_LENGTH {
            return detail.to_string();
        }
        let mut end = MAX_DETAIL_LENGTH;
        while !detail.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &detail[..end], detail.len())
    }

    /// Pull the human-readable `detail` out of an error body.
    ///
    /// The backend sends either `{"detail": "text"}` or, for validation
    /// failures, `{"detail": [{"msg": "..."}, ...]}`.
    fn extract_detail(body: &str) -> Option<String> {
        let value: Value = serde_json::from_str(body).ok()?;
        let detail = match value.get("detail")? {
            Value::String(s) => s.clone(),
            Value::Array(items) => items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join("; "),
            _ => return None,
        };
        let detail = detail.trim();
        if detail.is_empty() {
            None
        } else {
            Some(Self::truncate_detail(detail))
        }
    }

    pub fn from_status(status: StatusCode, body: &str) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => ApiError::AuthenticationExpired,
            _ => ApiError::RequestFailed {
                status,
                detail: Self::extract_detail(body),
            },
        }
    }

    /// Classify a transport error: no response was received.
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout(err)
        } else if err.is_builder() {
            ApiError::InvalidRequest(err.to_string())
        } else {
            ApiError::NetworkUnreachable(err)
        }
    }

    /// Notification the response pipeline shows for this error, if any.
    /// Timeouts count as "no response" and share the network notification.
    pub fn notification(&self) -> Option<Notification> {
        match self {
            ApiError::AuthenticationExpired => Some(Notification::SessionExpired),
            ApiError::RequestFailed { detail, .. } => Some(Notification::RequestFailed {
                detail: detail.clone(),
            }),
            ApiError::NetworkUnreachable(_) | ApiError::Timeout(_) => Some(Notification::NetworkError),
            ApiError::InvalidRequest(_) | ApiError::InvalidResponse(_) => None,
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::AuthenticationExpired => Some(StatusCode::UNAUTHORIZED),
            ApiError::RequestFailed { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_auth_expired(&self) -> bool {
        matches!(self, ApiError::AuthenticationExpired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_401() {
        let err = ApiError::from_status(StatusCode::UNAUTHORIZED, r#"{"detail": "Not authenticated"}"#);
        assert!(err.is_auth_expired());
        assert_eq!(err.notification(), Some(Notification::SessionExpired));
        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
    }

    #[test]
    fn test_from_status_with_detail() {
        let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, r#"{"detail": "db down"}"#);
        match &err {
            ApiError::RequestFailed { status, detail } => {
                assert_eq!(*status, StatusCode::INTERNAL_SERVER_ERROR);
                assert_eq!(detail.as_deref(), Some("db down"));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(err.to_string(), "Request failed with status 500 Internal Server Error: db down");
    }

    #[test]
    fn test_from_status_without_detail() {
        for body in ["", "<html>oops</html>", r#"{"error": "x"}"#, r#"{"detail": ""}"#, r#"{"detail": 5}"#] {
            let err = ApiError::from_status(StatusCode::BAD_REQUEST, body);
            assert_eq!(
                err.notification(),
                Some(Notification::RequestFailed { detail: None }),
                "body {:?}",
                body
            );
        }
    }

    #[test]
    fn test_validation_detail_list() {
        let body = r#"{"detail": [{"loc": ["body", "name"], "msg": "field required"}, {"msg": "too short"}]}"#;
        let err = ApiError::from_status(StatusCode::UNPROCESSABLE_ENTITY, body);
        assert_eq!(
            err.notification().map(|n| n.message().to_string()).as_deref(),
            Some("field required; too short")
        );
    }

    #[test]
    fn test_long_detail_is_truncated() {
        let long = "é".repeat(400);
        let body = serde_json::json!({ "detail": long }).to_string();
        let err = ApiError::from_status(StatusCode::BAD_REQUEST, &body);
        let detail = match err {
            ApiError::RequestFailed { detail: Some(d), .. } => d,
            other => panic!("unexpected {:?}", other),
        };
        assert!(detail.contains("truncated, 800 total bytes"));
    }

    #[test]
    fn test_decode_errors_are_silent() {
        assert_eq!(ApiError::InvalidResponse("bad json".to_string()).notification(), None);
    }
}
