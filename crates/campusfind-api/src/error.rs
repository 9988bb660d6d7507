use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use campusfind_db::StoreError;

/// Client-facing error taxonomy. Full diagnostics are logged server-side;
/// the body carries the message and, for store failures, the result code
/// and raw store message.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Client-supplied data failed a local rule.
    #[error("{0}")]
    Validation(String),

    /// A unique key already exists.
    #[error("{0}")]
    Conflict(String),

    /// Unknown username and wrong password share this message on purpose;
    /// callers must not be able to enumerate usernames.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// No usable session cookie on a protected route.
    #[error("Not authenticated")]
    Unauthenticated,

    #[error("{0}")]
    RateLimited(String),

    /// Store failure not otherwise classified. `details` carries the raw
    /// store message alongside the prefixed one.
    #[error("{message}")]
    Persistence {
        message: String,
        code: Option<i32>,
        details: Option<String>,
    },

    /// A required secret or key is absent.
    #[error("{0}")]
    Configuration(String),

    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::Validation(_) | ApiError::Conflict(_) | ApiError::Persistence { .. } => {
                StatusCode::BAD_REQUEST
            }
            ApiError::InvalidCredentials | ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Configuration(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let mut body = json!({ "error": self.to_string() });
        if let ApiError::Persistence { code, details, .. } = &self {
            if let Some(code) = code {
                body["code"] = json!(code);
            }
            if let Some(details) = details {
                body["details"] = json!(details);
            }
        }

        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Sqlite { code, extended_code, ref message } => {
                error!("store failure: code={code} extended={extended_code} message={message}");
                ApiError::Persistence {
                    message: format!("Database error: {message}"),
                    code: Some(extended_code),
                    details: Some(message.clone()),
                }
            }
            StoreError::NotFound => ApiError::Persistence {
                message: "Database error: no matching row".into(),
                code: None,
                details: None,
            },
            other => {
                error!("store failure: {other}");
                ApiError::Internal("Internal server error".into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_errors_share_one_message() {
        // The whole point: absent user and bad password are indistinguishable.
        assert_eq!(
            ApiError::InvalidCredentials.to_string(),
            "Invalid username or password"
        );
    }

    #[test]
    fn persistence_error_carries_message_code_and_details() {
        let err: ApiError = StoreError::Sqlite {
            code: 19,
            extended_code: 2067,
            message: "UNIQUE constraint failed: users.username".into(),
        }
        .into();
        match err {
            ApiError::Persistence { message, code, details } => {
                assert_eq!(
                    message,
                    "Database error: UNIQUE constraint failed: users.username"
                );
                assert_eq!(code, Some(2067));
                assert_eq!(
                    details.as_deref(),
                    Some("UNIQUE constraint failed: users.username")
                );
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
