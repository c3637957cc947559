use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// A single failed field check from the form-validation layer.
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    /// The field that failed validation.
    pub field: &'static str,
    /// Human-readable reason for the failure.
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// The application's error type.
///
/// Transport failures are classified at the gateway boundary; nothing above
/// it inspects raw `reqwest` errors.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Credentials rejected or session invalid.
    #[error("Authentication required")]
    Unauthorized,

    /// The backend could not be reached (connect failure or timeout).
    /// Distinguished from `Unauthorized` so callers can show a
    /// service-unavailable banner instead of forcing a re-login.
    #[error("Backend unreachable: {0}")]
    NetworkUnavailable(String),

    /// The backend answered with an unexpected status.
    #[error("Backend returned status {0}")]
    ServerError(StatusCode),

    /// One or more form fields failed validation before the network.
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    /// An internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A `Result` type that uses `AuthError` as the error type.
pub type Result<T> = std::result::Result<T, AuthError>;

impl AuthError {
    /// Classifies a `reqwest` transport error into the taxonomy.
    ///
    /// Connect and timeout failures become `NetworkUnavailable`; body decode
    /// failures are `Internal` since the backend did answer.
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_decode() || err.is_builder() {
            AuthError::Internal(err.to_string())
        } else {
            AuthError::NetworkUnavailable(err.to_string())
        }
    }

    /// Maps a non-success backend status for an authenticated call.
    pub fn from_status(status: StatusCode) -> Self {
        if status == StatusCode::UNAUTHORIZED {
            AuthError::Unauthorized
        } else {
            AuthError::ServerError(status)
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<&'a [FieldError]>,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message, fields) = match self {
            AuthError::Unauthorized => {
                tracing::warn!("Authentication required");
                (StatusCode::UNAUTHORIZED, "Authentication required".to_string(), None)
            }

            AuthError::NetworkUnavailable(ref msg) => {
                tracing::warn!("Backend unreachable: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Service unavailable, your session is unchanged".to_string(),
                    None,
                )
            }

            AuthError::ServerError(code) => {
                tracing::error!("Backend returned status {}", code);
                (code, format!("Backend error ({})", code.as_u16()), None)
            }

            AuthError::Validation(fields) => {
                tracing::debug!("Validation failed on {} field(s)", fields.len());
                (StatusCode::BAD_REQUEST, "Validation failed".to_string(), Some(fields))
            }

            AuthError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string(), None)
            }
        };

        let body = sonic_rs::to_string(&ErrorBody {
            error: &message,
            fields: fields.as_deref(),
        })
        .unwrap_or_else(|_| r#"{"error":"Internal server error"}"#.to_string());

        (status, [(http::header::CONTENT_TYPE, "application/json")], body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_maps_to_401() {
        let response = AuthError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn network_unavailable_maps_to_503() {
        let response = AuthError::NetworkUnavailable("connection refused".into()).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn validation_maps_to_400() {
        let err = AuthError::Validation(vec![FieldError::new("email", "not an email address")]);
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn server_error_bubbles_status() {
        let response = AuthError::ServerError(StatusCode::BAD_GATEWAY).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
