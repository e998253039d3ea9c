use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Coarse classification of every failure the gateway can return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InputValidation,
    Conflict,
    Unauthorized,
    UpstreamUnavailable,
    Internal,
}

impl ErrorKind {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorKind::InputValidation | ErrorKind::Conflict => StatusCode::BAD_REQUEST,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::UpstreamUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Errors returned to HTTP clients. The `Display` text is the public message.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid input")]
    InvalidInput,

    #[error("Invalid input, '{0}' field is required.")]
    MissingField(&'static str),

    #[error("Email already exists")]
    EmailTaken,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Authorization header required")]
    MissingAuthHeader,

    #[error("Bearer token required")]
    BearerRequired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("AI service is unreachable")]
    BackendUnavailable,

    #[error("Failed to hash password")]
    HashFailed,

    #[error("Failed to create token")]
    TokenSigning,

    #[error("Failed to read response from AI service")]
    BackendRead,

    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::InvalidInput | ApiError::MissingField(_) => ErrorKind::InputValidation,
            ApiError::EmailTaken => ErrorKind::Conflict,
            ApiError::InvalidCredentials
            | ApiError::MissingAuthHeader
            | ApiError::BearerRequired
            | ApiError::InvalidToken => ErrorKind::Unauthorized,
            ApiError::BackendUnavailable => ErrorKind::UpstreamUnavailable,
            ApiError::HashFailed
            | ApiError::TokenSigning
            | ApiError::BackendRead
            | ApiError::Internal => ErrorKind::Internal,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.kind().status()
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_follows_kind() {
        assert_eq!(ApiError::InvalidInput.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::MissingField("question").status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::EmailTaken.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::InvalidCredentials.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::MissingAuthHeader.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::BearerRequired.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::InvalidToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::BackendUnavailable.status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(ApiError::HashFailed.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ApiError::TokenSigning.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ApiError::BackendRead.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ApiError::Internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn missing_field_message_names_the_field() {
        assert_eq!(
            ApiError::MissingField("repo_url").to_string(),
            "Invalid input, 'repo_url' field is required."
        );
    }

    #[tokio::test]
    async fn renders_error_json_shape() {
        let res = ApiError::InvalidToken.into_response();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json, serde_json::json!({ "error": "Invalid token" }));
    }
}
