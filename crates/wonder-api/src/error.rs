//! JSON error responses.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;
use wonder_core::WonderError;

/// Every handler failure, rendered as `{"error": message}`.
#[derive(Debug)]
pub struct ApiError(pub WonderError);

impl<E> From<E> for ApiError
where
    E: Into<WonderError>,
{
    fn from(err: E) -> Self {
        ApiError(err.into())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        status_for(&self.0)
    }
}

pub fn status_for(err: &WonderError) -> StatusCode {
    match err {
        WonderError::Validation(_) | WonderError::Conflict(_) => StatusCode::BAD_REQUEST,
        WonderError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        WonderError::Forbidden(_) => StatusCode::FORBIDDEN,
        WonderError::NotFound(_) => StatusCode::NOT_FOUND,
        WonderError::Unsafe(_) => StatusCode::UNPROCESSABLE_ENTITY,
        WonderError::Configuration(_) => StatusCode::SERVICE_UNAVAILABLE,
        WonderError::Provider(_) | WonderError::Stage(_) | WonderError::Io(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Client-facing text: the bare message for request errors, the full
/// prefixed error for internal failures.
fn message_for(err: &WonderError) -> String {
    match err {
        WonderError::Validation(msg)
        | WonderError::Conflict(msg)
        | WonderError::Unauthorized(msg)
        | WonderError::Forbidden(msg)
        | WonderError::NotFound(msg)
        | WonderError::Unsafe(msg)
        | WonderError::Configuration(msg) => msg.clone(),
        other => other.to_string(),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self.0, "request failed");
        }

        let body = Json(json!({ "error": message_for(&self.0) }));
        if status == StatusCode::UNAUTHORIZED {
            return (status, [(header::WWW_AUTHENTICATE, "Bearer")], body).into_response();
        }
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wonder_core::ProviderError;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&WonderError::Validation("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&WonderError::Configuration("x".into())),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_for(&WonderError::Unsafe("x".into())),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_for(&WonderError::Provider(ProviderError::Timeout)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_request_errors_show_bare_message() {
        assert_eq!(
            message_for(&WonderError::NotFound("Quiz not found".into())),
            "Quiz not found"
        );
        assert_eq!(
            message_for(&WonderError::Provider(ProviderError::Timeout)),
            "PROVIDER/TIMEOUT"
        );
    }
}
