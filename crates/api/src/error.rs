use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use marginalia_core::error::CoreError;
use marginalia_core::mute_token::MuteTokenError;
use marginalia_notify::NotifyError;
use serde_json::json;

/// Message shown for any mute link that cannot be honoured.
const MUTE_LINK_MESSAGE: &str = "This link is invalid or has expired";

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for request validation and [`NotifyError`] for the
/// notification service. Implements [`IntoResponse`] to produce consistent
/// JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `marginalia_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A failure from the notification service.
    #[error(transparent)]
    Notify(#[from] NotifyError),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Core(CoreError::Validation(errors.to_string()))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(CoreError::Validation(msg)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }

            // --- Notification errors ---
            AppError::Notify(err) => match err {
                NotifyError::Token(MuteTokenError::InvalidSignature) => (
                    StatusCode::BAD_REQUEST,
                    "INVALID_MUTE_LINK",
                    MUTE_LINK_MESSAGE.to_string(),
                ),
                NotifyError::Token(MuteTokenError::Expired) => (
                    StatusCode::BAD_REQUEST,
                    "EXPIRED_MUTE_LINK",
                    MUTE_LINK_MESSAGE.to_string(),
                ),
                NotifyError::UnknownRecipient(email) => {
                    tracing::warn!(%email, "Valid mute link for unknown user");
                    (
                        StatusCode::NOT_FOUND,
                        "NOT_FOUND",
                        "No account matches this link".to_string(),
                    )
                }
                NotifyError::Store(err) => {
                    tracing::error!(error = %err, "Notification store error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
