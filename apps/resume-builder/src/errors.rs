use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::api_client::ApiError;
use crate::auth::session::AuthError;
use crate::export::pdf::ExportError;
use crate::templates::fetcher::TemplateError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Backend error: {0}")]
    Backend(#[from] ApiError),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

fn backend_status(status: u16) -> StatusCode {
    match StatusCode::from_u16(status) {
        Ok(code) if code.is_client_error() => code,
        _ => StatusCode::BAD_GATEWAY,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Authentication required".to_string(),
            ),
            // the backend's own message is what the user sees
            AppError::Backend(ApiError::Api { status, message }) => {
                let status = backend_status(*status);
                if status.is_server_error() {
                    tracing::error!("Backend error: {message}");
                }
                (status, "BACKEND_ERROR", message.clone())
            }
            AppError::Backend(e) => {
                tracing::error!("Backend unreachable: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "BACKEND_UNAVAILABLE",
                    "The resume service could not be reached".to_string(),
                )
            }
            AppError::Auth(e) => match e {
                AuthError::NotAuthenticated => (
                    StatusCode::UNAUTHORIZED,
                    "UNAUTHORIZED",
                    "Authentication required".to_string(),
                ),
                AuthError::VerificationRequired { message } => {
                    (StatusCode::FORBIDDEN, e.kind(), message.clone())
                }
                AuthError::Rejected(message) => (StatusCode::BAD_REQUEST, e.kind(), message.clone()),
                AuthError::Transport(message) => {
                    tracing::error!("Auth transport error: {message}");
                    (
                        StatusCode::BAD_GATEWAY,
                        e.kind(),
                        "The resume service could not be reached".to_string(),
                    )
                }
                AuthError::Storage(err) => {
                    tracing::error!("Session storage error: {err}");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        e.kind(),
                        "The session could not be saved".to_string(),
                    )
                }
            },
            AppError::Template(TemplateError::UnknownTemplate(id)) => (
                StatusCode::NOT_FOUND,
                "TEMPLATE_NOT_FOUND",
                format!("Unknown template '{id}'"),
            ),
            AppError::Template(e) => {
                tracing::error!("Template error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "TEMPLATE_ERROR",
                    "The template could not be loaded".to_string(),
                )
            }
            AppError::Export(e) => {
                tracing::error!("PDF export error: {e}");
                let status = match e {
                    ExportError::RendererMissing { .. } => StatusCode::SERVICE_UNAVAILABLE,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, "EXPORT_ERROR", "Failed to generate PDF".to_string())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "success": false,
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
