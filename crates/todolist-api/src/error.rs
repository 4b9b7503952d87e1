//! HTTP error response conversion
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>`. Any `AppError` turns
//! into an `HttpAppError` via `?`, which renders the status code and the
//! `{"error": ...}` body described by the error's `ErrorMetadata`.

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Serialize};
use todolist_core::validation::INVALID_ID_MESSAGE;
use todolist_core::{AppError, ErrorMetadata, LogLevel};
use utoipa::ToSchema;

pub const INVALID_BODY_MESSAGE: &str = "Invalid request body";

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Body of successful responses that only carry a confirmation
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// Wrapper type for AppError to implement IntoResponse
/// (orphan rules: both the trait and AppError live in other crates)
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::from(err))
    }
}

/// Every JSON body failure (syntax, wrong types, missing content type) is a 400
/// with one generic message; oversized bodies keep their 413.
impl From<JsonRejection> for HttpAppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::warn!(
            reason = %rejection.body_text(),
            status = rejection.status().as_u16(),
            "Invalid request body"
        );
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return HttpAppError(AppError::PayloadTooLarge(
                "Request body too large".to_string(),
            ));
        }
        HttpAppError(AppError::InvalidInput(INVALID_BODY_MESSAGE.to_string()))
    }
}

/// Path segments that cannot be extracted at all (for example invalid UTF-8
/// after percent-decoding) are malformed ids.
impl From<PathRejection> for HttpAppError {
    fn from(rejection: PathRejection) -> Self {
        tracing::warn!(reason = %rejection.body_text(), "Invalid path parameter");
        HttpAppError(AppError::BadRequest(INVALID_ID_MESSAGE.to_string()))
    }
}

/// JSON body extractor that answers with our `ErrorResponse` format on failure.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = HttpAppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(inner) = Json::<T>::from_request(req, state)
            .await
            .map_err(HttpAppError::from)?;
        Ok(ValidatedJson(inner))
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    let error_code = error.error_code();
    // Sensitive errors are only ever logged, so log the whole cause chain
    let detail = if error.is_sensitive() {
        error.detailed_message()
    } else {
        error.to_string()
    };
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %detail, error_type, error_code, "Request failed");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %detail, error_type, error_code, "Request failed");
        }
        LogLevel::Error => {
            tracing::error!(error = %detail, error_type, error_code, "Request failed");
        }
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        (status, Json(ErrorResponse::new(app_error.client_message()))).into_response()
    }
}
