use axum::{
    Json,
    extract::multipart::MultipartRejection,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;
use tracing::error;
use validator::ValidationErrors;

use crate::validation::{FieldError, field_errors};

#[derive(Debug, ThisError)]
pub enum CmsError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("site config key `{0}` not found")]
    ConfigKeyNotFound(String),

    /// The request could not be decoded (malformed JSON, bad path segment).
    #[error("invalid request: {message}")]
    InvalidRequest { status: StatusCode, message: String },

    #[error("invalid reorder request: {0}")]
    InvalidReorder(String),

    #[error("upload rejected: {0}")]
    Upload(String),

    #[error("request body too large")]
    PayloadTooLarge,

    #[error("unauthorized")]
    Unauthorized,

    #[error("Database error: {0}")]
    DatabaseError(#[from] SqlxError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("HTTP request error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("remote returned {status}: {code}: {message}")]
    Remote {
        status: StatusCode,
        code: String,
        message: String,
    },
}

impl CmsError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        CmsError::NotFound { entity, id }
    }
}

impl IntoResponse for CmsError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_body) = match self {
            CmsError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                ApiErrorBody {
                    code: "VALIDATION_ERROR".to_string(),
                    message: errors.to_string(),
                    fields: Some(field_errors(&errors)),
                },
            ),
            CmsError::NotFound { entity, id } => (
                StatusCode::NOT_FOUND,
                ApiErrorBody::new("NOT_FOUND", format!("{entity} {id} not found")),
            ),
            CmsError::ConfigKeyNotFound(key) => (
                StatusCode::NOT_FOUND,
                ApiErrorBody::new("NOT_FOUND", format!("site config key `{key}` not found")),
            ),
            CmsError::InvalidRequest { status, message } => {
                (status, ApiErrorBody::new("INVALID_REQUEST", message))
            }
            CmsError::InvalidReorder(msg) => (
                StatusCode::BAD_REQUEST,
                ApiErrorBody::new("INVALID_REORDER", msg),
            ),
            CmsError::Upload(msg) => (
                StatusCode::BAD_REQUEST,
                ApiErrorBody::new("INVALID_UPLOAD", msg),
            ),
            CmsError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                ApiErrorBody::new("PAYLOAD_TOO_LARGE", "request body too large"),
            ),
            CmsError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                ApiErrorBody::new("UNAUTHORIZED", "invalid or missing admin key"),
            ),
            CmsError::Remote {
                status,
                code,
                message,
            } => (status, ApiErrorBody::new(code, message)),
            CmsError::Reqwest(_) | CmsError::UrlParse(_) => {
                error!(error = %self, "outbound request failed");
                (
                    StatusCode::BAD_GATEWAY,
                    ApiErrorBody::new("BAD_GATEWAY", "Upstream service is unavailable."),
                )
            }
            CmsError::DatabaseError(_) | CmsError::Io(_) | CmsError::Json(_) => {
                error!(error = %self, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiErrorBody::new("INTERNAL_ERROR", "An internal server error occurred."),
                )
            }
        };
        (status, Json(ApiErrorResponse { error: error_body })).into_response()
    }
}

impl From<JsonRejection> for CmsError {
    fn from(rejection: JsonRejection) -> Self {
        CmsError::InvalidRequest {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<PathRejection> for CmsError {
    fn from(rejection: PathRejection) -> Self {
        CmsError::InvalidRequest {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<MultipartRejection> for CmsError {
    fn from(rejection: MultipartRejection) -> Self {
        CmsError::InvalidRequest {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

/// Standardized API error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldError>>,
}

impl ApiErrorBody {
    fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            fields: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}
