//! Error handling for the gateway.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    /// Internal server error.
    Internal(String),
    /// The request text or its references are invalid.
    BadRequest { code: &'static str, message: String },
    /// Unknown entity or record.
    NotFound(String),
    /// The backing collection failed.
    Collection(String),
}

/// Error response body.
#[derive(Serialize)]
pub struct ErrorResponse {
    /// Error flag.
    pub error: bool,
    /// Error code.
    pub code: String,
    /// Error message.
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
            AppError::BadRequest { code, message } => (StatusCode::BAD_REQUEST, code, message),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            AppError::Collection(msg) => (StatusCode::BAD_GATEWAY, "COLLECTION_ERROR", msg),
        };

        let body = ErrorResponse {
            error: true,
            code: code.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<restq_core::Error> for AppError {
    fn from(err: restq_core::Error) -> Self {
        use restq_core::Error;

        let message = err.to_string();
        let code = match &err {
            Error::Parse(_) => "PARSE_ERROR",
            Error::UnsupportedOperator(_) => "UNSUPPORTED_OPERATOR",
            Error::FieldNotFound { .. } => "FIELD_NOT_FOUND",
            Error::LiteralTypeMismatch { .. } => "LITERAL_TYPE_MISMATCH",
            Error::MissingRequiredValue { .. } => "MISSING_REQUIRED_VALUE",
            Error::UnknownEntity(_) => return AppError::NotFound(message),
            Error::Collection(_) => return AppError::Collection(message),
            Error::DuplicateField { .. } | Error::Serialization(_) => {
                return AppError::Internal(message)
            }
        };
        AppError::BadRequest { code, message }
    }
}

impl From<restq_proto::Error> for AppError {
    fn from(err: restq_proto::Error) -> Self {
        restq_core::Error::from(err).into()
    }
}
