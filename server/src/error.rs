//! Server error types with HTTP status code mapping

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use yarrrml::base::InvalidBase;
use yarrrml::serializer::{SerializeError, UnknownFormat};
use yarrrml::Entry;

/// Result type for handlers.
pub type Result<T, E = ServerError> = std::result::Result<T, E>;

/// Server error type, providing HTTP status mapping
#[derive(Error, Debug)]
pub enum ServerError {
    /// The request contains no YARRRML document
    #[error("missing 'yarrrml' or 'url' parameter")]
    MissingYarrrml,

    /// The conversion logged errors
    #[error("conversion failed with {} log entries", .0.len())]
    Conversion(Vec<Entry>),

    /// Unknown output format
    #[error(transparent)]
    UnknownFormat(#[from] UnknownFormat),

    /// The request body was rejected by an extractor, with its own status
    #[error("{1}")]
    Rejection(StatusCode, String),

    /// The YARRRML document could not be fetched from the given URL
    #[error("cannot fetch YARRRML document: {0}")]
    Fetch(String),

    /// Invalid base IRI in the configuration
    #[error(transparent)]
    InvalidBase(#[from] InvalidBase),

    /// The generated rules could not be serialized
    #[error(transparent)]
    Serialize(#[from] SerializeError),

    /// Unexpected failure
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServerError {
    /// Map error to HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::MissingYarrrml => StatusCode::UNPROCESSABLE_ENTITY,
            ServerError::Conversion(_) => StatusCode::BAD_REQUEST,
            ServerError::UnknownFormat(_) => StatusCode::BAD_REQUEST,
            ServerError::Rejection(status, _) => *status,
            ServerError::Fetch(_) => StatusCode::BAD_REQUEST,
            ServerError::InvalidBase(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::Serialize(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// HTTP status code
    pub status: u16,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("{self}");
        } else {
            log::debug!("{self}");
        }
        match self {
            ServerError::MissingYarrrml => status.into_response(),
            ServerError::Conversion(entries) => (status, Json(entries)).into_response(),
            other => {
                let body = ErrorResponse {
                    error: other.to_string(),
                    status: status.as_u16(),
                };
                (status, Json(body)).into_response()
            }
        }
    }
}
