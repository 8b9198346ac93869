//! Error handling.

use axum::{
    extract::rejection::JsonRejection,
    http::header,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::error::Error;
use thiserror::Error;
use tokio::sync::AcquireError;
use tracing::{event, Level};

/// Ingest service error type
///
/// This type encapsulates the various errors that may occur while planning or enumerating the
/// work units of an ingest job. Each variant may result in a different API error response.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Error writing a serialised message
    #[error("failed to write message")]
    Io(#[from] std::io::Error),

    /// Error deserialising request data into an ingest job
    #[error("request data is not valid")]
    RequestDataJsonRejection(#[from] JsonRejection),

    /// Error validating request data (single error)
    #[error("request data is not valid")]
    RequestDataValidationSingle(#[from] validator::ValidationError),

    /// Error validating request data (multiple errors)
    #[error("request data is not valid")]
    RequestDataValidation(#[from] validator::ValidationErrors),

    /// Error acquiring a semaphore
    #[error("error acquiring resources")]
    SemaphoreAcquireError(#[from] AcquireError),

    /// Error serialising a tile message
    #[error("failed to serialise message")]
    Serialisation(#[from] serde_json::Error),

    /// The enumeration task panicked or was cancelled
    #[error("enumeration task failed")]
    TaskJoin(#[from] tokio::task::JoinError),

    /// A plan would hold more windows than the service returns
    #[error("plan of {windows} windows exceeds the limit of {limit}")]
    TooManyWindows { windows: u64, limit: u64 },

    /// Number of work units in the job does not fit in 64 bits
    #[error("ingest volume has too many work units to enumerate")]
    VolumeTooLarge,

    /// A window asks for more work units than one request may enumerate
    #[error("window of {max_items} work units exceeds the limit of {limit}")]
    WindowTooLarge { max_items: u64, limit: u64 },

    /// A step or size that the enumeration divides by was zero
    #[error("{field} must be greater than 0")]
    ZeroSize { field: &'static str },
}

impl IntoResponse for IngestError {
    /// Convert from an `IngestError` into an [axum::response::Response].
    fn into_response(self) -> Response {
        ErrorResponse::from(self).into_response()
    }
}

/// Body of error response
#[derive(Deserialize, Serialize)]
struct ErrorBody {
    /// Main error message
    message: String,

    /// Optional list of causes
    #[serde(skip_serializing_if = "Option::is_none")]
    caused_by: Option<Vec<String>>,
}

impl ErrorBody {
    /// Return a new ErrorBody, walking the source chain of `error` for causes.
    fn new<E>(error: &E) -> Self
    where
        E: std::error::Error + Send + Sync,
    {
        let mut causes = Vec::new();
        let mut current = error.source();
        while let Some(source) = current {
            causes.push(source.to_string());
            current = source.source();
        }
        causes.dedup();
        ErrorBody {
            message: error.to_string(),
            caused_by: (!causes.is_empty()).then_some(causes),
        }
    }
}

/// A response to send in error cases
#[derive(Deserialize, Serialize)]
struct ErrorResponse {
    /// HTTP status of the response
    #[serde(skip)]
    status: StatusCode,

    /// Response body
    error: ErrorBody,
}

impl ErrorResponse {
    fn new<E>(status: StatusCode, error: &E) -> Self
    where
        E: std::error::Error + Send + Sync,
    {
        ErrorResponse {
            status,
            error: ErrorBody::new(error),
        }
    }

    /// Return a 400 bad request ErrorResponse
    fn bad_request<E>(error: &E) -> Self
    where
        E: std::error::Error + Send + Sync,
    {
        Self::new(StatusCode::BAD_REQUEST, error)
    }

    /// Return a 500 internal server error ErrorResponse
    fn internal_server_error<E>(error: &E) -> Self
    where
        E: std::error::Error + Send + Sync,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, error)
    }
}

impl From<IngestError> for ErrorResponse {
    /// Convert from an `IngestError` into an `ErrorResponse`.
    fn from(error: IngestError) -> Self {
        let response = match &error {
            // Bad request
            IngestError::RequestDataJsonRejection(_)
            | IngestError::RequestDataValidationSingle(_)
            | IngestError::RequestDataValidation(_)
            | IngestError::TooManyWindows { .. }
            | IngestError::VolumeTooLarge
            | IngestError::WindowTooLarge { .. }
            | IngestError::ZeroSize { field: _ } => Self::bad_request(&error),

            // Internal server error
            IngestError::Io(_)
            | IngestError::SemaphoreAcquireError(_)
            | IngestError::Serialisation(_)
            | IngestError::TaskJoin(_) => Self::internal_server_error(&error),
        };

        if response.status.is_server_error() {
            event!(Level::ERROR, "{}", error);
            let mut current = error.source();
            while let Some(source) = current {
                event!(Level::ERROR, "Caused by: {}", source);
                current = source.source();
            }
        }

        response
    }
}

impl IntoResponse for ErrorResponse {
    /// Convert from an `ErrorResponse` into an `axum::response::Response`.
    ///
    /// Renders the response as JSON.
    fn into_response(self) -> Response {
        match serde_json::to_string_pretty(&self) {
            Err(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to serialise error response: {}", err),
            )
                .into_response(),
            Ok(json_body) => (
                self.status,
                [(&header::CONTENT_TYPE, mime::APPLICATION_JSON.to_string())],
                json_body,
            )
                .into_response(),
        }
    }
}
