use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::storage::StorageError;

pub const INVALID_URL: &str = "URL is required and must be a string";
pub const MISSING_SHORT_CODE: &str = "Short code is required in the URL";
pub const NOT_FOUND: &str = "Short URL not found";
pub const CREATE_FAILED: &str = "Something went wrong";
pub const SERVER_ERROR: &str = "Server error";

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(&'static str),

    #[error("short URL not found")]
    NotFound,

    /// Short code allocation exhausted its retries
    #[error("could not allocate a unique short code")]
    Conflict,

    /// Any other persistence failure. `public` is what the client sees.
    #[error("storage failure: {source}")]
    Storage {
        public: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl ApiError {
    pub fn storage(source: impl Into<anyhow::Error>) -> Self {
        ApiError::Storage {
            public: SERVER_ERROR,
            source: source.into(),
        }
    }

    /// Replace the client-facing message of a storage failure
    pub fn with_public_message(self, message: &'static str) -> Self {
        match self {
            ApiError::Storage { source, .. } => ApiError::Storage {
                public: message,
                source,
            },
            other => other,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Conflict | ApiError::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Conflict => ApiError::Conflict,
            StorageError::Other(source) => ApiError::storage(source),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Validation(message) => *message,
            ApiError::NotFound => NOT_FOUND,
            ApiError::Conflict => CREATE_FAILED,
            ApiError::Storage { public, .. } => *public,
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        (
            status,
            Json(ErrorResponse {
                error: message.to_string(),
            }),
        )
            .into_response()
    }
}
