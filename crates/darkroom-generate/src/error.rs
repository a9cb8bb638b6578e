use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GenerateError>;

/// Outcome of a failed generation request as seen by the caller
///
/// Only these fixed messages ever reach the client. Upstream details are
/// logged where they occur and dropped here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GenerateError {
    /// The prompt is missing, empty or not a string; no upstream call was made
    #[error("Prompt is required")]
    BadRequest,

    /// Generation did not produce an image
    #[error("{0}")]
    GenerationFailed(FailureReason),
}

/// Why generation failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FailureReason {
    /// The upstream answered but returned no image artifact
    #[error("No image was generated")]
    NoImage,

    /// Anything else: network, upstream error status, malformed data
    #[error("Failed to generate image")]
    Upstream,
}

impl GenerateError {
    pub const fn no_image() -> Self {
        Self::GenerationFailed(FailureReason::NoImage)
    }

    pub const fn failed() -> Self {
        Self::GenerationFailed(FailureReason::Upstream)
    }

    /// Get the appropriate HTTP status code for this error
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::GenerationFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// `{ "error": "<message>" }`
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for GenerateError {
    fn into_response(self) -> Response {
        let body = ErrorBody { error: self.to_string() };
        (self.status_code(), Json(body)).into_response()
    }
}
