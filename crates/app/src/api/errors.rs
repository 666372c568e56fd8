//! Backend API errors.

use thiserror::Error;

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// An HTTP transport error occurred.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status.
    #[error("unexpected response from backend ({status}): {body}")]
    UnexpectedResponse {
        /// HTTP status code
        status: u16,

        /// Response body, possibly empty
        body: String,
    },

    /// The response body did not match the expected shape.
    #[error("failed to decode backend response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// HTTP status of a non-2xx response.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::UnexpectedResponse { status, .. } => Some(*status),
            ApiError::Http(error) => error.status().map(|status| status.as_u16()),
            ApiError::Decode(_) => None,
        }
    }

    /// Whether the resource does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}
