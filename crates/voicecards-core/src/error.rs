//! Error types for the service layer.
//!
//! Services never hand these to the presentation layer directly: they are
//! turned into a user-facing message inside a [`crate::ServiceResponse`].

use thiserror::Error;

/// Failure of a single backend or collaborator call.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Input rejected locally, before any request was made.
    #[error("{0}")]
    Validation(String),

    /// The backend does not know the requested resource.
    #[error("{0} not found")]
    NotFound(String),

    /// Missing or rejected bearer token.
    #[error("not authenticated")]
    Unauthorized,

    /// Connection, TLS or timeout failure.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("backend error ({status}): {message}")]
    Backend { status: u16, message: String },

    /// The response body did not have the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::Validation(message.into())
    }

    /// Message suitable for showing to the user.
    ///
    /// Validation and not-found errors are specific enough to show as-is;
    /// everything else collapses to `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ServiceError::Validation(message) => message.clone(),
            ServiceError::NotFound(what) => format!("{what} not found"),
            ServiceError::Unauthorized => "Session expired, please log in again".to_string(),
            ServiceError::Network(_) | ServiceError::Backend { .. } | ServiceError::Decode(_) => {
                fallback.to_string()
            }
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::NotFound(_))
    }
}
