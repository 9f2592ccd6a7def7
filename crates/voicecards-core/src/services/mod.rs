//! Domain services.
//!
//! Each service maps one user intent onto one collaborator call and reports
//! the outcome as a [`ServiceResponse`], so callers branch on `success`
//! instead of handling errors.

pub mod audio;
pub mod auth;
pub mod cards;
pub mod mock;

use serde::Serialize;

use crate::error::ServiceError;

pub use audio::{AudioService, OpenAiCompatibleTranscriber, StaticTranscriber, Transcriber, Transcription};
pub use auth::AuthService;
pub use cards::{CardService, CardsApi, HttpCardsApi};
pub use mock::MockCardsApi;

/// Uniform `{success, data?, error?}` outcome of a service call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ServiceResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }

    /// Normalize a collaborator result; `fallback` is shown for opaque failures
    pub fn from_result(result: Result<T, ServiceError>, fallback: &str) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => {
                crate::verbose!("{fallback}: {e}");
                Self::failure(e.user_message(fallback))
            }
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Error message, or a generic one if the failure carried none
    pub fn error_message(&self) -> &str {
        self.error.as_deref().unwrap_or("Something went wrong")
    }

    pub fn into_result(self) -> Result<T, String> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            (true, None) => Err("Response carried no data".to_string()),
            (false, _) => Err(self
                .error
                .unwrap_or_else(|| "Something went wrong".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_result_uses_fallback_for_opaque_errors() {
        let response: ServiceResponse<()> = ServiceResponse::from_result(
            Err(ServiceError::Decode("eof".to_string())),
            "Failed to list cards",
        );
        assert!(!response.success);
        assert_eq!(response.error.as_deref(), Some("Failed to list cards"));
        assert_eq!(response.into_result(), Err("Failed to list cards".to_string()));
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(ServiceResponse::ok(3)).unwrap();
        assert_eq!(json, serde_json::json!({ "success": true, "data": 3 }));
    }
}
