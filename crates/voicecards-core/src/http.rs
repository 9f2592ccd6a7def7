//! HTTP client for the cards backend.
//!
//! One shared `reqwest::Client` per [`ApiClient`]. Every request picks up the
//! bearer token from the credential store at send time, so a login or logout
//! takes effect on the very next call.

use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

use crate::credentials::CredentialStore;
use crate::error::ServiceError;
use crate::model::ApiResponse;

/// Resource name used when a 404 does not say what was missing
pub const UNNAMED_RESOURCE: &str = "Resource";

#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    credentials: Arc<dyn CredentialStore>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        credentials: Arc<dyn CredentialStore>,
    ) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            credentials,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn credentials(&self) -> &Arc<dyn CredentialStore> {
        &self.credentials
    }

    /// Join a route onto the base URL
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.url(path);
        crate::verbose!("{method} {url}");
        let builder = self.client.request(method, url);
        match self.credentials.load_token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<ApiResponse<T>, ServiceError> {
        self.send(self.request(Method::GET, path)).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<ApiResponse<T>, ServiceError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(self.request(Method::POST, path).json(body)).await
    }

    pub async fn patch<B, T>(&self, path: &str, body: &B) -> Result<ApiResponse<T>, ServiceError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(self.request(Method::PATCH, path).json(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<ApiResponse<T>, ServiceError> {
        self.send(self.request(Method::DELETE, path)).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<ApiResponse<T>, ServiceError> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;
        crate::verbose!("-> {status} ({} bytes)", body.len());

        if !status.is_success() {
            return Err(error_for_status(status, &body));
        }

        if body.trim().is_empty() {
            return Ok(ApiResponse::empty(status.as_u16()));
        }

        serde_json::from_str(&body).map_err(|e| ServiceError::Decode(e.to_string()))
    }
}

/// Map a non-success response onto the error taxonomy
fn error_for_status(status: StatusCode, body: &str) -> ServiceError {
    let detail = serde_json::from_str::<ApiResponse<serde_json::Value>>(body)
        .ok()
        .and_then(|envelope| envelope.describe())
        .unwrap_or_else(|| body.trim().to_string());

    match status {
        StatusCode::NOT_FOUND => ServiceError::NotFound(missing_resource(&detail)),
        StatusCode::UNAUTHORIZED => ServiceError::Unauthorized,
        _ => ServiceError::Backend {
            status: status.as_u16(),
            message: if detail.is_empty() {
                status.to_string()
            } else {
                detail
            },
        },
    }
}

/// "User not found" names `User`; anything else is an unnamed resource
fn missing_resource(detail: &str) -> String {
    let detail = detail.trim();
    let split = detail.len().saturating_sub(" not found".len());
    match (detail.get(..split), detail.get(split..)) {
        (Some(name), Some(suffix))
            if suffix.eq_ignore_ascii_case(" not found") && !name.trim().is_empty() =>
        {
            name.trim().to_string()
        }
        _ => UNNAMED_RESOURCE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::MemoryCredentialStore;
    use crate::test_support::serve;
    use axum::Json;
    use axum::http::{HeaderMap, StatusCode as AxumStatus};
    use axum::routing::get;
    use serde_json::{Value, json};

    fn echo_auth_router() -> axum::Router {
        axum::Router::new()
            .route(
                "/whoami",
                get(|headers: HeaderMap| async move {
                    let auth = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string);
                    Json(json!({ "status": 200, "message": "ok", "data": auth }))
                }),
            )
            .route(
                "/missing",
                get(|| async {
                    (
                        AxumStatus::NOT_FOUND,
                        Json(json!({ "status": 404, "message": "Card not found" })),
                    )
                }),
            )
            .route(
                "/account",
                get(|| async {
                    (
                        AxumStatus::NOT_FOUND,
                        Json(json!({ "status": 404, "message": "User not found", "error": "User not found" })),
                    )
                }),
            )
            .route(
                "/bare",
                get(|| async { AxumStatus::NOT_FOUND }),
            )
            .route(
                "/broken",
                get(|| async {
                    (
                        AxumStatus::INTERNAL_SERVER_ERROR,
                        Json(json!({ "status": 500, "message": "Failed", "error": "db down" })),
                    )
                }),
            )
    }

    #[tokio::test]
    async fn test_bearer_header_follows_token() {
        let base = serve(echo_auth_router()).await;
        let store = Arc::new(MemoryCredentialStore::new());
        let client = ApiClient::new(&base, Duration::from_secs(5), store.clone()).unwrap();

        let anonymous: ApiResponse<String> = client.get("/whoami").await.unwrap();
        assert_eq!(anonymous.data, None);

        store.save_token("jwt-123").unwrap();
        let authed: ApiResponse<String> = client.get("/whoami").await.unwrap();
        assert_eq!(authed.data.as_deref(), Some("Bearer jwt-123"));
    }

    #[tokio::test]
    async fn test_error_statuses() {
        let base = serve(echo_auth_router()).await;
        let client = ApiClient::new(
            &base,
            Duration::from_secs(5),
            Arc::new(MemoryCredentialStore::new()),
        )
        .unwrap();

        let missing = client.get::<Value>("/missing").await.unwrap_err();
        assert!(missing.is_not_found());
        assert_eq!(missing.to_string(), "Card not found");

        match client.get::<Value>("/broken").await.unwrap_err() {
            ServiceError::Backend { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "db down");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_not_found_names_the_resource() {
        let base = serve(echo_auth_router()).await;
        let client = ApiClient::new(
            &base,
            Duration::from_secs(5),
            Arc::new(MemoryCredentialStore::new()),
        )
        .unwrap();

        let user = client.get::<Value>("/account").await.unwrap_err();
        assert_eq!(user.user_message("Failed"), "User not found");

        let bare = client.get::<Value>("/bare").await.unwrap_err();
        assert!(matches!(bare, ServiceError::NotFound(ref what) if what == UNNAMED_RESOURCE));
    }

    #[test]
    fn test_missing_resource_from_detail() {
        assert_eq!(missing_resource("Card not found"), "Card");
        assert_eq!(missing_resource("user NOT FOUND"), "user");
        assert_eq!(missing_resource(" not found"), UNNAMED_RESOURCE);
        assert_eq!(missing_resource("Gone"), UNNAMED_RESOURCE);
        assert_eq!(missing_resource(""), UNNAMED_RESOURCE);
    }

    #[test]
    fn test_url_join() {
        let client = ApiClient::new(
            "http://localhost:8080/",
            Duration::from_secs(1),
            Arc::new(MemoryCredentialStore::new()),
        )
        .unwrap();
        assert_eq!(client.url("/cards/list"), "http://localhost:8080/cards/list");
        assert_eq!(client.url("cards/list"), "http://localhost:8080/cards/list");
    }
}
