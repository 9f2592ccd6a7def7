//! Login, registration, logout and the current user.
//!
//! A successful login persists the bearer token in the credential store; the
//! [`ApiClient`] picks it up on every following request. Logout discards it.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::ServiceResponse;
use crate::credentials::CredentialStore;
use crate::error::ServiceError;
use crate::http::ApiClient;
use crate::model::User;

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct RegisterRequest<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginPayload {
    token: String,
    user: User,
}

#[derive(Clone)]
pub struct AuthService {
    client: ApiClient,
    credentials: Arc<dyn CredentialStore>,
}

impl AuthService {
    /// Uses the client's own credential store
    pub fn new(client: ApiClient) -> Self {
        let credentials = client.credentials().clone();
        Self {
            client,
            credentials,
        }
    }

    /// A token from an earlier login is available
    pub fn has_token(&self) -> bool {
        self.credentials.load_token().is_some()
    }

    pub async fn login(&self, email: &str, password: &str) -> ServiceResponse<User> {
        if email.trim().is_empty() || password.is_empty() {
            return ServiceResponse::failure("Email and password are required");
        }
        match self.try_login(email.trim(), password).await {
            Err(ServiceError::Unauthorized) => ServiceResponse::failure("Invalid email or password"),
            result => ServiceResponse::from_result(result, "Failed to log in"),
        }
    }

    async fn try_login(&self, email: &str, password: &str) -> Result<User, ServiceError> {
        let response = self
            .client
            .post::<_, LoginPayload>("/auth/login", &LoginRequest { email, password })
            .await?;
        let payload = response
            .data
            .ok_or_else(|| ServiceError::Decode("login response carried no token".to_string()))?;
        if payload.token.trim().is_empty() {
            return Err(ServiceError::Decode("login response carried an empty token".to_string()));
        }

        self.credentials
            .save_token(&payload.token)
            .map_err(|e| ServiceError::Decode(format!("could not store token: {e}")))?;
        crate::verbose!("Logged in as {}", payload.user.email);
        Ok(payload.user)
    }

    /// The user behind the stored token
    pub async fn me(&self) -> Result<User, ServiceError> {
        let response = self.client.get::<User>("/auth/me").await?;
        response
            .data
            .ok_or_else(|| ServiceError::Decode("response carried no user".to_string()))
    }

    /// Create an account. Does not log in; see [`crate::store::SessionStore::register`].
    pub async fn register(&self, name: &str, email: &str, password: &str) -> ServiceResponse<()> {
        if name.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
            return ServiceResponse::failure("Name, email and password are required");
        }
        let request = RegisterRequest {
            name: name.trim(),
            email: email.trim(),
            password,
        };
        let result = self
            .client
            .post::<_, serde_json::Value>("/auth/register", &request)
            .await
            .map(|_| ());
        ServiceResponse::from_result(result, "Failed to register user")
    }

    pub fn logout(&self) -> ServiceResponse<()> {
        match self.credentials.clear_token() {
            Ok(()) => ServiceResponse::ok(()),
            Err(e) => {
                crate::verbose!("Failed to clear token: {e}");
                ServiceResponse::failure("Failed to log out")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::MemoryCredentialStore;
    use crate::test_support::serve;
    use axum::http::StatusCode;
    use axum::http::HeaderMap;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{Value, json};
    use std::time::Duration;

    fn backend() -> Router {
        Router::new()
            .route(
                "/auth/login",
                post(|Json(body): Json<Value>| async move {
                    if body["password"] == "secret" {
                        (
                            StatusCode::OK,
                            Json(json!({
                                "status": 200,
                                "data": {
                                    "token": "jwt-xyz",
                                    "user": { "id": "u1", "name": "Ana", "email": body["email"] }
                                }
                            })),
                        )
                    } else {
                        (
                            StatusCode::UNAUTHORIZED,
                            Json(json!({ "status": 401, "message": "Invalid credentials" })),
                        )
                    }
                }),
            )
            .route(
                "/auth/register",
                post(|| async { Json(json!({ "status": 201, "message": "User created" })) }),
            )
            .route(
                "/auth/me",
                get(|headers: HeaderMap| async move {
                    let bearer = headers.get("authorization").and_then(|v| v.to_str().ok());
                    match bearer {
                        Some("Bearer jwt-xyz") => (
                            StatusCode::OK,
                            Json(json!({
                                "status": 200,
                                "message": "User found",
                                "data": { "id": "u1", "name": "Ana", "email": "ana@example.com" }
                            })),
                        ),
                        Some(_) => (
                            StatusCode::NOT_FOUND,
                            Json(json!({ "status": 404, "message": "User not found", "error": "User not found" })),
                        ),
                        None => (
                            StatusCode::UNAUTHORIZED,
                            Json(json!({ "status": 401, "message": "Unauthorized access" })),
                        ),
                    }
                }),
            )
    }

    async fn service() -> (Arc<MemoryCredentialStore>, AuthService) {
        let base = serve(backend()).await;
        let store = Arc::new(MemoryCredentialStore::new());
        let client = ApiClient::new(&base, Duration::from_secs(5), store.clone()).unwrap();
        (store, AuthService::new(client))
    }

    #[tokio::test]
    async fn test_login_persists_token_and_logout_clears_it() {
        let (store, auth) = service().await;

        let user = auth.login("ana@example.com", "secret").await.into_result().unwrap();
        assert_eq!(user.email, "ana@example.com");
        assert_eq!(store.load_token().as_deref(), Some("jwt-xyz"));
        assert!(auth.has_token());

        assert!(auth.logout().success);
        assert!(store.load_token().is_none());
    }

    #[tokio::test]
    async fn test_wrong_password_keeps_no_token() {
        let (store, auth) = service().await;
        let response = auth.login("ana@example.com", "wrong").await;
        assert_eq!(response.error.as_deref(), Some("Invalid email or password"));
        assert!(store.load_token().is_none());
    }

    #[tokio::test]
    async fn test_register_validates_locally() {
        let (_, auth) = service().await;
        assert!(!auth.register("", "a@b.c", "pw").await.success);
        assert!(auth.register("Ana", "a@b.c", "pw").await.success);
    }

    #[tokio::test]
    async fn test_me_uses_stored_token() {
        let (store, auth) = service().await;
        assert!(matches!(auth.me().await, Err(ServiceError::Unauthorized)));

        auth.login("ana@example.com", "secret").await.into_result().unwrap();
        let user = auth.me().await.unwrap();
        assert_eq!(user.name, "Ana");

        store.save_token("someone-else").unwrap();
        let err = auth.me().await.unwrap_err();
        assert_eq!(err.user_message("Failed"), "User not found");
    }
}
