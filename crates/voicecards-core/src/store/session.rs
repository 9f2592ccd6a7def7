use crate::error::ServiceError;
use crate::model::User;
use crate::services::{AuthService, ServiceResponse};

const RESTORE_FAILED: &str = "Failed to restore session";

/// Who is logged in.
#[derive(Clone)]
pub struct SessionStore {
    auth: AuthService,
    user: Option<User>,
    authenticated: bool,
    loading: bool,
}

impl SessionStore {
    pub fn new(auth: AuthService) -> Self {
        Self {
            auth,
            user: None,
            authenticated: false,
            loading: false,
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Resume the session of an earlier run by asking who the stored token belongs to
    pub async fn restore(&mut self) -> ServiceResponse<User> {
        if !self.auth.has_token() {
            self.user = None;
            self.authenticated = false;
            return ServiceResponse::failure("Not logged in");
        }

        self.loading = true;
        let result = self.auth.me().await;
        self.loading = false;

        match result {
            Ok(user) => {
                self.user = Some(user.clone());
                self.authenticated = true;
                ServiceResponse::ok(user)
            }
            Err(ServiceError::Unauthorized | ServiceError::NotFound(_)) => {
                crate::verbose!("Stored token was rejected, discarding it");
                if !self.auth.logout().success {
                    crate::verbose!("Could not discard the stored token");
                }
                self.user = None;
                self.authenticated = false;
                ServiceResponse::failure(ServiceError::Unauthorized.user_message(RESTORE_FAILED))
            }
            Err(e) => {
                self.user = None;
                self.authenticated = false;
                ServiceResponse::from_result(Err(e), RESTORE_FAILED)
            }
        }
    }

    pub fn set_user(&mut self, user: Option<User>) {
        self.authenticated = user.is_some() || self.auth.has_token();
        self.user = user;
    }

    pub async fn login(&mut self, email: &str, password: &str) -> ServiceResponse<User> {
        self.loading = true;
        let response = self.auth.login(email, password).await;
        self.loading = false;

        if let Some(user) = response.data.as_ref() {
            self.user = Some(user.clone());
            self.authenticated = true;
        }
        response
    }

    /// Create the account, then log in with the same credentials
    pub async fn register(&mut self, name: &str, email: &str, password: &str) -> ServiceResponse<User> {
        self.loading = true;
        let registered = self.auth.register(name, email, password).await;
        self.loading = false;

        if !registered.success {
            return ServiceResponse::failure(registered.error_message());
        }
        self.login(email, password).await
    }

    pub fn logout(&mut self) -> ServiceResponse<()> {
        let response = self.auth.logout();
        if response.success {
            self.user = None;
            self.authenticated = false;
        }
        response
    }
}
