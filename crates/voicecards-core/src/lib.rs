pub mod audio;
pub mod config;
pub mod context;
pub mod credentials;
pub mod error;
pub mod http;
pub mod model;
pub mod services;
pub mod store;
pub mod verbose;
pub mod view;
pub mod workflow;

pub use config::{Settings, TranscriptionSettings};
pub use context::AppContext;
pub use credentials::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
pub use error::ServiceError;
pub use http::ApiClient;
pub use model::{ApiResponse, Card, CardPatch, CardStatus, SimpleCard, User};
pub use services::{
    AudioService, AuthService, CardService, CardsApi, HttpCardsApi, MockCardsApi, ServiceResponse,
};
pub use store::{CardStore, SessionStore};
pub use verbose::set_verbose;
pub use workflow::{Completion, RecordingWorkflow, SharedWorkflow, WorkflowError, WorkflowState};

#[cfg(test)]
pub(crate) mod test_support {
    use tokio::net::TcpListener;

    /// Serve `router` on an ephemeral local port; returns its base URL
    pub async fn serve(router: axum::Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }
}
