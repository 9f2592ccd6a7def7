//! Everything a front end needs, built once from [`Settings`].

use std::sync::Arc;

use crate::config::Settings;
use crate::credentials::CredentialStore;
use crate::error::ServiceError;
use crate::http::ApiClient;
use crate::services::mock::DEFAULT_MOCK_DELAY;
use crate::services::{
    AudioService, AuthService, CardService, CardsApi, HttpCardsApi, MockCardsApi,
    OpenAiCompatibleTranscriber, StaticTranscriber, Transcriber,
};
use crate::store::{CardStore, SessionStore};
use crate::workflow::SharedWorkflow;

/// Transcript returned by the mock transcriber
pub const MOCK_TRANSCRIPT: &str = "Review the pull request for the login page. \
     Write tests for the card service. Prepare the demo for Friday.";

pub struct AppContext {
    pub settings: Settings,
    pub session: SessionStore,
    pub cards: CardStore,
    pub audio: AudioService,
}

impl AppContext {
    /// Talk to the configured backend and transcription server
    pub fn connect(
        settings: Settings,
        credentials: Arc<dyn CredentialStore>,
    ) -> Result<Self, ServiceError> {
        let client = ApiClient::new(&settings.api_url, settings.request_timeout(), credentials)?;
        let api: Arc<dyn CardsApi> = Arc::new(HttpCardsApi::new(
            client.clone(),
            settings.delete_route.clone(),
        ));
        let transcriber: Arc<dyn Transcriber> = Arc::new(OpenAiCompatibleTranscriber::new(
            &settings.transcription,
            settings.request_timeout(),
        )?);
        Ok(Self::assemble(settings, client, api, transcriber))
    }

    /// In-memory cards and a canned transcript; auth still goes to the backend
    pub fn mock(
        settings: Settings,
        credentials: Arc<dyn CredentialStore>,
    ) -> Result<Self, ServiceError> {
        let client = ApiClient::new(&settings.api_url, settings.request_timeout(), credentials)?;
        let api: Arc<dyn CardsApi> = Arc::new(MockCardsApi::seeded().with_delay(DEFAULT_MOCK_DELAY));
        let transcriber: Arc<dyn Transcriber> = Arc::new(StaticTranscriber::new(MOCK_TRANSCRIPT));
        Ok(Self::assemble(settings, client, api, transcriber))
    }

    fn assemble(
        settings: Settings,
        client: ApiClient,
        api: Arc<dyn CardsApi>,
        transcriber: Arc<dyn Transcriber>,
    ) -> Self {
        crate::verbose!(
            "Using {} cards backend, {} transcriber",
            api.name(),
            transcriber.name()
        );
        let audio = AudioService::new(transcriber, settings.language.clone());
        Self {
            session: SessionStore::new(AuthService::new(client)),
            cards: CardStore::new(CardService::new(api)),
            audio,
            settings,
        }
    }

    pub fn is_mock(&self) -> bool {
        self.cards.service().backend_name() == "mock"
    }

    /// A fresh recording workflow over this context's services
    pub fn workflow(&self) -> SharedWorkflow {
        SharedWorkflow::new(self.audio.clone(), self.cards.service().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::MemorySource;
    use crate::credentials::MemoryCredentialStore;
    use crate::workflow::WorkflowState;

    #[tokio::test]
    async fn test_mock_context_transcribes_canned_text() {
        let mut settings = Settings::default();
        settings.transcription.url = String::new();
        let ctx = AppContext::mock(settings, Arc::new(MemoryCredentialStore::new())).unwrap();
        assert!(ctx.is_mock());

        let workflow = ctx.workflow();
        workflow
            .start_recording(&MemorySource::silence().unwrap())
            .await
            .unwrap();
        workflow.stop_and_transcribe().await.unwrap();
        assert_eq!(workflow.state().await, WorkflowState::AnalyzePrompt);
        assert_eq!(workflow.snapshot().await.transcript, MOCK_TRANSCRIPT);
    }

    #[test]
    fn test_connect_rejects_bad_transcription_url() {
        let mut settings = Settings::default();
        settings.transcription.url = "ftp://nowhere".to_string();
        let result = AppContext::connect(settings, Arc::new(MemoryCredentialStore::new()));
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }
}
