use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::{Completion, RecordingWorkflow, WorkflowError, WorkflowState};
use crate::audio::AudioSource;
use crate::model::{Card, SimpleCard};
use crate::services::{AudioService, CardService};

/// Point-in-time view of the workflow for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowSnapshot {
    pub state: WorkflowState,
    pub recording_time: u64,
    pub transcript: String,
    pub candidates: Vec<SimpleCard>,
    /// Parallel to `candidates`
    pub selected: Vec<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A [`RecordingWorkflow`] wired to its collaborators.
///
/// The lock is released while a collaborator call is in flight, so `close`
/// from another task takes effect immediately and the late result is dropped.
#[derive(Clone)]
pub struct SharedWorkflow {
    inner: Arc<Mutex<RecordingWorkflow>>,
    audio: AudioService,
    cards: CardService,
}

impl SharedWorkflow {
    pub fn new(audio: AudioService, cards: CardService) -> Self {
        Self::with_workflow(RecordingWorkflow::new(), audio, cards)
    }

    pub fn with_workflow(workflow: RecordingWorkflow, audio: AudioService, cards: CardService) -> Self {
        Self {
            inner: Arc::new(Mutex::new(workflow)),
            audio,
            cards,
        }
    }

    /// Run `f` against the workflow under the lock
    pub async fn with<R>(&self, f: impl FnOnce(&mut RecordingWorkflow) -> R) -> R {
        f(&mut *self.inner.lock().await)
    }

    pub async fn on_cards_created(&self, hook: impl FnMut(&[Card]) + Send + 'static) {
        self.inner.lock().await.on_cards_created(hook);
    }

    pub async fn state(&self) -> WorkflowState {
        self.inner.lock().await.state()
    }

    pub async fn snapshot(&self) -> WorkflowSnapshot {
        let wf = self.inner.lock().await;
        WorkflowSnapshot {
            state: wf.state(),
            recording_time: wf.recording_time(),
            transcript: wf.transcript().to_string(),
            candidates: wf.candidates().to_vec(),
            selected: (0..wf.candidates().len()).map(|i| wf.is_selected(i)).collect(),
            error: wf.error().map(str::to_string),
        }
    }

    pub async fn start_recording(&self, source: &dyn AudioSource) -> Result<(), WorkflowError> {
        self.inner.lock().await.start_recording(source)
    }

    pub async fn tick(&self) {
        self.inner.lock().await.tick();
    }

    /// Stop capture and transcribe the recording
    pub async fn stop_and_transcribe(&self) -> Result<Completion, WorkflowError> {
        let job = self.inner.lock().await.stop_recording()?;
        let response = self.audio.transcribe(&job.payload).await;
        Ok(self
            .inner
            .lock()
            .await
            .finish_transcription(job.ticket, response))
    }

    pub async fn set_transcript(&self, text: impl Into<String>) -> Result<(), WorkflowError> {
        self.inner.lock().await.set_transcript(text)
    }

    /// Turn the transcript into candidate cards
    pub async fn generate(&self) -> Result<Completion, WorkflowError> {
        let job = self.inner.lock().await.generate()?;
        let response = self.cards.generate_cards(&job.prompt).await;
        Ok(self.inner.lock().await.finish_generation(job.ticket, response))
    }

    pub async fn toggle(&self, index: usize) -> Result<bool, WorkflowError> {
        self.inner.lock().await.toggle(index)
    }

    /// Bulk-create the selected candidates
    pub async fn confirm(&self) -> Result<Completion, WorkflowError> {
        let job = self.inner.lock().await.confirm()?;
        let response = self.cards.create_multiple_cards(job.cards).await;
        Ok(self.inner.lock().await.finish_creation(job.ticket, response))
    }

    pub async fn close(&self) {
        self.inner.lock().await.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{AudioPayload, MemorySource};
    use crate::error::ServiceError;
    use crate::services::{MockCardsApi, StaticTranscriber, Transcriber, Transcription};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    const NOTES: &str = "Buy milk. Call the bank. Book the flight.";

    fn source() -> MemorySource {
        MemorySource::new(AudioPayload::new(vec![0; 32], "audio/wav", "recording.wav"))
    }

    fn workflow(transcriber: Arc<dyn Transcriber>) -> (Arc<MockCardsApi>, SharedWorkflow) {
        let api = Arc::new(MockCardsApi::empty());
        let shared = SharedWorkflow::new(
            AudioService::new(transcriber, None),
            CardService::new(api.clone()),
        );
        (api, shared)
    }

    /// Counts calls and can hold a transcription until released
    struct GatedTranscriber {
        calls: AtomicUsize,
        entered: Notify,
        release: Notify,
        result: Result<&'static str, ()>,
    }

    impl GatedTranscriber {
        fn new(result: Result<&'static str, ()>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                entered: Notify::new(),
                release: Notify::new(),
                result,
            }
        }
    }

    #[async_trait]
    impl Transcriber for GatedTranscriber {
        fn name(&self) -> &'static str {
            "gated"
        }

        async fn transcribe(
            &self,
            _payload: &AudioPayload,
            _language: Option<&str>,
        ) -> Result<Transcription, ServiceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.entered.notify_one();
            self.release.notified().await;
            match self.result {
                Ok(text) => Ok(Transcription::text(text)),
                Err(()) => Err(ServiceError::Backend {
                    status: 503,
                    message: "unavailable".to_string(),
                }),
            }
        }
    }

    #[tokio::test]
    async fn test_three_candidates_deselect_one_sends_two() {
        let (api, shared) = workflow(Arc::new(StaticTranscriber::new(NOTES)));
        let created = Arc::new(AtomicUsize::new(0));
        let counter = created.clone();
        shared
            .on_cards_created(move |cards| {
                counter.fetch_add(cards.len(), Ordering::SeqCst);
            })
            .await;

        shared.start_recording(&source()).await.unwrap();
        shared.tick().await;
        assert!(shared.stop_and_transcribe().await.unwrap().is_applied());
        assert_eq!(shared.state().await, WorkflowState::AnalyzePrompt);

        shared.generate().await.unwrap();
        let snapshot = shared.snapshot().await;
        assert_eq!(snapshot.state, WorkflowState::Results);
        assert_eq!(snapshot.selected, vec![true, true, true]);

        shared.toggle(1).await.unwrap();
        shared.confirm().await.unwrap();

        assert_eq!(created.load(Ordering::SeqCst), 2);
        assert_eq!(api.len().await, 2);
        let snapshot = shared.snapshot().await;
        assert_eq!(snapshot.state, WorkflowState::Idle);
        assert!(snapshot.candidates.is_empty());
    }

    #[tokio::test]
    async fn test_empty_selection_never_reaches_backend() {
        let (api, shared) = workflow(Arc::new(StaticTranscriber::new("One. Two.")));
        shared.start_recording(&source()).await.unwrap();
        shared.stop_and_transcribe().await.unwrap();
        shared.generate().await.unwrap();
        let before = api.request_count();

        shared.toggle(0).await.unwrap();
        shared.toggle(1).await.unwrap();
        assert!(matches!(
            shared.confirm().await,
            Err(WorkflowError::EmptySelection)
        ));
        assert_eq!(api.request_count(), before);
        assert_eq!(shared.state().await, WorkflowState::Results);
    }

    #[tokio::test]
    async fn test_transcription_failure_skips_generation() {
        let transcriber = Arc::new(GatedTranscriber::new(Err(())));
        transcriber.release.notify_one();
        let (api, shared) = workflow(transcriber.clone());

        shared.start_recording(&source()).await.unwrap();
        shared.stop_and_transcribe().await.unwrap();

        let snapshot = shared.snapshot().await;
        assert_eq!(snapshot.state, WorkflowState::Idle);
        assert_eq!(snapshot.error.as_deref(), Some("Failed to transcribe audio"));
        assert_eq!(api.request_count(), 0);
    }

    #[tokio::test]
    async fn test_close_during_transcription_drops_late_result() {
        let transcriber = Arc::new(GatedTranscriber::new(Ok("late transcript")));
        let (_, shared) = workflow(transcriber.clone());
        shared.start_recording(&source()).await.unwrap();

        let task = {
            let shared = shared.clone();
            tokio::spawn(async move { shared.stop_and_transcribe().await })
        };

        transcriber.entered.notified().await;
        assert_eq!(shared.state().await, WorkflowState::Processing);
        shared.close().await;
        transcriber.release.notify_one();

        let completion = task.await.unwrap().unwrap();
        assert_eq!(completion, Completion::Stale);
        let snapshot = shared.snapshot().await;
        assert_eq!(snapshot.state, WorkflowState::Idle);
        assert!(snapshot.transcript.is_empty());
        assert_eq!(transcriber.calls.load(Ordering::SeqCst), 1);
    }
}
