//! Voice-to-cards recording and review.
//!
//! ```text
//! idle -> recording -> processing -> analyze_prompt -> processing -> results
//!   ^                      |                                           |
//!   +------ failure -------+                  confirm -> processing ---+-> idle
//! ```
//!
//! [`RecordingWorkflow`] performs no I/O. Each asynchronous step is split in
//! two: a begin half (`stop_recording`, `generate`, `confirm`) that returns a
//! job with a [`Ticket`], and a finish half that takes the ticket together
//! with the collaborator's [`ServiceResponse`]. `close` advances the epoch, so
//! a result that arrives afterwards is reported as [`Completion::Stale`] and
//! changes nothing. [`SharedWorkflow`] drives the collaborators.

mod shared;
mod state;

use std::collections::BTreeSet;

pub use shared::{SharedWorkflow, WorkflowSnapshot};
pub use state::{Completion, Ticket, WorkflowError, WorkflowState};

use crate::audio::{AudioCapture, AudioPayload, AudioSource};
use crate::model::{Card, SimpleCard};
use crate::services::ServiceResponse;

/// Called with the created cards after a successful confirm
pub type CardsCreatedHook = Box<dyn FnMut(&[Card]) + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Transcribe,
    Generate,
    Create,
}

/// Upload the recording for speech-to-text
#[derive(Debug)]
pub struct TranscribeJob {
    pub ticket: Ticket,
    pub payload: AudioPayload,
}

/// Turn the transcript into candidate cards
#[derive(Debug, Clone)]
pub struct GenerateJob {
    pub ticket: Ticket,
    pub prompt: String,
}

/// Bulk-create the selected candidates
#[derive(Debug, Clone)]
pub struct CreateJob {
    pub ticket: Ticket,
    pub cards: Vec<SimpleCard>,
}

#[derive(Default)]
pub struct RecordingWorkflow {
    state: WorkflowState,
    epoch: u64,
    next_seq: u64,
    pending: Option<(Ticket, Step)>,
    capture: Option<Box<dyn AudioCapture>>,
    recording_time: u64,
    transcript: String,
    candidates: Vec<SimpleCard>,
    selected: BTreeSet<usize>,
    error: Option<String>,
    on_cards_created: Option<CardsCreatedHook>,
}

impl std::fmt::Debug for RecordingWorkflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingWorkflow")
            .field("state", &self.state)
            .field("epoch", &self.epoch)
            .field("recording_time", &self.recording_time)
            .field("candidates", &self.candidates.len())
            .field("selected", &self.selected)
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl RecordingWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the list-changed notification fired after bulk create
    pub fn on_cards_created(&mut self, hook: impl FnMut(&[Card]) + Send + 'static) {
        self.on_cards_created = Some(Box::new(hook));
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    /// Whole seconds spent in `recording`
    pub fn recording_time(&self) -> u64 {
        self.recording_time
    }

    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    pub fn candidates(&self) -> &[SimpleCard] {
        &self.candidates
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.selected.contains(&index)
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    /// Selected candidates in their original order
    pub fn selected_cards(&self) -> Vec<SimpleCard> {
        self.selected
            .iter()
            .filter_map(|&i| self.candidates.get(i).cloned())
            .collect()
    }

    /// Last surfaced error, cleared by the next successful transition
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Acquire an input and start buffering
    pub fn start_recording(&mut self, source: &dyn AudioSource) -> Result<(), WorkflowError> {
        self.expect_state("start recording", WorkflowState::Idle)?;

        match source.open() {
            Ok(capture) => {
                crate::verbose!("Recording from {}", source.describe());
                self.capture = Some(capture);
                self.recording_time = 0;
                self.error = None;
                self.transition(WorkflowState::Recording);
                Ok(())
            }
            Err(e) => {
                self.error = Some(e.to_string());
                Err(e.into())
            }
        }
    }

    /// One second of elapsed time; ignored outside `recording`
    pub fn tick(&mut self) {
        if self.state == WorkflowState::Recording {
            self.recording_time += 1;
        }
    }

    /// Stop capture and hand out the assembled recording for transcription
    pub fn stop_recording(&mut self) -> Result<TranscribeJob, WorkflowError> {
        self.expect_state("stop recording", WorkflowState::Recording)?;

        let assembled = match self.capture.take() {
            Some(capture) => capture.finish(),
            None => Err(crate::audio::AudioError::NoAudioCaptured),
        };
        match assembled {
            Ok(payload) => {
                crate::verbose!("Captured {} bytes of audio", payload.len());
                let ticket = self.begin(Step::Transcribe);
                Ok(TranscribeJob { ticket, payload })
            }
            Err(e) => {
                self.error = Some(e.to_string());
                self.transition(WorkflowState::Idle);
                Err(e.into())
            }
        }
    }

    pub fn finish_transcription(
        &mut self,
        ticket: Ticket,
        response: ServiceResponse<String>,
    ) -> Completion {
        if !self.accept(ticket, Step::Transcribe) {
            return Completion::Stale;
        }
        match response.into_result() {
            Ok(text) => {
                self.transcript = text;
                self.error = None;
                self.transition(WorkflowState::AnalyzePrompt);
            }
            Err(message) => {
                self.error = Some(message);
                self.transition(WorkflowState::Idle);
            }
        }
        Completion::Applied
    }

    /// Replace the transcript before generating
    pub fn set_transcript(&mut self, text: impl Into<String>) -> Result<(), WorkflowError> {
        self.expect_state("edit the transcript", WorkflowState::AnalyzePrompt)?;
        self.transcript = text.into();
        Ok(())
    }

    pub fn generate(&mut self) -> Result<GenerateJob, WorkflowError> {
        self.expect_state("generate cards", WorkflowState::AnalyzePrompt)?;

        let prompt = self.transcript.trim().to_string();
        if prompt.is_empty() {
            let err = WorkflowError::EmptyTranscript;
            self.error = Some(err.to_string());
            return Err(err);
        }
        let ticket = self.begin(Step::Generate);
        Ok(GenerateJob { ticket, prompt })
    }

    pub fn finish_generation(
        &mut self,
        ticket: Ticket,
        response: ServiceResponse<Vec<SimpleCard>>,
    ) -> Completion {
        if !self.accept(ticket, Step::Generate) {
            return Completion::Stale;
        }
        match response.into_result() {
            Ok(candidates) => {
                self.selected = (0..candidates.len()).collect();
                self.candidates = candidates;
                self.error = None;
                self.transition(WorkflowState::Results);
            }
            Err(message) => {
                self.error = Some(message);
                self.transition(WorkflowState::AnalyzePrompt);
            }
        }
        Completion::Applied
    }

    /// Flip one candidate in or out of the selection; returns its new membership
    pub fn toggle(&mut self, index: usize) -> Result<bool, WorkflowError> {
        self.expect_state("change the selection", WorkflowState::Results)?;

        if index >= self.candidates.len() {
            return Err(WorkflowError::OutOfRange {
                index,
                len: self.candidates.len(),
            });
        }
        if self.selected.remove(&index) {
            Ok(false)
        } else {
            self.selected.insert(index);
            Ok(true)
        }
    }

    /// Hand out the selected candidates for bulk create
    pub fn confirm(&mut self) -> Result<CreateJob, WorkflowError> {
        self.expect_state("create cards", WorkflowState::Results)?;

        let cards = self.selected_cards();
        if cards.is_empty() {
            let err = WorkflowError::EmptySelection;
            self.error = Some(err.to_string());
            return Err(err);
        }
        let ticket = self.begin(Step::Create);
        Ok(CreateJob { ticket, cards })
    }

    pub fn finish_creation(
        &mut self,
        ticket: Ticket,
        response: ServiceResponse<Vec<Card>>,
    ) -> Completion {
        if !self.accept(ticket, Step::Create) {
            return Completion::Stale;
        }
        match response.into_result() {
            Ok(created) => {
                crate::verbose!("Created {} cards", created.len());
                if let Some(hook) = self.on_cards_created.as_mut() {
                    hook(&created);
                }
                self.close();
            }
            Err(message) => {
                self.error = Some(message);
                self.transition(WorkflowState::Results);
            }
        }
        Completion::Applied
    }

    /// Drop everything and return to `idle`. In-flight results become stale.
    pub fn close(&mut self) {
        self.epoch += 1;
        self.pending = None;
        self.capture = None;
        self.recording_time = 0;
        self.transcript.clear();
        self.candidates.clear();
        self.selected.clear();
        self.error = None;
        self.transition(WorkflowState::Idle);
    }

    fn expect_state(
        &self,
        action: &'static str,
        expected: WorkflowState,
    ) -> Result<(), WorkflowError> {
        if self.pending.is_some() {
            return Err(WorkflowError::Busy);
        }
        if self.state != expected {
            return Err(WorkflowError::InvalidTransition {
                action,
                state: self.state,
            });
        }
        Ok(())
    }

    fn begin(&mut self, step: Step) -> Ticket {
        let ticket = Ticket {
            epoch: self.epoch,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.pending = Some((ticket, step));
        self.transition(WorkflowState::Processing);
        ticket
    }

    /// Consume the pending claim if `ticket` is still the one we wait for
    fn accept(&mut self, ticket: Ticket, step: Step) -> bool {
        if ticket.epoch == self.epoch && self.pending == Some((ticket, step)) {
            self.pending = None;
            true
        } else {
            crate::verbose!("Dropping stale {step:?} result (epoch {})", ticket.epoch);
            false
        }
    }

    fn transition(&mut self, next: WorkflowState) {
        if self.state != next {
            crate::verbose!("Workflow: {} -> {}", self.state, next);
            self.state = next;
        }
    }
}
