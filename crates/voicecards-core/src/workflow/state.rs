use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::audio::AudioError;

/// Where the recording modal currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    #[default]
    Idle,
    Recording,
    /// A transcription, generation or bulk create is in flight
    Processing,
    AnalyzePrompt,
    Results,
}

impl WorkflowState {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowState::Idle => "idle",
            WorkflowState::Recording => "recording",
            WorkflowState::Processing => "processing",
            WorkflowState::AnalyzePrompt => "analyze_prompt",
            WorkflowState::Results => "results",
        }
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Claim on the result of one asynchronous step.
///
/// Only the ticket of the currently pending step is honored; anything from
/// before the last `close` is stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub(crate) epoch: u64,
    pub(crate) seq: u64,
}

impl Ticket {
    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

/// What happened to a delivered result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    /// The workflow moved on (closed or reset) and the result was dropped
    Stale,
}

impl Completion {
    pub fn is_applied(&self) -> bool {
        matches!(self, Completion::Applied)
    }
}

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Cannot {action} while {state}")]
    InvalidTransition {
        action: &'static str,
        state: WorkflowState,
    },

    #[error("A request is already in progress")]
    Busy,

    #[error("Select at least one card to create")]
    EmptySelection,

    #[error("The transcript is empty")]
    EmptyTranscript,

    #[error("No card at position {index} (have {len})")]
    OutOfRange { index: usize, len: usize },

    #[error(transparent)]
    Audio(#[from] AudioError),
}
