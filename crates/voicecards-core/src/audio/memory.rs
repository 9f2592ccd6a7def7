//! Fixed in-memory recording.

use super::{AudioCapture, AudioError, AudioPayload, AudioSource, SampleBuffer};

/// Source that always "records" the same payload, or always fails to open.
#[derive(Debug, Clone)]
pub struct MemorySource {
    payload: Option<AudioPayload>,
}

impl MemorySource {
    pub fn new(payload: AudioPayload) -> Self {
        Self {
            payload: Some(payload),
        }
    }

    /// One second of silence as 16 kHz mono WAV
    pub fn silence() -> Result<Self, AudioError> {
        let mut buffer = SampleBuffer::new(16_000, 1);
        buffer.push(vec![0.0; 16_000]);
        Ok(Self::new(buffer.assemble()?))
    }

    /// A source whose device can never be acquired
    pub fn unavailable() -> Self {
        Self { payload: None }
    }
}

impl AudioSource for MemorySource {
    fn open(&self) -> Result<Box<dyn AudioCapture>, AudioError> {
        match &self.payload {
            Some(payload) => Ok(Box::new(MemoryCapture(payload.clone()))),
            None => Err(AudioError::NoInputDevice),
        }
    }

    fn describe(&self) -> String {
        match &self.payload {
            Some(payload) => format!("in-memory recording ({} bytes)", payload.len()),
            None => "unavailable input".to_string(),
        }
    }
}

struct MemoryCapture(AudioPayload);

impl AudioCapture for MemoryCapture {
    fn finish(self: Box<Self>) -> Result<AudioPayload, AudioError> {
        Ok(self.0)
    }
}
