//! Audio capture for the recording workflow.
//!
//! An [`AudioSource`] hands out an [`AudioCapture`] when the input can be
//! acquired. The capture buffers chunks until [`AudioCapture::finish`]
//! assembles them into one [`AudioPayload`] for speech-to-text.
//!
//! Sources:
//! - [`FileSource`] - an existing recording on disk
//! - [`MemorySource`] - a fixed payload (mock mode, tests)
//! - `MicrophoneSource` - the default input device (`microphone` feature)

mod buffer;
mod encoder;
mod file;
mod memory;
#[cfg(feature = "microphone")]
mod microphone;

use thiserror::Error;

pub use buffer::SampleBuffer;
pub use encoder::{WAV_MIME_TYPE, encode_wav};
pub use file::FileSource;
pub use memory::MemorySource;
#[cfg(feature = "microphone")]
pub use microphone::MicrophoneSource;

/// Audio capture failures.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("No microphone found")]
    NoInputDevice,

    #[error("Audio device error: {0}")]
    Device(String),

    #[error("No audio captured")]
    NoAudioCaptured,

    #[error("Unsupported audio format: '{0}'. Supported: wav, mp3, m4a, ogg, flac, webm")]
    UnsupportedFormat(String),

    #[error("Audio encoding failed: {0}")]
    Encode(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A complete recording ready to upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioPayload {
    pub data: Vec<u8>,
    pub mime_type: String,
    pub filename: String,
}

impl AudioPayload {
    pub fn new(data: Vec<u8>, mime_type: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            data,
            mime_type: mime_type.into(),
            filename: filename.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }
}

/// An acquired input that is buffering audio.
pub trait AudioCapture: Send {
    /// Stop capturing and assemble everything buffered into one payload
    fn finish(self: Box<Self>) -> Result<AudioPayload, AudioError>;
}

/// Something that can be opened for recording.
pub trait AudioSource: Send + Sync {
    /// Acquire the input and start buffering
    fn open(&self) -> Result<Box<dyn AudioCapture>, AudioError>;

    /// Short description for logs and prompts
    fn describe(&self) -> String;
}
