//! Chunk buffer shared by the sample-producing captures.

use super::{AudioError, AudioPayload, WAV_MIME_TYPE, encode_wav};

/// Chunks of interleaved f32 samples, in arrival order.
#[derive(Debug, Clone)]
pub struct SampleBuffer {
    chunks: Vec<Vec<f32>>,
    sample_rate: u32,
    channels: u16,
}

impl SampleBuffer {
    pub fn new(sample_rate: u32, channels: u16) -> Self {
        Self {
            chunks: Vec::new(),
            sample_rate,
            channels,
        }
    }

    pub fn push(&mut self, chunk: Vec<f32>) {
        if !chunk.is_empty() {
            self.chunks.push(chunk);
        }
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn sample_count(&self) -> usize {
        self.chunks.iter().map(Vec::len).sum()
    }

    /// Recorded duration in seconds
    pub fn duration_secs(&self) -> f32 {
        let frames = self.sample_count() as f32 / self.channels.max(1) as f32;
        frames / self.sample_rate.max(1) as f32
    }

    /// Concatenate all chunks and encode them as one WAV payload
    pub fn assemble(self) -> Result<AudioPayload, AudioError> {
        if self.sample_count() == 0 {
            return Err(AudioError::NoAudioCaptured);
        }

        crate::verbose!(
            "Assembling {} chunks ({:.1}s at {} Hz)",
            self.chunk_count(),
            self.duration_secs(),
            self.sample_rate
        );

        let samples: Vec<f32> = self.chunks.into_iter().flatten().collect();
        let data = encode_wav(&samples, self.sample_rate, self.channels)?;
        Ok(AudioPayload::new(data, WAV_MIME_TYPE, "recording.wav"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_buffer_is_no_audio() {
        let buffer = SampleBuffer::new(16000, 1);
        assert!(matches!(buffer.assemble(), Err(AudioError::NoAudioCaptured)));
    }

    #[test]
    fn test_assemble_keeps_all_chunks() {
        let mut buffer = SampleBuffer::new(8000, 2);
        buffer.push(vec![0.1; 8000]);
        buffer.push(Vec::new());
        buffer.push(vec![0.2; 8000]);
        assert_eq!(buffer.chunk_count(), 2);
        assert!((buffer.duration_secs() - 1.0).abs() < f32::EPSILON);

        let payload = buffer.assemble().unwrap();
        assert_eq!(payload.mime_type, WAV_MIME_TYPE);
        // 16000 samples * 2 bytes, plus the header
        assert!(payload.len() > 16000 * 2);
        assert_eq!(&payload.data[8..12], b"WAVE");
    }
}
