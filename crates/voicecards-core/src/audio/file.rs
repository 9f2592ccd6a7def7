//! Recording read from a file on disk.

use std::path::{Path, PathBuf};

use super::{AudioCapture, AudioError, AudioPayload, AudioSource};

/// Uses an existing audio file as the recording.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// MIME type for a supported extension
fn mime_for(path: &Path) -> Result<&'static str, AudioError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "wav" => Ok("audio/wav"),
        "mp3" => Ok("audio/mpeg"),
        "m4a" => Ok("audio/mp4"),
        "ogg" => Ok("audio/ogg"),
        "flac" => Ok("audio/flac"),
        "webm" => Ok("audio/webm"),
        _ => Err(AudioError::UnsupportedFormat(extension)),
    }
}

impl AudioSource for FileSource {
    fn open(&self) -> Result<Box<dyn AudioCapture>, AudioError> {
        let mime_type = mime_for(&self.path)?;
        // Fail at acquisition time, not after the user "stops" recording
        let metadata = std::fs::metadata(&self.path)?;
        if metadata.len() == 0 {
            return Err(AudioError::NoAudioCaptured);
        }
        crate::verbose!("Reading recording from {}", self.path.display());

        Ok(Box::new(FileCapture {
            path: self.path.clone(),
            mime_type,
        }))
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}

struct FileCapture {
    path: PathBuf,
    mime_type: &'static str,
}

impl AudioCapture for FileCapture {
    fn finish(self: Box<Self>) -> Result<AudioPayload, AudioError> {
        let data = std::fs::read(&self.path)?;
        if data.is_empty() {
            return Err(AudioError::NoAudioCaptured);
        }
        let filename = self
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("recording")
            .to_string();
        Ok(AudioPayload::new(data, self.mime_type, filename))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_fails_on_open() {
        let source = FileSource::new("/definitely/not/here.wav");
        assert!(matches!(source.open(), Err(AudioError::Io(_))));
    }

    #[test]
    fn test_unsupported_extension() {
        let source = FileSource::new("notes.txt");
        assert!(matches!(
            source.open(),
            Err(AudioError::UnsupportedFormat(ext)) if ext == "txt"
        ));
    }

    #[test]
    fn test_reads_file_payload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memo.mp3");
        std::fs::write(&path, b"ID3fake").unwrap();

        let payload = FileSource::new(&path).open().unwrap().finish().unwrap();
        assert_eq!(payload.mime_type, "audio/mpeg");
        assert_eq!(payload.filename, "memo.mp3");
        assert_eq!(payload.data, b"ID3fake");
    }
}
