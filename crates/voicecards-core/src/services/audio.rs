//! Speech-to-text.
//!
//! [`Transcriber`] is the seam to the external speech-to-text capability.
//! [`OpenAiCompatibleTranscriber`] speaks the OpenAI Whisper upload format,
//! which OpenAI, Groq and self-hosted servers such as faster-whisper-server
//! all accept:
//! - multipart form with `model`, `file` and an optional `language`
//! - optional `Bearer` token
//! - JSON response with a `text` field

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use super::ServiceResponse;
use crate::audio::AudioPayload;
use crate::config::TranscriptionSettings;
use crate::error::ServiceError;

/// Result of transcribing one recording.
#[derive(Debug, Clone, PartialEq)]
pub struct Transcription {
    pub text: String,
    /// Detected language, when the server reports it
    pub language: Option<String>,
    pub confidence: Option<f32>,
}

impl Transcription {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            language: None,
            confidence: None,
        }
    }
}

#[async_trait]
pub trait Transcriber: Send + Sync {
    fn name(&self) -> &'static str;

    async fn transcribe(
        &self,
        payload: &AudioPayload,
        language: Option<&str>,
    ) -> Result<Transcription, ServiceError>;
}

#[derive(Deserialize)]
struct TranscriptionResponse {
    text: String,
    #[serde(default)]
    language: Option<String>,
}

/// Any server implementing `POST /v1/audio/transcriptions`.
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleTranscriber {
    client: reqwest::Client,
    api_url: String,
    model: String,
    api_key: Option<String>,
}

impl OpenAiCompatibleTranscriber {
    pub fn new(settings: &TranscriptionSettings, timeout: Duration) -> Result<Self, ServiceError> {
        let api_url = build_api_url(&settings.url)?;
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_url,
            model: settings.model.clone(),
            api_key: settings.api_key.clone().filter(|k| !k.trim().is_empty()),
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

/// Build the full endpoint URL from a server base URL
fn build_api_url(server_url: &str) -> Result<String, ServiceError> {
    let trimmed = server_url.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::validation(
            "Transcription server URL not configured.\n\
             Set with: voicecards config --transcription-url http://localhost:8765",
        ));
    }

    let after_scheme = trimmed
        .strip_prefix("http://")
        .or_else(|| trimmed.strip_prefix("https://"))
        .ok_or_else(|| {
            ServiceError::validation(format!(
                "Invalid transcription URL: must start with http:// or https://\nGot: {trimmed}"
            ))
        })?;
    if after_scheme.is_empty() || after_scheme.starts_with('/') {
        return Err(ServiceError::validation(format!(
            "Invalid transcription URL: missing host\nGot: {trimmed}"
        )));
    }

    let base = trimmed.trim_end_matches('/');
    if base.ends_with("/v1/audio/transcriptions") {
        return Ok(base.to_string());
    }
    Ok(format!("{base}/v1/audio/transcriptions"))
}

#[async_trait]
impl Transcriber for OpenAiCompatibleTranscriber {
    fn name(&self) -> &'static str {
        "openai-compatible"
    }

    async fn transcribe(
        &self,
        payload: &AudioPayload,
        language: Option<&str>,
    ) -> Result<Transcription, ServiceError> {
        let mut form = reqwest::multipart::Form::new()
            .text("model", self.model.clone())
            .part(
                "file",
                reqwest::multipart::Part::bytes(payload.data.clone())
                    .file_name(payload.filename.clone())
                    .mime_str(&payload.mime_type)?,
            );

        if let Some(lang) = language {
            form = form.text("language", lang.to_string());
        }

        crate::verbose!(
            "Uploading {} bytes ({}) to {}",
            payload.len(),
            payload.mime_type,
            self.api_url
        );

        let mut request = self.client.post(&self.api_url).multipart(form);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ServiceError::Backend {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let text = response.text().await?;
        let resp: TranscriptionResponse =
            serde_json::from_str(&text).map_err(|e| ServiceError::Decode(e.to_string()))?;

        Ok(Transcription {
            text: resp.text,
            language: resp.language,
            confidence: None,
        })
    }
}

/// Returns the same transcript for every recording.
#[derive(Debug, Clone)]
pub struct StaticTranscriber {
    text: String,
}

impl StaticTranscriber {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[async_trait]
impl Transcriber for StaticTranscriber {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn transcribe(
        &self,
        _payload: &AudioPayload,
        language: Option<&str>,
    ) -> Result<Transcription, ServiceError> {
        Ok(Transcription {
            text: self.text.clone(),
            language: language.map(str::to_string),
            confidence: Some(1.0),
        })
    }
}

/// Normalizing front for a [`Transcriber`].
#[derive(Clone)]
pub struct AudioService {
    transcriber: Arc<dyn Transcriber>,
    language: Option<String>,
}

impl AudioService {
    pub fn new(transcriber: Arc<dyn Transcriber>, language: Option<String>) -> Self {
        Self {
            transcriber,
            language,
        }
    }

    pub fn transcriber_name(&self) -> &'static str {
        self.transcriber.name()
    }

    /// Transcribe a recording to text
    pub async fn transcribe(&self, payload: &AudioPayload) -> ServiceResponse<String> {
        if payload.is_empty() {
            return ServiceResponse::failure("No audio captured");
        }
        let result = self
            .transcriber
            .transcribe(payload, self.language.as_deref())
            .await
            .and_then(|t| {
                let text = t.text.trim().to_string();
                if text.is_empty() {
                    Err(ServiceError::validation("No speech detected in the recording"))
                } else {
                    Ok(text)
                }
            });
        ServiceResponse::from_result(result, "Failed to transcribe audio")
    }
}
