//! Persistent client settings.
//!
//! Stored as JSON in `<config dir>/voicecards/settings.json`. Missing files
//! and missing fields fall back to defaults; a few environment variables
//! override whatever is on disk.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Backend used when nothing else is configured
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Request timeout for backend and transcription calls
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Route used to delete a card; `{id}` is replaced with the card id
pub const DEFAULT_DELETE_ROUTE: &str = "/cards/delete/{id}";

/// OpenAI-compatible speech-to-text server
pub const DEFAULT_TRANSCRIPTION_URL: &str = "https://api.openai.com";

pub const DEFAULT_TRANSCRIPTION_MODEL: &str = "whisper-1";

pub const API_URL_ENV: &str = "VOICECARDS_API_URL";
pub const TRANSCRIPTION_URL_ENV: &str = "VOICECARDS_TRANSCRIPTION_URL";
pub const TRANSCRIPTION_KEY_ENV: &str = "OPENAI_API_KEY";

/// Speech-to-text configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionSettings {
    /// Base URL of an OpenAI-compatible server (`/v1/audio/transcriptions` is appended)
    #[serde(default = "default_transcription_url")]
    pub url: String,

    #[serde(default = "default_transcription_model")]
    pub model: String,

    /// Bearer token for the transcription server (self-hosted servers usually need none)
    #[serde(default)]
    pub api_key: Option<String>,
}

fn default_transcription_url() -> String {
    DEFAULT_TRANSCRIPTION_URL.to_string()
}

fn default_transcription_model() -> String {
    DEFAULT_TRANSCRIPTION_MODEL.to_string()
}

impl Default for TranscriptionSettings {
    fn default() -> Self {
        Self {
            url: default_transcription_url(),
            model: default_transcription_model(),
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Base URL of the cards backend
    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,

    /// Language hint passed to speech-to-text (None = auto-detect)
    #[serde(default)]
    pub language: Option<String>,

    #[serde(default = "default_delete_route")]
    pub delete_route: String,

    #[serde(default)]
    pub transcription: TranscriptionSettings,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_delete_route() -> String {
    DEFAULT_DELETE_ROUTE.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            request_timeout_secs: default_timeout(),
            language: None,
            delete_route: default_delete_route(),
            transcription: TranscriptionSettings::default(),
        }
    }
}

impl Settings {
    /// Directory holding settings and the session token
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("voicecards")
    }

    pub fn path() -> PathBuf {
        Self::config_dir().join("settings.json")
    }

    /// Where the bearer token is persisted between runs
    pub fn token_path() -> PathBuf {
        Self::config_dir().join("token")
    }

    /// Load settings from the default location, falling back to defaults.
    ///
    /// Environment overrides are applied on top.
    pub fn load() -> Self {
        let path = Self::path();
        let mut settings = if path.exists() {
            match Self::load_from(&path) {
                Ok(settings) => settings,
                Err(e) => {
                    crate::verbose!("Ignoring unreadable settings at {}: {e:#}", path.display());
                    Self::default()
                }
            }
        } else {
            Self::default()
        };
        settings.apply_env_overrides();
        settings
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&content).context("Failed to parse settings")
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        let content = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    /// Apply `VOICECARDS_API_URL`, `VOICECARDS_TRANSCRIPTION_URL` and `OPENAI_API_KEY`
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(url) = non_empty(API_URL_ENV) {
            self.api_url = url;
        }
        if let Some(url) = non_empty(TRANSCRIPTION_URL_ENV) {
            self.transcription.url = url;
        }
        if self.transcription.api_key.is_none() {
            self.transcription.api_key = non_empty(TRANSCRIPTION_KEY_ENV);
        }
    }

    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_secs)
    }

    /// Validate values that would otherwise fail deep inside a request
    pub fn validate(&self) -> Result<()> {
        let url = self.api_url.trim();
        if !url.starts_with("http://") && !url.starts_with("https://") {
            anyhow::bail!(
                "Invalid API URL: must start with http:// or https://\n\
                 Got: {}\n\
                 Example: voicecards config --api-url http://localhost:8080",
                url
            );
        }
        if self.request_timeout_secs == 0 {
            anyhow::bail!("Invalid request timeout: must be at least 1 second");
        }
        if !self.delete_route.contains("{id}") {
            anyhow::bail!(
                "Invalid delete route '{}': it must contain the {{id}} placeholder",
                self.delete_route
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_uses_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"api_url":"https://cards.example.com"}"#).unwrap();
        assert_eq!(settings.api_url, "https://cards.example.com");
        assert_eq!(settings.request_timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(settings.transcription.model, DEFAULT_TRANSCRIPTION_MODEL);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = Settings {
            language: Some("pt".to_string()),
            ..Default::default()
        };
        settings.save_to(&path).unwrap();
        assert_eq!(Settings::load_from(&path).unwrap(), settings);
    }

    #[test]
    fn test_env_overrides() {
        let mut settings = Settings::default();
        settings.apply_overrides(|name| match name {
            API_URL_ENV => Some("https://api.example.com".to_string()),
            TRANSCRIPTION_KEY_ENV => Some("sk-test".to_string()),
            _ => None,
        });
        assert_eq!(settings.api_url, "https://api.example.com");
        assert_eq!(settings.transcription.url, DEFAULT_TRANSCRIPTION_URL);
        assert_eq!(settings.transcription.api_key.as_deref(), Some("sk-test"));
    }

    #[test]
    fn test_validate_delete_route() {
        assert!(Settings::default().validate().is_ok());

        let broken = Settings {
            delete_route: "/cards/delete".to_string(),
            ..Default::default()
        };
        assert!(broken.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let settings = Settings {
            request_timeout_secs: 0,
            ..Default::default()
        };
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("at least 1 second"));
    }
}
