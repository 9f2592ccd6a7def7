//! Bearer token persistence.
//!
//! The API client reads the token on every request, so whatever a store
//! returns is what goes into the `Authorization` header.

use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

/// Where the session token lives between requests (and between runs).
pub trait CredentialStore: Send + Sync {
    fn load_token(&self) -> Option<String>;
    fn save_token(&self, token: &str) -> io::Result<()>;
    fn clear_token(&self) -> io::Result<()>;
}

/// Token kept in a single file, readable only by the current user on Unix.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn load_token(&self) -> Option<String> {
        let token = std::fs::read_to_string(&self.path).ok()?;
        let token = token.trim();
        (!token.is_empty()).then(|| token.to_string())
    }

    fn save_token(&self, token: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, token)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))?;
        }

        crate::verbose!("Session token saved to {}", self.path.display());
        Ok(())
    }

    fn clear_token(&self) -> io::Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

/// Token held in memory for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    token: Mutex<Option<String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.token.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load_token(&self) -> Option<String> {
        self.slot().clone()
    }

    fn save_token(&self, token: &str) -> io::Result<()> {
        *self.slot() = Some(token.to_string());
        Ok(())
    }

    fn clear_token(&self) -> io::Result<()> {
        *self.slot() = None;
        Ok(())
    }
}
