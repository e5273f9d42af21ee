use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

/// Key under which the session token is kept.
pub const TOKEN_KEY: &str = "token";

/// Storage file name in the data directory
const STORAGE_FILE: &str = "storage.json";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to access token storage at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Token storage is corrupted: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("Keychain error: {0}")]
    Keyring(#[from] keyring::Error),
}

/// Slot holding the current session token.
///
/// An empty string is never returned as a token; implementations treat it
/// as absence.
pub trait TokenStore: Send + Sync {
    fn set(&self, token: &str) -> Result<(), StoreError>;
    fn get(&self) -> Result<Option<String>, StoreError>;
    fn clear(&self) -> Result<(), StoreError>;
}

// ============================================================================
// File-backed store
// ============================================================================

/// Persists the token in a JSON key/value document on disk, alongside any
/// other keys already present in that document.
pub struct FileTokenStore {
    dir: PathBuf,
}

impl FileTokenStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(STORAGE_FILE)
    }

    fn io_error(path: &Path, source: io::Error) -> StoreError {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn load_document(&self) -> Result<Map<String, Value>, StoreError> {
        let path = self.path();
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(Self::io_error(&path, e)),
        };

        if contents.trim().is_empty() {
            return Ok(Map::new());
        }
        Ok(serde_json::from_str(&contents)?)
    }

    /// Document to rewrite on `set`/`clear`, and whether the file on disk
    /// was unparseable. A corrupt file is replaced rather than left
    /// blocking every later write.
    fn load_document_for_write(&self) -> Result<(Map<String, Value>, bool), StoreError> {
        match self.load_document() {
            Ok(document) => Ok((document, false)),
            Err(StoreError::Corrupt(e)) => {
                warn!(path = %self.path().display(), error = %e, "Token storage is corrupted, overwriting it");
                Ok((Map::new(), true))
            }
            Err(e) => Err(e),
        }
    }

    fn save_document(&self, document: &Map<String, Value>) -> Result<(), StoreError> {
        let path = self.path();
        std::fs::create_dir_all(&self.dir).map_err(|e| Self::io_error(&self.dir, e))?;

        // Write then rename so a crash never leaves a half-written file.
        let tmp = path.with_extension("json.tmp");
        let contents = serde_json::to_string_pretty(document)?;
        std::fs::write(&tmp, contents).map_err(|e| Self::io_error(&tmp, e))?;
        std::fs::rename(&tmp, &path).map_err(|e| Self::io_error(&path, e))?;
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn set(&self, token: &str) -> Result<(), StoreError> {
        let (mut document, _) = self.load_document_for_write()?;
        document.insert(TOKEN_KEY.to_string(), Value::String(token.to_string()));
        self.save_document(&document)?;
        debug!(path = %self.path().display(), "Session token saved");
        Ok(())
    }

    fn get(&self) -> Result<Option<String>, StoreError> {
        let document = self.load_document()?;
        Ok(document
            .get(TOKEN_KEY)
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .map(str::to_string))
    }

    fn clear(&self) -> Result<(), StoreError> {
        let (mut document, corrupt) = self.load_document_for_write()?;
        if document.remove(TOKEN_KEY).is_some() || corrupt {
            self.save_document(&document)?;
            debug!(path = %self.path().display(), "Session token removed");
        }
        Ok(())
    }
}

// ============================================================================
// In-memory store
// ============================================================================

/// Token slot that lives only as long as the process.
#[derive(Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.token.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl TokenStore for MemoryTokenStore {
    fn set(&self, token: &str) -> Result<(), StoreError> {
        *self.slot() = Some(token.to_string());
        Ok(())
    }

    fn get(&self) -> Result<Option<String>, StoreError> {
        Ok(self.slot().clone().filter(|t| !t.is_empty()))
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.slot() = None;
        Ok(())
    }
}
