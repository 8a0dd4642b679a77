//! Best-effort local cache of the current token document
//!
//! The document is stored as one JSON blob under [`STORAGE_KEY`] through a
//! [`StorageBackend`]. Loading never fails: missing data is `None`, and
//! corrupted data is logged, cleared and reported as `None`.

use crate::types::TokenData;
use log::{debug, warn};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Key of the persisted document
pub const STORAGE_KEY: &str = "design-tokens-state";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage quota exceeded: {size} bytes (limit {limit} bytes)")]
    QuotaExceeded { size: usize, limit: usize },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Key-value backend holding serialized documents
pub trait StorageBackend {
    /// Stored text for a key, `None` when absent
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store text under a key, replacing any previous value
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a key; removing an absent key is not an error
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// In-memory backend with an optional total size limit
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
    quota_bytes: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: HashMap::new(),
            quota_bytes: Some(quota_bytes),
        }
    }
}

impl StorageBackend for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if let Some(limit) = self.quota_bytes {
            let others: usize = self
                .entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let size = others + key.len() + value.len();
            if size > limit {
                return Err(StorageError::QuotaExceeded { size, limit });
            }
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Backend writing one `<key>.json` file per key in a directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    directory: PathBuf,
}

impl FileStorage {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.directory.join(format!("{}.json", key))
    }
}

impl StorageBackend for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.directory)?;
        fs::write(self.path_for(key), value)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Persists the current token document through a backend
#[derive(Debug)]
pub struct TokenStore<B: StorageBackend> {
    backend: B,
    quota_bytes: usize,
}

impl<B: StorageBackend> TokenStore<B> {
    pub fn new(backend: B, quota_bytes: usize) -> Self {
        Self {
            backend,
            quota_bytes,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Serialize and store a document
    ///
    /// # Errors
    ///
    /// `QuotaExceeded` when the serialized document is larger than the
    /// store's limit (nothing is written), or the backend's own error.
    pub fn save(&mut self, data: &TokenData) -> Result<(), StorageError> {
        let serialized = serde_json::to_string(data)?;
        if serialized.len() > self.quota_bytes {
            return Err(StorageError::QuotaExceeded {
                size: serialized.len(),
                limit: self.quota_bytes,
            });
        }
        self.backend.set(STORAGE_KEY, &serialized)?;
        debug!("Saved {} bytes of token data", serialized.len());
        Ok(())
    }

    /// Load the stored document
    ///
    /// Returns `None` when nothing is stored, when the backend fails, or when
    /// the stored text is not a JSON object. In the last case the stored
    /// value is cleared as well.
    pub fn load(&mut self) -> Option<TokenData> {
        let stored = match self.backend.get(STORAGE_KEY) {
            Ok(Some(stored)) => stored,
            Ok(None) => return None,
            Err(e) => {
                warn!("Error loading tokens from storage: {}", e);
                return None;
            }
        };

        match serde_json::from_str::<TokenData>(&stored) {
            Ok(data) => Some(data),
            Err(e) => {
                warn!("Discarding corrupted token data: {}", e);
                if let Err(e) = self.clear() {
                    warn!("Error clearing corrupted token data: {}", e);
                }
                None
            }
        }
    }

    /// Remove the stored document
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.backend.remove(STORAGE_KEY)
    }
}
