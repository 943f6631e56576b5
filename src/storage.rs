use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::{ClientError, ClientResult};

/// Key of the cached principal some older console builds wrote next to the token
const CACHED_PRINCIPAL_KEY: &str = "admin_me";

/// Persistent storage for the bearer token.
///
/// The session provider is the only writer apart from the HTTP client's
/// 401 path, which clears it.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> ClientResult<Option<String>>;
    fn save(&self, token: &str) -> ClientResult<()>;
    fn clear(&self) -> ClientResult<()>;
}

#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> ClientResult<Option<String>> {
        let guard = self
            .token
            .read()
            .map_err(|_| ClientError::Storage("token lock poisoned".to_string()))?;
        Ok(guard.clone())
    }

    fn save(&self, token: &str) -> ClientResult<()> {
        let mut guard = self
            .token
            .write()
            .map_err(|_| ClientError::Storage("token lock poisoned".to_string()))?;
        *guard = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> ClientResult<()> {
        let mut guard = self
            .token
            .write()
            .map_err(|_| ClientError::Storage("token lock poisoned".to_string()))?;
        *guard = None;
        Ok(())
    }
}

/// Key/value JSON file under the console config directory
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
    key: String,
}

impl FileTokenStore {
    pub fn new(path: PathBuf, key: impl Into<String>) -> Self {
        Self {
            path,
            key: key.into(),
        }
    }

    /// Open `storage.json` inside the configured (or default) config directory
    pub fn in_config_dir(config_dir: Option<PathBuf>, key: impl Into<String>) -> ClientResult<Self> {
        let dir = match config_dir {
            Some(dir) => dir,
            None => default_config_dir()?,
        };

        if !dir.exists() {
            fs::create_dir_all(&dir).map_err(|e| ClientError::Storage(e.to_string()))?;
        }

        Ok(Self::new(dir.join("storage.json"), key))
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn read_entries(&self) -> ClientResult<HashMap<String, String>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }

        let content = fs::read_to_string(&self.path).map_err(|e| ClientError::Storage(e.to_string()))?;
        if content.trim().is_empty() {
            return Ok(HashMap::new());
        }

        serde_json::from_str(&content).map_err(|e| ClientError::Storage(e.to_string()))
    }

    /// Entries to rewrite from. A file that cannot be parsed is treated as
    /// empty so the next write replaces it.
    fn entries_for_write(&self) -> ClientResult<HashMap<String, String>> {
        match self.read_entries() {
            Ok(entries) => Ok(entries),
            Err(e) if self.path.is_file() => {
                tracing::warn!("Discarding unreadable storage file {}: {}", self.path.display(), e);
                Ok(HashMap::new())
            }
            Err(e) => Err(e),
        }
    }

    fn write_entries(&self, entries: &HashMap<String, String>) -> ClientResult<()> {
        let content = serde_json::to_string_pretty(entries).map_err(|e| ClientError::Storage(e.to_string()))?;
        fs::write(&self.path, content).map_err(|e| ClientError::Storage(e.to_string()))
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> ClientResult<Option<String>> {
        let entries = self.read_entries()?;
        Ok(entries.get(&self.key).filter(|t| !t.is_empty()).cloned())
    }

    fn save(&self, token: &str) -> ClientResult<()> {
        let mut entries = self.entries_for_write()?;
        entries.insert(self.key.clone(), token.to_string());
        self.write_entries(&entries)
    }

    fn clear(&self) -> ClientResult<()> {
        let mut entries = match self.read_entries() {
            Ok(entries) => entries,
            Err(e) if self.path.is_file() => {
                tracing::warn!("Removing unreadable storage file {}: {}", self.path.display(), e);
                return fs::remove_file(&self.path).map_err(|e| ClientError::Storage(e.to_string()));
            }
            Err(e) => return Err(e),
        };
        let removed_token = entries.remove(&self.key).is_some();
        let removed_cached = entries.remove(CACHED_PRINCIPAL_KEY).is_some();

        if removed_token || removed_cached {
            self.write_entries(&entries)?;
        }
        Ok(())
    }
}

fn default_config_dir() -> ClientResult<PathBuf> {
    let home = std::env::var("HOME").map_err(|_| ClientError::Storage("HOME environment variable not set".to_string()))?;
    Ok(PathBuf::from(home).join(".config").join("beacon").join("console"))
}
