use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{SessionError, SessionToken};

/// Fixed key the credential is stored under
pub const TOKEN_KEY: &str = "token";

/// Client-local persistence for the session credential
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Option<SessionToken>, SessionError>;
    fn save(&self, token: &SessionToken) -> Result<(), SessionError>;
    fn clear(&self) -> Result<(), SessionError>;
}

/// Other keys in the file are kept as-is and never interpreted
#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionFile {
    #[serde(flatten)]
    entries: Map<String, Value>,
}

/// Stores the token as `{"token": "..."}` in a JSON file
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `session.json` inside the given config directory
    pub fn in_dir(config_dir: &Path) -> Self {
        Self::new(config_dir.join("session.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_file(&self) -> Result<SessionFile, SessionError> {
        if !self.path.exists() {
            return Ok(SessionFile::default());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(SessionFile::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn write_file(&self, file: &SessionFile) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(file)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<SessionToken>, SessionError> {
        let file = self.read_file()?;
        Ok(file
            .entries
            .get(TOKEN_KEY)
            .and_then(Value::as_str)
            .and_then(SessionToken::parse))
    }

    fn save(&self, token: &SessionToken) -> Result<(), SessionError> {
        let mut file = self.read_file()?;
        file.entries
            .insert(TOKEN_KEY.to_string(), Value::String(token.as_str().to_string()));
        self.write_file(&file)
    }

    fn clear(&self) -> Result<(), SessionError> {
        let mut file = self.read_file()?;
        if file.entries.remove(TOKEN_KEY).is_some() {
            self.write_file(&file)?;
        }
        Ok(())
    }
}

/// Process-local store, used when nothing should touch disk
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<SessionToken>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: SessionToken) -> Self {
        Self {
            token: Mutex::new(Some(token)),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<SessionToken>, SessionError> {
        Ok(self.token.lock().map_err(|_| SessionError::Poisoned)?.clone())
    }

    fn save(&self, token: &SessionToken) -> Result<(), SessionError> {
        *self.token.lock().map_err(|_| SessionError::Poisoned)? = Some(token.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        *self.token.lock().map_err(|_| SessionError::Poisoned)? = None;
        Ok(())
    }
}
