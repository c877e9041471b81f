use std::fs;
use std::path::{Path, PathBuf};

use crate::config::AppConfig;
use crate::models::Identity;

use super::{SessionError, SessionStore};

const SESSION_FILE: &str = "session.json";

/// File-backed session record under the user's config directory, one JSON
/// document holding the current identity.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, SessionError> {
        let dir = dir.as_ref();
        if !dir.exists() {
            fs::create_dir_all(dir)?;
        }
        Ok(Self {
            path: dir.join(SESSION_FILE),
        })
    }

    /// Resolve the session directory: explicit config override, else
    /// `~/.config/brutalmotors`.
    pub fn from_config(config: &AppConfig) -> Result<Self, SessionError> {
        let dir = match &config.session.config_dir {
            Some(dir) => dir.clone(),
            None => {
                let home = std::env::var("HOME").map_err(|_| {
                    SessionError::Io(std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        "HOME environment variable not set",
                    ))
                })?;
                PathBuf::from(home).join(".config").join("brutalmotors")
            }
        };
        Self::new(dir)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn write(&self, identity: &Identity) -> Result<(), SessionError> {
        let content = serde_json::to_string_pretty(identity)?;
        fs::write(&self.path, content)?;
        Ok(())
    }

    fn read(&self) -> Result<Option<Identity>, SessionError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;
        match serde_json::from_str::<Identity>(&content) {
            Ok(identity) => Ok(Some(identity)),
            Err(err) => {
                // Corrupt or foreign data is treated as signed out.
                tracing::warn!(path = %self.path.display(), %err, "unreadable session record, ignoring");
                Ok(None)
            }
        }
    }

    fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
