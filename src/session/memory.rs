use std::sync::{Arc, Mutex};

use crate::models::Identity;

use super::{SessionError, SessionStore};

/// In-process session slot. Clones share the same slot, so tests can hand
/// one copy to the auth context and keep another for inspection.
#[derive(Clone, Default)]
pub struct MemorySessionStore {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the slot with raw content, valid or not. Lets tests exercise the
    /// corrupt-record tolerance without touching the filesystem.
    pub fn seed_raw(&self, content: impl Into<String>) {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = Some(content.into());
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn write(&self, identity: &Identity) -> Result<(), SessionError> {
        let content = serde_json::to_string(identity)?;
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| SessionError::Io(std::io::Error::other("session slot poisoned")))?;
        *slot = Some(content);
        Ok(())
    }

    fn read(&self) -> Result<Option<Identity>, SessionError> {
        let slot = self
            .slot
            .lock()
            .map_err(|_| SessionError::Io(std::io::Error::other("session slot poisoned")))?;
        let Some(content) = slot.as_ref() else {
            return Ok(None);
        };
        match serde_json::from_str::<Identity>(content) {
            Ok(identity) => Ok(Some(identity)),
            Err(err) => {
                tracing::warn!(%err, "unreadable session record, ignoring");
                Ok(None)
            }
        }
    }

    fn clear(&self) -> Result<(), SessionError> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| SessionError::Io(std::io::Error::other("session slot poisoned")))?;
        *slot = None;
        Ok(())
    }
}
