pub mod file;
pub mod memory;

use thiserror::Error;

use crate::models::Identity;

pub use file::FileSessionStore;
pub use memory::MemorySessionStore;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session storage io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("session serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Durable slot for exactly one serialized [`Identity`], surviving restarts
/// on this device only. Corrupt or foreign stored data must read back as
/// absent, never as an error: bootstrap cannot be allowed to fail on a bad
/// cache.
pub trait SessionStore: Send + Sync {
    fn write(&self, identity: &Identity) -> Result<(), SessionError>;

    fn read(&self) -> Result<Option<Identity>, SessionError>;

    /// Idempotent: clearing an empty store succeeds.
    fn clear(&self) -> Result<(), SessionError>;
}
