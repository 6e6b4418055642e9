use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use super::domain::SessionId;
use super::session::SessionState;

/// Storage abstraction over the external key-value store keyed by session
/// id. Failures here are non-fatal: the in-memory session stays
/// authoritative until a save succeeds.
pub trait SessionStore: Send + Sync {
    fn load(&self, id: &SessionId) -> Result<Option<SessionState>, StoreError>;
    fn save(&self, id: &SessionId, state: &SessionState) -> Result<(), StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("session store unavailable: {0}")]
    Unavailable(String),
    #[error("session state could not be encoded: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Process-local store used by the demo binary and as the default backend.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    entries: Mutex<BTreeMap<SessionId, SessionState>>,
}

impl SessionStore for InMemorySessionStore {
    fn load(&self, id: &SessionId) -> Result<Option<SessionState>, StoreError> {
        let guard = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(guard.get(id).cloned())
    }

    fn save(&self, id: &SessionId, state: &SessionState) -> Result<(), StoreError> {
        let mut guard = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        guard.insert(id.clone(), state.clone());
        Ok(())
    }
}
