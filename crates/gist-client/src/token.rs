//! Credential persistence for gist writes.
//!
//! The access token is an opaque bearer credential. It is requested from
//! the user the first time a write needs it and cached through a
//! [`TokenStore`] for every later operation.

use std::sync::{Arc, Mutex};

use crate::client::{GistError, GistResult};

pub trait TokenStore: Clone + Send + Sync + 'static {
    fn load(&self) -> GistResult<Option<String>>;
    fn save(&self, token: &str) -> GistResult<()>;
    fn clear(&self) -> GistResult<()>;
}

/// In-memory token store for tests and ephemeral sessions.
#[derive(Clone, Default)]
pub struct MemoryTokenStore {
    token: Arc<Mutex<Option<String>>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Arc::new(Mutex::new(Some(token.into()))),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> GistResult<Option<String>> {
        let guard = self
            .token
            .lock()
            .map_err(|error| GistError::Storage(error.to_string()))?;
        Ok(guard.clone())
    }

    fn save(&self, token: &str) -> GistResult<()> {
        let mut guard = self
            .token
            .lock()
            .map_err(|error| GistError::Storage(error.to_string()))?;
        *guard = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> GistResult<()> {
        let mut guard = self
            .token
            .lock()
            .map_err(|error| GistError::Storage(error.to_string()))?;
        *guard = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryTokenStore::new();
        assert!(store.load().unwrap().is_none());

        store.save("ghp_example").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("ghp_example"));

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }
}
