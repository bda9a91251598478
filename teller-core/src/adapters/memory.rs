//! In-memory credential store
//!
//! Lives for the lifetime of the process. Used by tests and by hosts that
//! manage persistence themselves.

use std::sync::RwLock;

use crate::domain::result::{Error, Result};
use crate::ports::CredentialStore;

#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    token: RwLock<Option<String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a credential already present
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

fn poisoned<T>(e: std::sync::PoisonError<T>) -> Error {
    Error::Config(format!("Credential lock poisoned: {}", e))
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self) -> Result<Option<String>> {
        let token = self.token.read().map_err(poisoned)?;
        Ok(token.clone())
    }

    fn set(&self, token: &str) -> Result<()> {
        let mut slot = self.token.write().map_err(poisoned)?;
        *slot = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut slot = self.token.write().map_err(poisoned)?;
        *slot = None;
        Ok(())
    }
}
