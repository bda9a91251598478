//! Credential store port - holder of the single bearer token

use crate::domain::result::Result;

/// Durable holder of one bearer credential
///
/// Absence of a credential means "unauthenticated". Implementations must give
/// read-after-write consistency: after `clear()` returns, `get()` returns
/// `None`, and after `set()` returns, `get()` returns the new token.
pub trait CredentialStore: Send + Sync {
    /// Current credential, if any
    fn get(&self) -> Result<Option<String>>;

    /// Replace the current credential
    fn set(&self, token: &str) -> Result<()>;

    /// Remove the current credential
    fn clear(&self) -> Result<()>;

    /// Whether a credential is present
    fn is_present(&self) -> Result<bool> {
        Ok(self.get()?.is_some())
    }
}
