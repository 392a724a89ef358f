//! Persistence seam for the credential token.

use std::fmt;
use std::sync::{Arc, Mutex};

use crate::{Error, Result};

/// Well-known key the token is persisted under.
pub const TOKEN_KEY: &str = "token";

/// Opaque bearer token issued by `/auth/login`.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialToken(String);

impl CredentialToken {
    /// Accepts any non-empty run of visible ASCII, which is what can travel in a header.
    pub fn new(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        let token = raw.trim();
        if token.is_empty() {
            return Err(Error::Validation(
                "Credential token must not be empty".to_string(),
            ));
        }
        if !token.chars().all(|c| c.is_ascii_graphic()) {
            return Err(Error::Validation(
                "Credential token contains invalid characters".to_string(),
            ));
        }
        Ok(Self(token.to_string()))
    }

    /// Raw token text, for the `Authorization` header and the credential store only.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CredentialToken {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_tuple("CredentialToken")
            .field(&"[REDACTED]")
            .finish()
    }
}

/// Client-private key-value storage holding the token across restarts.
pub trait CredentialStore: Send + Sync + 'static {
    fn load_token(&self) -> Result<Option<CredentialToken>>;
    fn save_token(&self, token: &CredentialToken) -> Result<()>;
    fn clear_token(&self) -> Result<()>;
}

/// Process-local store. Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentialStore {
    slot: Arc<Mutex<Option<CredentialToken>>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: CredentialToken) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(token))),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load_token(&self) -> Result<Option<CredentialToken>> {
        let guard = self
            .slot
            .lock()
            .map_err(|error| Error::CredentialStore(error.to_string()))?;
        Ok(guard.clone())
    }

    fn save_token(&self, token: &CredentialToken) -> Result<()> {
        let mut guard = self
            .slot
            .lock()
            .map_err(|error| Error::CredentialStore(error.to_string()))?;
        *guard = Some(token.clone());
        Ok(())
    }

    fn clear_token(&self) -> Result<()> {
        let mut guard = self
            .slot
            .lock()
            .map_err(|error| Error::CredentialStore(error.to_string()))?;
        *guard = None;
        Ok(())
    }
}
