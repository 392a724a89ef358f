//! Keychain-backed persistence for the session token.

#[cfg(test)]
use std::collections::HashMap;
#[cfg(test)]
use std::sync::{Mutex, OnceLock};

#[cfg(not(test))]
use keyring::Entry;

use nodepad_core::auth::TOKEN_KEY;
use nodepad_core::{CredentialStore, CredentialToken, Error, Result};

#[cfg(not(test))]
const KEYRING_SERVICE_NAME: &str = "nodepad-cli";

#[derive(Debug, Clone)]
pub struct KeyringCredentialStore {
    account: String,
}

impl Default for KeyringCredentialStore {
    fn default() -> Self {
        Self {
            account: TOKEN_KEY.to_string(),
        }
    }
}

impl KeyringCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn for_account(account: &str) -> Self {
        Self {
            account: account.to_string(),
        }
    }

    #[cfg(test)]
    fn test_store() -> &'static Mutex<HashMap<String, String>> {
        static STORE: OnceLock<Mutex<HashMap<String, String>>> = OnceLock::new();
        STORE.get_or_init(|| Mutex::new(HashMap::new()))
    }

    #[cfg(not(test))]
    fn entry(&self) -> Result<Entry> {
        Entry::new(KEYRING_SERVICE_NAME, &self.account)
            .map_err(|error| Error::CredentialStore(error.to_string()))
    }
}

fn parse_stored(raw: &str) -> Result<Option<CredentialToken>> {
    match CredentialToken::new(raw) {
        Ok(token) => Ok(Some(token)),
        Err(_) => {
            tracing::warn!("Ignoring unusable token found in credential storage");
            Ok(None)
        }
    }
}

impl CredentialStore for KeyringCredentialStore {
    #[cfg(not(test))]
    fn load_token(&self) -> Result<Option<CredentialToken>> {
        match self.entry()?.get_password() {
            Ok(raw) => parse_stored(&raw),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(error) => Err(Error::CredentialStore(error.to_string())),
        }
    }

    #[cfg(test)]
    fn load_token(&self) -> Result<Option<CredentialToken>> {
        let guard = Self::test_store()
            .lock()
            .map_err(|error| Error::CredentialStore(error.to_string()))?;
        match guard.get(&self.account) {
            Some(raw) => parse_stored(raw),
            None => Ok(None),
        }
    }

    #[cfg(not(test))]
    fn save_token(&self, token: &CredentialToken) -> Result<()> {
        self.entry()?
            .set_password(token.expose())
            .map_err(|error| Error::CredentialStore(error.to_string()))
    }

    #[cfg(test)]
    fn save_token(&self, token: &CredentialToken) -> Result<()> {
        let mut guard = Self::test_store()
            .lock()
            .map_err(|error| Error::CredentialStore(error.to_string()))?;
        guard.insert(self.account.clone(), token.expose().to_string());
        Ok(())
    }

    #[cfg(not(test))]
    fn clear_token(&self) -> Result<()> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(error) => Err(Error::CredentialStore(error.to_string())),
        }
    }

    #[cfg(test)]
    fn clear_token(&self) -> Result<()> {
        let mut guard = Self::test_store()
            .lock()
            .map_err(|error| Error::CredentialStore(error.to_string()))?;
        guard.remove(&self.account);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_survives_reopening_the_store() {
        let store = KeyringCredentialStore::for_account("credentials-reopen");
        store
            .save_token(&CredentialToken::new("t1").unwrap())
            .unwrap();

        let reopened = KeyringCredentialStore::for_account("credentials-reopen");
        assert_eq!(reopened.load_token().unwrap().unwrap().expose(), "t1");

        reopened.clear_token().unwrap();
        assert!(store.load_token().unwrap().is_none());
    }

    #[test]
    fn clearing_a_missing_token_is_fine() {
        let store = KeyringCredentialStore::for_account("credentials-missing");
        assert!(store.clear_token().is_ok());
        assert!(store.load_token().unwrap().is_none());
    }

    #[test]
    fn default_store_uses_token_key() {
        assert_eq!(KeyringCredentialStore::new().account, TOKEN_KEY);
    }
}
