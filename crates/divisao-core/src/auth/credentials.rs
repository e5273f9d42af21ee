use keyring::Entry;

use super::store::{StoreError, TokenStore, TOKEN_KEY};

const SERVICE_NAME: &str = "divisao";

/// Keeps the session token in the OS keychain instead of a plain file.
pub struct KeyringTokenStore {
    entry: Entry,
}

impl KeyringTokenStore {
    pub fn new() -> Result<Self, StoreError> {
        Self::for_account(TOKEN_KEY)
    }

    /// Use a different keychain account, e.g. one per API environment
    pub fn for_account(account: &str) -> Result<Self, StoreError> {
        Ok(Self {
            entry: Entry::new(SERVICE_NAME, account)?,
        })
    }
}

impl TokenStore for KeyringTokenStore {
    fn set(&self, token: &str) -> Result<(), StoreError> {
        self.entry.set_password(token)?;
        Ok(())
    }

    fn get(&self) -> Result<Option<String>, StoreError> {
        match self.entry.get_password() {
            Ok(token) if token.is_empty() => Ok(None),
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn clear(&self) -> Result<(), StoreError> {
        match self.entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
