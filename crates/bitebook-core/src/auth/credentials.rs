//! Persisted bearer credential.
//!
//! The token and its role tag are stored as one record so they are always
//! written and cleared together. The session manager is the only writer; the
//! API client only reads.

use std::fmt;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use keyring::Entry;
use serde::{Deserialize, Serialize};

use crate::models::Role;

/// Session file name in the cache directory
const SESSION_FILE: &str = "session.json";

/// Keyring service name
const SERVICE_NAME: &str = "bitebook";

/// Keyring account holding the serialized credential
const KEYRING_ACCOUNT: &str = "session";

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub token: String,
    pub role: Role,
}

impl Credential {
    pub fn new(token: impl Into<String>, role: Role) -> Self {
        Self {
            token: token.into(),
            role,
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"<redacted>")
            .field("role", &self.role)
            .finish()
    }
}

/// Synchronous, immediately consistent credential storage.
pub trait CredentialStore: Send + Sync {
    fn get(&self) -> Result<Option<Credential>>;
    fn set(&self, credential: &Credential) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// Process-local store, used by tests and short-lived CLI invocations.
#[derive(Default)]
pub struct MemoryStore {
    slot: Mutex<Option<Credential>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credential(credential: Credential) -> Self {
        Self {
            slot: Mutex::new(Some(credential)),
        }
    }
}

impl CredentialStore for MemoryStore {
    fn get(&self) -> Result<Option<Credential>> {
        let slot = self.slot.lock().map_err(|_| anyhow!("Credential store lock poisoned"))?;
        Ok(slot.clone())
    }

    fn set(&self, credential: &Credential) -> Result<()> {
        let mut slot = self.slot.lock().map_err(|_| anyhow!("Credential store lock poisoned"))?;
        *slot = Some(credential.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut slot = self.slot.lock().map_err(|_| anyhow!("Credential store lock poisoned"))?;
        *slot = None;
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionRecord {
    #[serde(flatten)]
    credential: Credential,
    saved_at: DateTime<Utc>,
}

/// JSON file under the cache directory.
pub struct FileStore {
    cache_dir: PathBuf,
}

impl FileStore {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    pub fn path(&self) -> PathBuf {
        self.cache_dir.join(SESSION_FILE)
    }
}

impl CredentialStore for FileStore {
    fn get(&self) -> Result<Option<Credential>> {
        let path = self.path();
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path).context("Failed to read session file")?;
        let record: SessionRecord =
            serde_json::from_str(&contents).context("Failed to parse session file")?;
        Ok(Some(record.credential))
    }

    fn set(&self, credential: &Credential) -> Result<()> {
        let path = self.path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let record = SessionRecord {
            credential: credential.clone(),
            saved_at: Utc::now(),
        };
        let contents = serde_json::to_string_pretty(&record)?;
        std::fs::write(path, contents).context("Failed to write session file")?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let path = self.path();
        if path.exists() {
            std::fs::remove_file(path).context("Failed to remove session file")?;
        }
        Ok(())
    }
}

/// OS keychain entry holding the serialized credential.
pub struct KeyringStore {
    service: String,
}

impl KeyringStore {
    pub fn new() -> Self {
        Self {
            service: SERVICE_NAME.to_string(),
        }
    }

    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self) -> Result<Entry> {
        Entry::new(&self.service, KEYRING_ACCOUNT).context("Failed to create keyring entry")
    }
}

impl Default for KeyringStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore for KeyringStore {
    fn get(&self) -> Result<Option<Credential>> {
        match self.entry()?.get_password() {
            Ok(secret) => {
                let credential = serde_json::from_str(&secret)
                    .context("Failed to parse credential from keychain")?;
                Ok(Some(credential))
            }
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e).context("Failed to retrieve credential from keychain"),
        }
    }

    fn set(&self, credential: &Credential) -> Result<()> {
        let secret = serde_json::to_string(credential)?;
        self.entry()?
            .set_password(&secret)
            .context("Failed to store credential in keychain")?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete credential from keychain"),
        }
    }
}

/// The role tag currently persisted, re-read on demand so a display can
/// re-sync after another process changed the session.
pub fn stored_role(store: &dyn CredentialStore) -> Option<Role> {
    store.get().ok().flatten().map(|c| c.role)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_set_get_clear() {
        let store = MemoryStore::new();
        assert!(store.get().unwrap().is_none());

        store.set(&Credential::new("tok", Role::User)).unwrap();
        assert_eq!(store.get().unwrap(), Some(Credential::new("tok", Role::User)));
        assert_eq!(stored_role(&store), Some(Role::User));

        store.clear().unwrap();
        assert!(store.get().unwrap().is_none());
        assert_eq!(stored_role(&store), None);
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested"));
        assert!(store.get().unwrap().is_none());

        store.set(&Credential::new("abc", Role::Restaurant)).unwrap();
        assert!(store.path().exists());
        let loaded = store.get().unwrap().unwrap();
        assert_eq!(loaded.role, Role::Restaurant);
        assert_eq!(loaded.token, "abc");

        store.clear().unwrap();
        assert!(!store.path().exists());
        // Clearing twice is fine
        store.clear().unwrap();
    }

    #[test]
    fn test_file_store_corrupt_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf());
        std::fs::write(store.path(), "not json").unwrap();
        assert!(store.get().is_err());
    }

    #[test]
    #[ignore = "needs an OS keychain; run with --ignored"]
    fn test_keyring_store_round_trip() {
        let store = KeyringStore::with_service("bitebook-test");
        store.clear().unwrap();
        assert!(store.get().unwrap().is_none());

        store.set(&Credential::new("kr-token", Role::Admin)).unwrap();
        // A fresh handle must see what the first one wrote
        let reopened = KeyringStore::with_service("bitebook-test");
        assert_eq!(reopened.get().unwrap(), Some(Credential::new("kr-token", Role::Admin)));

        reopened.clear().unwrap();
        assert!(store.get().unwrap().is_none());
    }

    #[test]
    fn test_credential_debug_redacts_token() {
        let debug = format!("{:?}", Credential::new("super-secret", Role::Admin));
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("Admin"));
    }
}
