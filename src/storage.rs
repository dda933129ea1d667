//! Durable client-side key-value storage and the session record kept in it.
//!
//! `KeyValueStore` plays the role of the browser's local storage: string keys, string values,
//! every write durable before it returns. `FileStore` keeps the map in a JSON file,
//! `MemoryStore` keeps it in memory for tests and one-shot runs.
//!
//! `SessionStore` layers the session record on top: the raw token under `authToken` and the
//! user profile as JSON under `user`.

use log::{debug, warn};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use crate::error::ClientError;
use crate::models::{Session, User};

pub const TOKEN_KEY: &str = "authToken";
pub const USER_KEY: &str = "user";

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), ClientError>;
    fn remove(&mut self, key: &str) -> Result<(), ClientError>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), ClientError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), ClientError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// A key-value store persisted as a flat JSON object.
/// The whole file is rewritten on every change.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Opens the store at `path`. A missing file is an empty store; it is created on first write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ClientError> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(contents) if contents.trim().is_empty() => BTreeMap::new(),
            Ok(contents) => serde_json::from_str(&contents).map_err(|e| {
                ClientError::Storage(format!("{} is not a valid store: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        debug!("Opened store {} ({} keys)", path.display(), entries.len());
        Ok(Self { path, entries })
    }

    fn flush(&self) -> Result<(), ClientError> {
        let contents = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.path, contents)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), ClientError> {
        self.entries.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<(), ClientError> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

/// The persisted session record.
#[derive(Debug)]
pub struct SessionStore<S> {
    store: S,
}

impl<S: KeyValueStore> SessionStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn token(&self) -> Option<String> {
        self.store.get(TOKEN_KEY).filter(|token| !token.is_empty())
    }

    pub fn has_session(&self) -> bool {
        self.token().is_some()
    }

    /// Reads the stored session. A missing or unreadable profile yields an empty `User`;
    /// only the token decides whether a session exists.
    pub fn load(&self) -> Option<Session> {
        let token = self.token()?;
        let user = match self.store.get(USER_KEY) {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!("Stored user profile is unreadable, ignoring it: {}", e);
                User::default()
            }),
            None => User::default(),
        };
        Some(Session { token, user })
    }

    pub fn save(&mut self, session: &Session) -> Result<(), ClientError> {
        self.store.set(TOKEN_KEY, &session.token)?;
        self.store.set(USER_KEY, &serde_json::to_string(&session.user)?)?;
        Ok(())
    }

    pub fn clear(&mut self) -> Result<(), ClientError> {
        self.store.remove(TOKEN_KEY)?;
        self.store.remove(USER_KEY)?;
        Ok(())
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn session() -> Session {
        Session {
            token: "abc123".to_string(),
            user: User {
                username: "alice".to_string(),
                email: "alice@example.com".to_string(),
            },
        }
    }

    #[test]
    fn test_session_round_trip_in_memory() {
        let mut sessions = SessionStore::new(MemoryStore::default());
        assert!(!sessions.has_session());
        assert_eq!(sessions.load(), None);

        sessions.save(&session()).unwrap();
        assert!(sessions.has_session());
        assert_eq!(sessions.store().get(TOKEN_KEY).as_deref(), Some("abc123"));
        assert_eq!(sessions.load(), Some(session()));

        sessions.clear().unwrap();
        assert!(!sessions.has_session());
        assert!(sessions.store().get(USER_KEY).is_none());
    }

    #[test]
    fn test_token_without_profile_is_still_a_session() {
        let mut store = MemoryStore::default();
        store.set(TOKEN_KEY, "abc123").unwrap();
        store.set(USER_KEY, "not json").unwrap();

        let sessions = SessionStore::new(store);
        let loaded = sessions.load().unwrap();
        assert_eq!(loaded.token, "abc123");
        assert_eq!(loaded.user, User::default());
    }

    #[test]
    fn test_empty_token_is_no_session() {
        let mut store = MemoryStore::default();
        store.set(TOKEN_KEY, "").unwrap();
        assert!(!SessionStore::new(store).has_session());
    }

    #[test]
    fn test_file_store_persists_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let mut sessions = SessionStore::new(FileStore::open(&path).unwrap());
        sessions.save(&session()).unwrap();
        drop(sessions);

        let reopened = SessionStore::new(FileStore::open(&path).unwrap());
        assert_eq!(reopened.load(), Some(session()));

        let mut reopened = reopened;
        reopened.clear().unwrap();
        let reopened = SessionStore::new(FileStore::open(&path).unwrap());
        assert!(!reopened.has_session());
    }

    #[test]
    fn test_file_store_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "[1, 2").unwrap();

        assert!(matches!(FileStore::open(&path), Err(ClientError::Storage(_))));
    }
}
