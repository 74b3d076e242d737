//! Session state: the auth token and the cached user profile.
//!
//! Both values live in a durable key-value [`SessionStore`] under fixed keys
//! and are only ever written or removed together. The client reads the token
//! on every request; only login, logout and the 401 teardown write it.
//!
//! Concurrent writers are last-writer-wins. A login racing a teardown from a
//! stale in-flight request can end either way; both outcomes leave the two
//! keys consistent with each other.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use pantry_core::models::UserProfile;
use secrecy::SecretString;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

/// Storage key for the bearer token.
pub const TOKEN_KEY: &str = "auth_token";

/// Storage key for the serialized user profile.
pub const USER_KEY: &str = "user_data";

/// Errors raised by a session store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file is not a JSON object of strings.
    #[error("Corrupt session data: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Durable string key-value storage.
///
/// `set_many` and `remove_many` must apply all entries in one step so the
/// token and profile never diverge.
pub trait SessionStore: Send + Sync {
    /// Read one entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write several entries at once.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StoreError>;

    /// Remove several entries at once. Removing absent keys is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn remove_many(&self, keys: &[&str]) -> Result<(), StoreError>;

    /// Write one entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.set_many(&[(key, value)])
    }

    /// Remove one entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.remove_many(&[key])
    }
}

// =============================================================================
// Stores
// =============================================================================

/// In-process store, for tests and hosts without durable storage.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the store holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StoreError> {
        let mut map = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        for (key, value) in entries {
            map.insert((*key).to_string(), (*value).to_string());
        }
        Ok(())
    }

    fn remove_many(&self, keys: &[&str]) -> Result<(), StoreError> {
        let mut map = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        for key in keys {
            map.remove(*key);
        }
        Ok(())
    }
}

/// JSON-file store.
///
/// The file holds one JSON object of string entries. Every write replaces the
/// whole file through a temporary sibling and a rename, so readers see either
/// the old or the new pair of values.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Store backed by `path`. The file and its directory are created on the
    /// first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<HashMap<String, String>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(HashMap::new()),
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Read for modification; a corrupt file is replaced rather than fatal.
    fn read_map_for_write(&self) -> Result<HashMap<String, String>, StoreError> {
        match self.read_map() {
            Err(StoreError::Corrupt(e)) => {
                warn!(path = %self.path.display(), error = %e, "Replacing corrupt session file");
                Ok(HashMap::new())
            }
            other => other,
        }
    }

    fn write_map(&self, map: &HashMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let tmp = self.path.with_extension("tmp");
        {
            let mut options = fs::OpenOptions::new();
            options.write(true).create(true).truncate(true);
            #[cfg(unix)]
            {
                use std::os::unix::fs::OpenOptionsExt;
                options.mode(0o600);
            }
            let mut file = options.open(&tmp)?;
            file.write_all(&serde_json::to_vec_pretty(map)?)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl SessionStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read_map()?.remove(key))
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut map = self.read_map_for_write()?;
        for (key, value) in entries {
            map.insert((*key).to_string(), (*value).to_string());
        }
        self.write_map(&map)
    }

    fn remove_many(&self, keys: &[&str]) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut map = self.read_map_for_write()?;
        let before = map.len();
        for key in keys {
            map.remove(*key);
        }
        if map.len() == before && !self.path.exists() {
            return Ok(());
        }
        self.write_map(&map)
    }
}

// =============================================================================
// Session
// =============================================================================

/// The client's view of the persisted session.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn SessionStore>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Wrap a store.
    #[must_use]
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// The stored bearer token, if any.
    ///
    /// An unreadable store is treated as "no token" so requests still go out
    /// unauthenticated instead of failing locally.
    #[must_use]
    pub fn token(&self) -> Option<SecretString> {
        match self.store.get(TOKEN_KEY) {
            Ok(Some(token)) if !token.is_empty() => Some(SecretString::from(token)),
            Ok(_) => None,
            Err(e) => {
                warn!(error = %e, "Failed to read auth token");
                None
            }
        }
    }

    /// Token presence only; no expiry or signature check.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// The cached profile exactly as stored.
    #[must_use]
    pub fn profile_raw(&self) -> Option<String> {
        self.store.get(USER_KEY).ok().flatten()
    }

    /// The cached profile, or the empty profile when absent or unreadable.
    #[must_use]
    pub fn user_data(&self) -> UserProfile {
        self.profile_raw()
            .and_then(|raw| {
                serde_json::from_str(&raw)
                    .map_err(|e| debug!(error = %e, "Cached user profile is unreadable"))
                    .ok()
            })
            .unwrap_or_default()
    }

    /// Persist a token and its user record together.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn set(&self, token: &str, user: &Value) -> Result<(), StoreError> {
        let user_json = serde_json::to_string(user)?;
        self.store
            .set_many(&[(TOKEN_KEY, token), (USER_KEY, user_json.as_str())])
    }

    /// Remove both entries. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn clear(&self) -> Result<(), StoreError> {
        self.store.remove_many(&[TOKEN_KEY, USER_KEY])
    }
}

// =============================================================================
// Session Expiry
// =============================================================================

/// Host policy for a session the backend rejected.
///
/// Invoked once per 401 response, after the session has been cleared and
/// before the error reaches the caller. Implementations must not panic.
pub trait SessionExpiredHandler: Send + Sync {
    /// The session was torn down; send the user to `login_path`.
    fn session_expired(&self, login_path: &str);
}

impl<F> SessionExpiredHandler for F
where
    F: Fn(&str) + Send + Sync,
{
    fn session_expired(&self, login_path: &str) {
        self(login_path);
    }
}

/// Default handler: logs where the user should log in again.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogRedirect;

impl SessionExpiredHandler for LogRedirect {
    fn session_expired(&self, login_path: &str) {
        warn!(login_path = %login_path, "Session expired, redirecting to login");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use secrecy::ExposeSecret;
    use serde_json::json;

    use super::*;

    fn temp_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("pantry-session-{}", uuid::Uuid::new_v4()))
            .join("session.json")
    }

    #[test]
    fn test_session_set_writes_both_keys() {
        let store = Arc::new(MemoryStore::new());
        let session = Session::new(store.clone());

        session
            .set("t1", &json!({"id": 1, "email": "a@b.com", "role": "admin", "name": "Ana"}))
            .unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(session.token().unwrap().expose_secret(), "t1");
        let profile = session.user_data();
        assert_eq!(profile.email.as_deref(), Some("a@b.com"));
        assert_eq!(profile.name.as_deref(), Some("Ana"));
    }

    #[test]
    fn test_clear_is_idempotent() {
        let store = Arc::new(MemoryStore::new());
        let session = Session::new(store.clone());

        session.clear().unwrap();
        session.set("t1", &json!({"id": 1})).unwrap();
        session.clear().unwrap();
        session.clear().unwrap();

        assert!(store.is_empty());
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_user_data_safe_default() {
        let store = Arc::new(MemoryStore::new());
        let session = Session::new(store.clone());
        assert!(session.user_data().is_empty());

        store.set(USER_KEY, "{not json").unwrap();
        assert!(session.user_data().is_empty());

        store.set(USER_KEY, "null").unwrap();
        assert!(session.user_data().is_empty());
    }

    #[test]
    fn test_empty_token_is_not_authenticated() {
        let store = Arc::new(MemoryStore::new());
        store.set(TOKEN_KEY, "").unwrap();
        assert!(!Session::new(store).is_authenticated());
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let path = temp_path();
        Session::new(Arc::new(FileStore::new(&path)))
            .set("persisted", &json!({"id": 7}))
            .unwrap();

        let reopened = Session::new(Arc::new(FileStore::new(&path)));
        assert_eq!(reopened.token().unwrap().expose_secret(), "persisted");
        assert_eq!(reopened.user_data().id.map(|id| id.as_i64()), Some(7));

        reopened.clear().unwrap();
        assert!(!Session::new(Arc::new(FileStore::new(&path))).is_authenticated());
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_file_store_clear_without_file_creates_nothing() {
        let path = temp_path();
        let store = FileStore::new(&path);
        store.remove_many(&[TOKEN_KEY, USER_KEY]).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_file_store_corrupt_file() {
        let path = temp_path();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "][").unwrap();

        let store = Arc::new(FileStore::new(&path));
        assert!(matches!(store.get(TOKEN_KEY), Err(StoreError::Corrupt(_))));

        let session = Session::new(store.clone());
        assert!(session.token().is_none());
        assert!(session.user_data().is_empty());

        session.set("fresh", &json!({"id": 2})).unwrap();
        assert_eq!(session.token().unwrap().expose_secret(), "fresh");
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn test_file_store_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let path = temp_path();
        FileStore::new(&path).set(TOKEN_KEY, "t").unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o077, 0);
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_closure_handler() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let handler = move |path: &str| {
            assert_eq!(path, "/login");
            seen.fetch_add(1, Ordering::SeqCst);
        };
        handler.session_expired("/login");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
