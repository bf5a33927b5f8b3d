//! UI session gate.
//!
//! A single [`Session`] is built at startup and handed to every page. It is a
//! convenience gate over a persisted flag, not an access-control boundary.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

pub const AUTH_KEY: &str = "mission-control-auth";
const AUTH_VALUE: &str = "true";

/// Key/value persistence for client-side session state.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> io::Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> io::Result<()>;
    fn remove(&self, key: &str) -> io::Result<()>;
}

/// JSON object file, one string value per key.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> io::Result<BTreeMap<String, String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(s) if s.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(s) => serde_json::from_str(&s).or_else(|e| {
                tracing::warn!(
                    target: "mission.session",
                    path = %self.path.display(),
                    "ignoring unreadable session file: {e}"
                );
                Ok(BTreeMap::new())
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e),
        }
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let body = serde_json::to_string_pretty(map).map_err(io::Error::other)?;
        std::fs::write(&self.path, body)
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.read_map()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        let mut map = self.read_map()?;
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map)
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        let mut map = self.read_map()?;
        if map.remove(key).is_some() {
            self.write_map(&map)?;
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemorySessionStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        let values = self.values.lock().map_err(|_| poisoned())?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        let mut values = self.values.lock().map_err(|_| poisoned())?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        let mut values = self.values.lock().map_err(|_| poisoned())?;
        values.remove(key);
        Ok(())
    }
}

fn poisoned() -> io::Error {
    io::Error::other("session store lock poisoned")
}

pub struct Session {
    store: Box<dyn SessionStore>,
    authenticated: AtomicBool,
}

impl Session {
    /// Reads the persisted flag once; later checks use the cached value.
    pub fn open(store: Box<dyn SessionStore>) -> io::Result<Self> {
        let authenticated = store.get(AUTH_KEY)?.as_deref() == Some(AUTH_VALUE);
        tracing::debug!(target: "mission.session", authenticated, "session opened");
        Ok(Self {
            store,
            authenticated: AtomicBool::new(authenticated),
        })
    }

    pub fn from_file(path: impl Into<PathBuf>) -> io::Result<Self> {
        Self::open(Box::new(FileSessionStore::new(path)))
    }

    pub fn in_memory() -> Self {
        Self {
            store: Box::new(MemorySessionStore::default()),
            authenticated: AtomicBool::new(false),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::SeqCst)
    }

    pub fn login(&self) -> io::Result<()> {
        self.store.set(AUTH_KEY, AUTH_VALUE)?;
        self.authenticated.store(true, Ordering::SeqCst);
        tracing::info!(target: "mission.session", "logged in");
        Ok(())
    }

    pub fn logout(&self) -> io::Result<()> {
        self.store.remove(AUTH_KEY)?;
        self.authenticated.store(false, Ordering::SeqCst);
        tracing::info!(target: "mission.session", "logged out");
        Ok(())
    }
}
