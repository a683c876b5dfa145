//! Persisted session store with TTL semantics.
//!
//! The authorization flow keeps three values outside process memory: the
//! PKCE code verifier, the access token and the refresh token, each under a
//! well-known key with an independent expiry. This module abstracts that
//! storage behind the [`SessionStore`] trait so the state machine can run
//! against any backend: an in-memory map for tests and embedding, or a
//! JSON file in the local data directory for the CLI.

use std::{collections::HashMap, path::PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Scoped key/value storage with per-entry TTL.
///
/// A TTL of zero or negative expires the entry immediately (delete).
/// `get` returns `None` for missing or expired entries and never fails;
/// callers treat absence as "re-initiate the flow", not as an error.
pub trait SessionStore {
    fn set(&mut self, key: &str, value: &str, ttl_seconds: i64);
    fn get(&self, key: &str) -> Option<String>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionEntry {
    value: String,
    expires_at: i64,
}

/// In-memory session store.
///
/// Entries expire against a wall clock that can be advanced manually with
/// [`advance_clock`](MemorySessionStore::advance_clock), which lets tests
/// simulate token expiry without waiting.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: HashMap<String, SessionEntry>,
    clock_offset: i64,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shifts this store's notion of "now" forward by the given number of
    /// seconds. Entries whose expiry falls inside the shift become absent.
    pub fn advance_clock(&mut self, seconds: i64) {
        self.clock_offset += seconds;
    }

    fn now(&self) -> i64 {
        Utc::now().timestamp() + self.clock_offset
    }
}

impl SessionStore for MemorySessionStore {
    fn set(&mut self, key: &str, value: &str, ttl_seconds: i64) {
        if ttl_seconds <= 0 {
            self.entries.remove(key);
            return;
        }

        self.entries.insert(
            key.to_string(),
            SessionEntry {
                value: value.to_string(),
                expires_at: self.now() + ttl_seconds,
            },
        );
    }

    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .get(key)
            .filter(|entry| entry.expires_at > self.now())
            .map(|entry| entry.value.clone())
    }
}

/// File-backed session store.
///
/// Keeps the entry map in memory and reads/writes it as pretty-printed
/// JSON under the platform's local data directory. Loading and persisting
/// are explicit async operations; the CLI loads once before driving the
/// state machine and persists once afterwards.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    entries: HashMap<String, SessionEntry>,
}

impl FileSessionStore {
    /// Creates a store over the default session file,
    /// `<data_local_dir>/sporauth/session.json`.
    pub fn new() -> Self {
        let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("sporauth/session.json");
        Self::with_path(path)
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self {
            path,
            entries: HashMap::new(),
        }
    }

    /// Reads the session file into memory. A missing file is not an error;
    /// the store simply starts empty.
    pub async fn load(&mut self) -> Result<(), String> {
        if !self.path.exists() {
            return Ok(());
        }

        let content = async_fs::read_to_string(&self.path)
            .await
            .map_err(|e| e.to_string())?;
        self.entries = serde_json::from_str(&content).map_err(|e| e.to_string())?;
        Ok(())
    }

    /// Writes the current entries to the session file, dropping entries
    /// that have already expired.
    pub async fn persist(&self) -> Result<(), String> {
        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent)
                .await
                .map_err(|e| e.to_string())?;
        }

        let now = Utc::now().timestamp();
        let live: HashMap<&String, &SessionEntry> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.expires_at > now)
            .collect();

        let json = serde_json::to_string_pretty(&live).map_err(|e| e.to_string())?;
        async_fs::write(&self.path, json)
            .await
            .map_err(|e| e.to_string())
    }
}

impl Default for FileSessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore for FileSessionStore {
    fn set(&mut self, key: &str, value: &str, ttl_seconds: i64) {
        if ttl_seconds <= 0 {
            self.entries.remove(key);
            return;
        }

        self.entries.insert(
            key.to_string(),
            SessionEntry {
                value: value.to_string(),
                expires_at: Utc::now().timestamp() + ttl_seconds,
            },
        );
    }

    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .get(key)
            .filter(|entry| entry.expires_at > Utc::now().timestamp())
            .map(|entry| entry.value.clone())
    }
}
