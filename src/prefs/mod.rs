//! Durable key/value preferences.
//!
//! Reads are synchronous against an in-memory document. Writes update that
//! document first and persist best-effort, so the running session never
//! depends on storage succeeding.

pub mod document;
pub mod file;
pub mod mapping;

pub use document::PreferenceDocument;
pub use file::JsonFilePreferenceStore;

use serde_json::{Map, Value};
use std::sync::{Mutex, MutexGuard};

pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Option<Value>;

    fn get_or(&self, key: &str, default: Value) -> Value {
        self.get(key).unwrap_or(default)
    }

    /// Fire-and-forget write.
    fn set(&self, key: &str, value: Value);

    fn remove(&self, key: &str) -> bool;

    fn remove_many(&self, keys: &[&str]) -> usize {
        keys.iter().filter(|key| self.remove(key)).count()
    }

    /// Replace every preference, rejecting a stale `expected_version`.
    fn replace_all(
        &self,
        preferences: Map<String, Value>,
        expected_version: Option<u64>,
    ) -> crate::error::Result<u64>;

    /// Deep-merge `updates` into the stored tree.
    fn merge(
        &self,
        updates: Map<String, Value>,
        expected_version: Option<u64>,
    ) -> crate::error::Result<u64>;

    fn version(&self) -> u64;

    /// Blocking flush to durable storage.
    fn force_sync(&self) -> anyhow::Result<()>;
}

pub(crate) fn lock(doc: &Mutex<PreferenceDocument>) -> MutexGuard<'_, PreferenceDocument> {
    doc.lock().unwrap_or_else(|e| e.into_inner())
}

/// Preferences kept in memory only.
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    doc: Mutex<PreferenceDocument>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> PreferenceDocument {
        lock(&self.doc).clone()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> Option<Value> {
        lock(&self.doc).get(key).cloned()
    }

    fn set(&self, key: &str, value: Value) {
        lock(&self.doc).set(key, value);
    }

    fn remove(&self, key: &str) -> bool {
        lock(&self.doc).remove(key)
    }

    fn replace_all(
        &self,
        preferences: Map<String, Value>,
        expected_version: Option<u64>,
    ) -> crate::error::Result<u64> {
        lock(&self.doc).replace(preferences, expected_version)
    }

    fn merge(
        &self,
        updates: Map<String, Value>,
        expected_version: Option<u64>,
    ) -> crate::error::Result<u64> {
        lock(&self.doc).merge(updates, expected_version)
    }

    fn version(&self) -> u64 {
        lock(&self.doc).version
    }

    fn force_sync(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
