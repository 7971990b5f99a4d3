use super::{lock, PreferenceDocument, PreferenceStore};
use anyhow::Context;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Preferences persisted as one pretty-printed JSON document.
#[derive(Debug)]
pub struct JsonFilePreferenceStore {
    path: PathBuf,
    doc: Mutex<PreferenceDocument>,
}

impl JsonFilePreferenceStore {
    /// Open `path`. A missing or blank file starts an empty document; a
    /// corrupt one is an error.
    pub fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let doc = Self::read(&path)?;
        tracing::debug!(path = %path.display(), version = doc.version, "preferences opened");
        Ok(Self {
            path,
            doc: Mutex::new(doc),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(path: &Path) -> anyhow::Result<PreferenceDocument> {
        if !path.exists() {
            return Ok(PreferenceDocument::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read preferences file {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(PreferenceDocument::default());
        }
        serde_json::from_str(&content)
            .with_context(|| format!("deserialize preferences file {}", path.display()))
    }

    fn write(path: &Path, doc: &PreferenceDocument) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create preferences folder {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(doc).context("serialize preferences")?;
        std::fs::write(path, json)
            .with_context(|| format!("write preferences file {}", path.display()))
    }

    fn persist_best_effort(&self, doc: &PreferenceDocument) {
        if let Err(err) = Self::write(&self.path, doc) {
            tracing::warn!(error = %format!("{err:#}"), "preference write failed; keeping in-memory state");
        }
    }
}

impl PreferenceStore for JsonFilePreferenceStore {
    fn get(&self, key: &str) -> Option<Value> {
        lock(&self.doc).get(key).cloned()
    }

    fn set(&self, key: &str, value: Value) {
        let mut doc = lock(&self.doc);
        doc.set(key, value);
        self.persist_best_effort(&doc);
    }

    fn remove(&self, key: &str) -> bool {
        let mut doc = lock(&self.doc);
        let removed = doc.remove(key);
        if removed {
            self.persist_best_effort(&doc);
        }
        removed
    }

    fn replace_all(
        &self,
        preferences: Map<String, Value>,
        expected_version: Option<u64>,
    ) -> crate::error::Result<u64> {
        let mut doc = lock(&self.doc);
        let version = doc.replace(preferences, expected_version)?;
        self.persist_best_effort(&doc);
        Ok(version)
    }

    fn merge(
        &self,
        updates: Map<String, Value>,
        expected_version: Option<u64>,
    ) -> crate::error::Result<u64> {
        let mut doc = lock(&self.doc);
        let version = doc.merge(updates, expected_version)?;
        self.persist_best_effort(&doc);
        Ok(version)
    }

    fn version(&self) -> u64 {
        lock(&self.doc).version
    }

    fn force_sync(&self) -> anyhow::Result<()> {
        let doc = lock(&self.doc);
        Self::write(&self.path, &doc)
    }
}
