use crate::error::{PresetError, Result};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const KEY_SEPARATOR: char = '.';

/// Versioned preference tree. Keys use dot notation for nesting
/// (`dashboard.presets.slot_0`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreferenceDocument {
    #[serde(default)]
    pub version: u64,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub preferences: Map<String, Value>,
}

fn merge_value(base: &mut Value, updates: Value) {
    match (base, updates) {
        (Value::Object(a), Value::Object(b)) => {
            for (k, v) in b {
                merge_value(a.entry(k).or_insert(Value::Null), v);
            }
        }
        (slot, v) => *slot = v,
    }
}

impl PreferenceDocument {
    pub fn get(&self, key: &str) -> Option<&Value> {
        let mut parts = key.split(KEY_SEPARATOR);
        let first = parts.next()?;
        let mut current = self.preferences.get(first)?;
        for part in parts {
            current = current.as_object()?.get(part)?;
        }
        Some(current)
    }

    /// Insert at a dotted key, replacing non-object intermediates.
    pub fn set(&mut self, key: &str, value: Value) {
        let parts: Vec<&str> = key.split(KEY_SEPARATOR).collect();
        let Some((last, parents)) = parts.split_last() else {
            return;
        };
        let mut map = &mut self.preferences;
        for part in parents {
            let entry = map
                .entry(part.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            let Value::Object(inner) = entry else {
                return;
            };
            map = inner;
        }
        map.insert(last.to_string(), value);
        self.touch();
    }

    /// Delete a dotted key. Parent objects are left in place.
    pub fn remove(&mut self, key: &str) -> bool {
        let parts: Vec<&str> = key.split(KEY_SEPARATOR).collect();
        let Some((last, parents)) = parts.split_last() else {
            return false;
        };
        let mut map = &mut self.preferences;
        for part in parents {
            map = match map.get_mut(*part) {
                Some(Value::Object(inner)) => inner,
                _ => return false,
            };
        }
        let removed = map.remove(*last).is_some();
        if removed {
            self.touch();
        }
        removed
    }

    /// Replace the whole tree. A stale `expected_version` is rejected.
    pub fn replace(
        &mut self,
        preferences: Map<String, Value>,
        expected_version: Option<u64>,
    ) -> Result<u64> {
        self.check_version(expected_version)?;
        self.preferences = preferences;
        self.touch();
        Ok(self.version)
    }

    /// Deep-merge `updates` into the tree. A stale `expected_version` is rejected.
    pub fn merge(&mut self, updates: Map<String, Value>, expected_version: Option<u64>) -> Result<u64> {
        self.check_version(expected_version)?;
        let mut root = Value::Object(std::mem::take(&mut self.preferences));
        merge_value(&mut root, Value::Object(updates));
        if let Value::Object(map) = root {
            self.preferences = map;
        }
        self.touch();
        Ok(self.version)
    }

    fn check_version(&self, expected: Option<u64>) -> Result<()> {
        match expected {
            Some(expected) if expected != self.version => Err(PresetError::VersionConflict {
                expected,
                actual: self.version,
            }),
            _ => Ok(()),
        }
    }

    fn touch(&mut self) {
        self.version += 1;
        self.updated_at = Some(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true));
    }
}
