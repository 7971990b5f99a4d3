use crate::common::config_files::{self, ConfigFileSpec};
use crate::naming::DEFAULT_MAX_NAMES;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// What an auto-cycle advance does while the working layout has unsaved edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DirtyPolicy {
    /// Raise the unsaved-changes warning, like a manual click would.
    Prompt,
    /// Load the next preset anyway.
    Discard,
    /// Leave the session alone until the next tick.
    #[default]
    Skip,
}

impl std::fmt::Display for DirtyPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DirtyPolicy::Prompt => write!(f, "prompt"),
            DirtyPolicy::Discard => write!(f, "discard"),
            DirtyPolicy::Skip => write!(f, "skip"),
        }
    }
}

fn default_preferences_file() -> String {
    "preferences.json".into()
}

fn default_name_max_widgets() -> usize {
    DEFAULT_MAX_NAMES
}

fn default_min_interval_secs() -> u64 {
    5
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub debug_logging: bool,
    #[serde(default)]
    pub log_file: Option<String>,
    /// Relative paths resolve against the settings file's folder.
    #[serde(default = "default_preferences_file")]
    pub preferences_file: String,
    #[serde(default = "default_name_max_widgets")]
    pub name_max_widgets: usize,
    #[serde(default)]
    pub auto_cycle_dirty_policy: DirtyPolicy,
    #[serde(default = "default_min_interval_secs")]
    pub min_interval_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug_logging: false,
            log_file: None,
            preferences_file: default_preferences_file(),
            name_max_widgets: default_name_max_widgets(),
            auto_cycle_dirty_policy: DirtyPolicy::default(),
            min_interval_secs: default_min_interval_secs(),
        }
    }
}

impl Settings {
    /// Missing or empty files yield the defaults.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).unwrap_or_default();
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(&content)
            .with_context(|| format!("deserialize settings file {}", path.display()))
    }

    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).context("serialize settings")?;
        std::fs::write(path, json)
            .with_context(|| format!("write settings file {}", path.display()))?;
        Ok(())
    }

    fn preferences_spec(&self) -> ConfigFileSpec<'_> {
        ConfigFileSpec::new(
            "preferences",
            &self.preferences_file,
            config_files::EMPTY_PREFERENCES,
        )
    }

    pub fn preferences_path(&self, settings_path: &Path) -> PathBuf {
        config_files::resolve_config_path(settings_path, &self.preferences_spec())
    }

    /// Resolve the preference file and create it with an empty document when
    /// it does not exist yet.
    pub fn ensure_preferences_file(&self, settings_path: &Path) -> anyhow::Result<PathBuf> {
        let result = config_files::ensure_config_file(settings_path, &self.preferences_spec())?;
        Ok(result.into_path())
    }

    pub fn log_path(&self, settings_path: &Path) -> Option<PathBuf> {
        let file = self.log_file.as_deref()?.trim();
        if file.is_empty() {
            return None;
        }
        let base = settings_path.parent().unwrap_or_else(|| Path::new("."));
        Some(base.join(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"auto_cycle_dirty_policy": "prompt"}"#).unwrap();
        assert_eq!(settings.auto_cycle_dirty_policy, DirtyPolicy::Prompt);
        assert_eq!(settings.preferences_file, "preferences.json");
        assert_eq!(settings.name_max_widgets, 3);
        assert_eq!(settings.min_interval_secs, 5);
    }

    #[test]
    fn log_path_is_relative_to_settings() {
        let settings = Settings {
            log_file: Some("logs/presets.log".into()),
            ..Settings::default()
        };
        let base = Path::new("/etc/dash/settings.json");
        assert_eq!(
            settings.log_path(base),
            Some(PathBuf::from("/etc/dash/logs/presets.log"))
        );
        assert_eq!(Settings::default().log_path(base), None);
    }
}
