use anyhow::Context;
use std::path::{Path, PathBuf};

/// Template written when the preference file does not exist yet.
pub const EMPTY_PREFERENCES: &str = "{\n  \"version\": 0,\n  \"updated_at\": null,\n  \"preferences\": {}\n}\n";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigFileResult {
    Opened { path: PathBuf },
    Created { path: PathBuf },
}

impl ConfigFileResult {
    pub fn path(&self) -> &Path {
        match self {
            ConfigFileResult::Opened { path } | ConfigFileResult::Created { path } => path,
        }
    }

    pub fn into_path(self) -> PathBuf {
        match self {
            ConfigFileResult::Opened { path } | ConfigFileResult::Created { path } => path,
        }
    }
}

pub struct ConfigFileSpec<'a> {
    pub label: &'a str,
    pub relative_path: &'a str,
    pub default_contents: &'a str,
}

impl<'a> ConfigFileSpec<'a> {
    pub const fn new(label: &'a str, relative_path: &'a str, default_contents: &'a str) -> Self {
        Self {
            label,
            relative_path,
            default_contents,
        }
    }
}

/// Absolute `relative_path` values are used as-is.
pub fn resolve_config_path(settings_path: &Path, spec: &ConfigFileSpec<'_>) -> PathBuf {
    let base_dir = settings_path.parent().unwrap_or_else(|| Path::new("."));
    base_dir.join(spec.relative_path)
}

pub fn ensure_config_file(
    settings_path: &Path,
    spec: &ConfigFileSpec<'_>,
) -> anyhow::Result<ConfigFileResult> {
    let path = resolve_config_path(settings_path, spec);
    if path.exists() {
        tracing::debug!(label = spec.label, path = %path.display(), "config file opened");
        return Ok(ConfigFileResult::Opened { path });
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create {} folder {}", spec.label, parent.display()))?;
    }
    std::fs::write(&path, spec.default_contents)
        .with_context(|| format!("write {} file {}", spec.label, path.display()))?;
    tracing::info!(label = spec.label, path = %path.display(), "config file created");
    Ok(ConfigFileResult::Created { path })
}

#[cfg(test)]
mod tests {
    use super::{ensure_config_file, resolve_config_path, ConfigFileResult, ConfigFileSpec};
    use crate::prefs::PreferenceDocument;
    use std::path::Path;

    #[test]
    fn resolves_path_relative_to_settings_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        let settings_path = dir.path().join("settings.json");
        let spec = ConfigFileSpec::new("preferences", "state/prefs.json", "{}");
        let resolved = resolve_config_path(&settings_path, &spec);
        assert_eq!(
            resolved,
            dir.path().join(Path::new("state").join("prefs.json"))
        );
    }

    #[test]
    fn creates_and_reuses_preference_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let settings_path = dir.path().join("settings.json");
        let spec = ConfigFileSpec::new("preferences", "prefs.json", super::EMPTY_PREFERENCES);

        let created = ensure_config_file(&settings_path, &spec).expect("create file");
        let path = match created {
            ConfigFileResult::Created { path } => path,
            ConfigFileResult::Opened { .. } => panic!("expected create"),
        };
        let contents = std::fs::read_to_string(&path).expect("read file");
        let doc: PreferenceDocument = serde_json::from_str(&contents).expect("template parses");
        assert_eq!(doc, PreferenceDocument::default());

        let opened = ensure_config_file(&settings_path, &spec).expect("open file");
        assert_eq!(opened, ConfigFileResult::Opened { path });
    }
}
