use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

use super::paths::settings_file_path;
use super::Settings;

/// Load a YAML configuration file from disk
pub fn load_yaml<T: DeserializeOwned>(path: impl AsRef<Path>) -> anyhow::Result<T> {
    let content = std::fs::read_to_string(path)?;
    parse_yaml(&content)
}

/// Parse YAML from string
pub fn parse_yaml<T: DeserializeOwned>(content: &str) -> anyhow::Result<T> {
    let config: T = serde_yaml::from_str(content)?;
    Ok(config)
}

/// Where the settings came from. Logged once logging is up.
#[derive(Debug)]
pub enum LoadOutcome {
    Loaded(PathBuf),
    Missing(PathBuf),
    Invalid(PathBuf, String),
}

impl LoadOutcome {
    pub fn log(&self) {
        match self {
            Self::Loaded(path) => tracing::info!("Loaded settings from {:?}", path),
            Self::Missing(path) => {
                tracing::debug!("No settings file at {:?}, using defaults", path)
            }
            Self::Invalid(path, e) => {
                tracing::warn!("Failed to parse {:?}: {}, using defaults", path, e)
            }
        }
    }
}

/// Load settings from `path` (or the default location).
/// Returns defaults if the file doesn't exist or is invalid.
pub fn load_settings(path: Option<&Path>) -> (Settings, LoadOutcome) {
    let path = path.map(Path::to_path_buf).unwrap_or_else(settings_file_path);

    if !path.exists() {
        return (Settings::default(), LoadOutcome::Missing(path));
    }

    match load_yaml::<Settings>(&path) {
        Ok(settings) => (settings, LoadOutcome::Loaded(path)),
        Err(e) => (Settings::default(), LoadOutcome::Invalid(path, e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("deskrelay-{}-{name}", std::process::id()));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_settings_from_file() {
        let path = temp_file(
            "valid.yaml",
            "telemetry:\n  endpoint: http://collector:9000/log\ninput:\n  dry_run: true\n",
        );
        let (settings, outcome) = load_settings(Some(&path));
        std::fs::remove_file(&path).ok();

        assert!(matches!(outcome, LoadOutcome::Loaded(_)));
        assert_eq!(settings.telemetry.endpoint, "http://collector:9000/log");
        assert!(settings.telemetry.enabled);
        assert!(settings.input.dry_run);
    }

    #[test]
    fn test_missing_and_invalid_fall_back_to_defaults() {
        let missing = std::env::temp_dir().join("deskrelay-does-not-exist.yaml");
        let (settings, outcome) = load_settings(Some(&missing));
        assert!(matches!(outcome, LoadOutcome::Missing(_)));
        assert_eq!(settings.logging.level, "info");

        let path = temp_file("invalid.yaml", "telemetry: 42\n");
        let (settings, outcome) = load_settings(Some(&path));
        std::fs::remove_file(&path).ok();
        assert!(matches!(outcome, LoadOutcome::Invalid(..)));
        assert_eq!(settings.telemetry.timeout_sec, 5);
    }
}
