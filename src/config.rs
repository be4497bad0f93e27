use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::persistence::app_config_dir;

const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub(crate) struct LocatorConfig {
    /// Popup width in cells.
    pub(crate) popup_width: u16,
    /// Popup height in cells, borders included.
    pub(crate) popup_height: u16,
    pub(crate) case_sensitive: bool,
    pub(crate) max_suggestions: Option<usize>,
    pub(crate) show_icons: bool,
    /// Directory names skipped while walking a project directory.
    pub(crate) ignore_dirs: Vec<String>,
    pub(crate) theme: Option<String>,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            popup_width: 60,
            popup_height: 12,
            case_sensitive: true,
            max_suggestions: None,
            show_icons: true,
            ignore_dirs: vec!["target".to_string(), "node_modules".to_string()],
            theme: None,
        }
    }
}

pub(crate) fn config_file_path() -> Option<PathBuf> {
    app_config_dir().map(|dir| dir.join(CONFIG_FILE_NAME))
}

pub(crate) fn read_config_from(path: &Path) -> LocatorConfig {
    let Ok(raw) = fs::read_to_string(path) else {
        return LocatorConfig::default();
    };
    match serde_json::from_str::<LocatorConfig>(&raw) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(path = %path.display(), %err, "invalid config, using defaults");
            LocatorConfig::default()
        }
    }
}

pub(crate) fn load_config() -> LocatorConfig {
    match config_file_path() {
        Some(path) => read_config_from(&path),
        None => LocatorConfig::default(),
    }
}

#[cfg(test)]
mod config_tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: LocatorConfig =
            serde_json::from_str(r#"{"popup_height": 20, "case_sensitive": false}"#).unwrap();
        assert_eq!(config.popup_height, 20);
        assert!(!config.case_sensitive);
        assert_eq!(config.popup_width, 60);
        assert_eq!(config.ignore_dirs, vec!["target", "node_modules"]);
    }

    #[test]
    fn test_read_config_from_missing_or_invalid() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            read_config_from(&dir.path().join("absent.json")),
            LocatorConfig::default()
        );
        let bad = dir.path().join("config.json");
        fs::write(&bad, r#"{"popup_width": "wide"}"#).unwrap();
        assert_eq!(read_config_from(&bad), LocatorConfig::default());
    }

    #[test]
    fn test_read_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"max_suggestions": 5, "ignore_dirs": ["build"]}"#).unwrap();
        let config = read_config_from(&path);
        assert_eq!(config.max_suggestions, Some(5));
        assert_eq!(config.ignore_dirs, vec!["build"]);
        assert!(config.show_icons);
    }
}
