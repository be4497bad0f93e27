use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub(crate) const APP_DIR: &str = "locator";
const STATE_FILE_NAME: &str = "state.json";
const LOG_FILE_NAME: &str = "locator.log";

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub(crate) struct PersistedState {
    #[serde(default)]
    pub(crate) theme_name: Option<String>,
    #[serde(default)]
    pub(crate) last_query: Option<String>,
    #[serde(default)]
    pub(crate) last_opened: Option<String>,
}

/// Directory holding config, key bindings, state and the log file.
pub(crate) fn app_config_dir() -> Option<PathBuf> {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME")
        && !xdg.is_empty()
    {
        return Some(PathBuf::from(xdg).join(APP_DIR));
    }
    if let Ok(appdata) = std::env::var("APPDATA")
        && !appdata.is_empty()
    {
        return Some(PathBuf::from(appdata).join(APP_DIR));
    }
    std::env::var("HOME")
        .ok()
        .map(|home| PathBuf::from(home).join(".config").join(APP_DIR))
}

pub(crate) fn state_file_path() -> Option<PathBuf> {
    app_config_dir().map(|dir| dir.join(STATE_FILE_NAME))
}

pub(crate) fn log_file_path() -> Option<PathBuf> {
    app_config_dir().map(|dir| dir.join(LOG_FILE_NAME))
}

pub(crate) fn read_state_from(path: &Path) -> Option<PersistedState> {
    let raw = fs::read_to_string(path).ok()?;
    serde_json::from_str::<PersistedState>(&raw).ok()
}

pub(crate) fn write_state_to(path: &Path, state: &PersistedState) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let raw = serde_json::to_string_pretty(state)
        .map_err(|e| io::Error::other(format!("serialize state: {e}")))?;
    fs::write(path, raw)
}

pub(crate) fn load_persisted_state() -> Option<PersistedState> {
    read_state_from(&state_file_path()?)
}

pub(crate) fn save_persisted_state(state: &PersistedState) -> io::Result<()> {
    let Some(path) = state_file_path() else {
        return Ok(());
    };
    write_state_to(&path, state)
}

#[cfg(test)]
mod persistence_tests {
    use super::*;

    #[test]
    fn test_persisted_state_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");
        let state = PersistedState {
            theme_name: Some("Dusk".to_string()),
            last_query: Some("main".to_string()),
            last_opened: Some("src/main.cpp".to_string()),
        };
        write_state_to(&path, &state).unwrap();
        assert_eq!(read_state_from(&path), Some(state));
    }

    #[test]
    fn test_persisted_state_missing_fields_default() {
        let state: PersistedState = serde_json::from_str("{}").unwrap();
        assert_eq!(state, PersistedState::default());
    }

    #[test]
    fn test_read_state_from_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "not json").unwrap();
        assert!(read_state_from(&path).is_none());
        assert!(read_state_from(&dir.path().join("missing.json")).is_none());
    }
}
