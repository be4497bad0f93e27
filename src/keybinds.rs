use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::{Deserialize, Serialize};

use crate::persistence::app_config_dir;

const KEYBINDS_FILE_NAME: &str = "keybinds.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum KeyAction {
    // Global
    Quit,
    FocusLocator,
    ToggleFocus,
    ReloadProject,
    NextTheme,
    Help,
    // Locator
    SelectAll,
    Paste,
    // Viewer
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    GoToStart,
    GoToEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum KeyScope {
    Global,
    Locator,
    Viewer,
}

impl KeyAction {
    pub(crate) fn scope(self) -> KeyScope {
        match self {
            KeyAction::Quit
            | KeyAction::FocusLocator
            | KeyAction::ToggleFocus
            | KeyAction::ReloadProject
            | KeyAction::NextTheme
            | KeyAction::Help => KeyScope::Global,
            KeyAction::SelectAll | KeyAction::Paste => KeyScope::Locator,
            KeyAction::ScrollUp
            | KeyAction::ScrollDown
            | KeyAction::PageUp
            | KeyAction::PageDown
            | KeyAction::GoToStart
            | KeyAction::GoToEnd => KeyScope::Viewer,
        }
    }

    pub(crate) fn label(self) -> &'static str {
        match self {
            KeyAction::Quit => "Quit",
            KeyAction::FocusLocator => "Locate File",
            KeyAction::ToggleFocus => "Toggle Focus",
            KeyAction::ReloadProject => "Reload Project",
            KeyAction::NextTheme => "Next Theme",
            KeyAction::Help => "Help",
            KeyAction::SelectAll => "Select All",
            KeyAction::Paste => "Paste",
            KeyAction::ScrollUp => "Scroll Up",
            KeyAction::ScrollDown => "Scroll Down",
            KeyAction::PageUp => "Page Up",
            KeyAction::PageDown => "Page Down",
            KeyAction::GoToStart => "Go to Start",
            KeyAction::GoToEnd => "Go to End",
        }
    }

    pub(crate) fn all() -> &'static [KeyAction] {
        &[
            KeyAction::Quit,
            KeyAction::FocusLocator,
            KeyAction::ToggleFocus,
            KeyAction::ReloadProject,
            KeyAction::NextTheme,
            KeyAction::Help,
            KeyAction::SelectAll,
            KeyAction::Paste,
            KeyAction::ScrollUp,
            KeyAction::ScrollDown,
            KeyAction::PageUp,
            KeyAction::PageDown,
            KeyAction::GoToStart,
            KeyAction::GoToEnd,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct KeyBind {
    pub(crate) modifiers: KeyModifiers,
    pub(crate) code: KeyCode,
}

const NAMED_KEYS: &[(&str, KeyCode)] = &[
    ("space", KeyCode::Char(' ')),
    ("esc", KeyCode::Esc),
    ("enter", KeyCode::Enter),
    ("tab", KeyCode::Tab),
    ("backtab", KeyCode::BackTab),
    ("backspace", KeyCode::Backspace),
    ("delete", KeyCode::Delete),
    ("up", KeyCode::Up),
    ("down", KeyCode::Down),
    ("left", KeyCode::Left),
    ("right", KeyCode::Right),
    ("home", KeyCode::Home),
    ("end", KeyCode::End),
    ("pageup", KeyCode::PageUp),
    ("pagedown", KeyCode::PageDown),
];

impl KeyBind {
    /// Terminals may report Ctrl+letter as the raw control char (0x01..=0x1a).
    pub(crate) fn normalize_char_with_modifiers(code: KeyCode, modifiers: KeyModifiers) -> KeyCode {
        match code {
            KeyCode::Char(c) if modifiers.contains(KeyModifiers::CONTROL) => {
                let u = c as u32;
                if (1..=26).contains(&u) {
                    KeyCode::Char((b'a' + (u as u8) - 1) as char)
                } else {
                    KeyCode::Char(c.to_ascii_lowercase())
                }
            }
            KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
            other => other,
        }
    }

    pub(crate) fn parse(s: &str) -> Option<KeyBind> {
        let parts: Vec<&str> = s.split('+').collect();
        let (key_str, mods) = parts.split_last()?;
        let mut modifiers = KeyModifiers::NONE;
        for part in mods {
            match part.to_ascii_lowercase().as_str() {
                "ctrl" => modifiers |= KeyModifiers::CONTROL,
                "shift" => modifiers |= KeyModifiers::SHIFT,
                "alt" => modifiers |= KeyModifiers::ALT,
                _ => return None,
            }
        }
        let lower = key_str.to_ascii_lowercase();
        let alias = match lower.as_str() {
            " " => "space",
            "escape" => "esc",
            "return" => "enter",
            "del" => "delete",
            other => other,
        };
        if let Some((_, code)) = NAMED_KEYS.iter().find(|(name, _)| *name == alias) {
            return Some(KeyBind {
                modifiers,
                code: *code,
            });
        }
        if let Some(n) = alias.strip_prefix('f').and_then(|n| n.parse::<u8>().ok())
            && (1..=12).contains(&n)
        {
            return Some(KeyBind {
                modifiers,
                code: KeyCode::F(n),
            });
        }
        let mut chars = alias.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(KeyBind {
                modifiers,
                code: KeyCode::Char(c),
            }),
            _ => None,
        }
    }

    fn key_name(&self) -> String {
        if let Some((name, _)) = NAMED_KEYS.iter().find(|(_, code)| *code == self.code) {
            return (*name).to_string();
        }
        match self.code {
            KeyCode::Char(c) => c.to_ascii_lowercase().to_string(),
            KeyCode::F(n) => format!("f{n}"),
            _ => "?".to_string(),
        }
    }

    fn modifier_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.modifiers.contains(KeyModifiers::CONTROL) {
            names.push("ctrl");
        }
        if self.modifiers.contains(KeyModifiers::SHIFT) {
            names.push("shift");
        }
        if self.modifiers.contains(KeyModifiers::ALT) {
            names.push("alt");
        }
        names
    }

    pub(crate) fn display(&self) -> String {
        let capitalize = |s: &str| {
            let mut chars = s.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        };
        let mut parts: Vec<String> = self.modifier_names().into_iter().map(capitalize).collect();
        let key = match self.code {
            KeyCode::PageUp => "PageUp".to_string(),
            KeyCode::PageDown => "PageDown".to_string(),
            KeyCode::BackTab => "BackTab".to_string(),
            _ => capitalize(&self.key_name()),
        };
        parts.push(key);
        parts.join("+")
    }

    pub(crate) fn matches(&self, key: &KeyEvent) -> bool {
        let bind_code = KeyBind::normalize_char_with_modifiers(self.code, self.modifiers);
        let ev_code = KeyBind::normalize_char_with_modifiers(key.code, key.modifiers);
        let mut bind_mods = self.modifiers;
        let mut ev_mods = key.modifiers;
        // Shift is implied by the char itself (or by BackTab), so it never separates binds.
        if matches!(ev_code, KeyCode::Char(_) | KeyCode::BackTab) {
            ev_mods -= KeyModifiers::SHIFT;
        }
        if matches!(bind_code, KeyCode::Char(_) | KeyCode::BackTab) {
            bind_mods -= KeyModifiers::SHIFT;
        }
        ev_code == bind_code && ev_mods == bind_mods
    }

    pub(crate) fn conflicts_with(&self, other: &KeyBind) -> bool {
        self.matches(&KeyEvent::new(other.code, other.modifiers))
            || other.matches(&KeyEvent::new(self.code, self.modifiers))
    }
}

#[derive(Debug, Clone)]
pub(crate) struct KeyBindings {
    pub(crate) map: HashMap<KeyAction, Vec<KeyBind>>,
}

impl KeyBindings {
    pub(crate) fn defaults() -> Self {
        let mut map: HashMap<KeyAction, Vec<KeyBind>> = HashMap::new();
        let mut bind = |action: KeyAction, s: &str| {
            if let Some(parsed) = KeyBind::parse(s) {
                map.entry(action).or_default().push(parsed);
            }
        };

        bind(KeyAction::Quit, "ctrl+q");
        bind(KeyAction::FocusLocator, "ctrl+p");
        bind(KeyAction::FocusLocator, "ctrl+k");
        bind(KeyAction::ToggleFocus, "tab");
        bind(KeyAction::ReloadProject, "f5");
        bind(KeyAction::NextTheme, "f6");
        bind(KeyAction::Help, "f1");

        bind(KeyAction::SelectAll, "ctrl+a");
        bind(KeyAction::Paste, "ctrl+v");

        bind(KeyAction::ScrollUp, "up");
        bind(KeyAction::ScrollUp, "k");
        bind(KeyAction::ScrollDown, "down");
        bind(KeyAction::ScrollDown, "j");
        bind(KeyAction::PageUp, "pageup");
        bind(KeyAction::PageDown, "pagedown");
        bind(KeyAction::GoToStart, "home");
        bind(KeyAction::GoToEnd, "end");

        KeyBindings { map }
    }

    pub(crate) fn lookup(&self, key: &KeyEvent, scope: KeyScope) -> Option<KeyAction> {
        KeyAction::all()
            .iter()
            .copied()
            .filter(|action| action.scope() == scope)
            .find(|action| {
                self.map
                    .get(action)
                    .is_some_and(|binds| binds.iter().any(|b| b.matches(key)))
            })
    }

    pub(crate) fn display_for(&self, action: KeyAction) -> String {
        self.map
            .get(&action)
            .and_then(|v| v.first())
            .map(|b| b.display())
            .unwrap_or_else(|| "unbound".to_string())
    }

    /// First action in `scope` other than `exclude_action` already bound to `bind`.
    pub(crate) fn find_conflict(
        &self,
        bind: &KeyBind,
        scope: KeyScope,
        exclude_action: KeyAction,
    ) -> Option<KeyAction> {
        KeyAction::all()
            .iter()
            .copied()
            .filter(|action| *action != exclude_action)
            .filter(|action| action.scope() == scope || action.scope() == KeyScope::Global)
            .find(|action| {
                self.map
                    .get(action)
                    .is_some_and(|binds| binds.iter().any(|b| b.conflicts_with(bind)))
            })
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum SingleOrVec {
    Single(String),
    Multiple(Vec<String>),
}

fn keybinds_file_path() -> Option<PathBuf> {
    app_config_dir().map(|dir| dir.join(KEYBINDS_FILE_NAME))
}

pub(crate) fn parse_key_action_name(name: &str) -> Option<KeyAction> {
    serde_json::from_value::<KeyAction>(serde_json::Value::String(name.to_string())).ok()
}

pub(crate) fn apply_keybinding_overrides(
    kb: &mut KeyBindings,
    overrides: HashMap<String, SingleOrVec>,
    source: &str,
) {
    for (action_name, val) in overrides {
        let Some(action) = parse_key_action_name(&action_name) else {
            tracing::warn!(%source, action = %action_name, "unknown key action");
            continue;
        };
        let strings = match val {
            SingleOrVec::Single(s) => vec![s],
            SingleOrVec::Multiple(v) => v,
        };
        if strings.is_empty() {
            kb.map.insert(action, Vec::new());
            continue;
        }
        let (binds, invalid): (Vec<_>, Vec<_>) = strings
            .into_iter()
            .map(|s| KeyBind::parse(&s).ok_or(s))
            .partition(Result::is_ok);
        let binds: Vec<KeyBind> = binds.into_iter().filter_map(Result::ok).collect();
        let invalid: Vec<String> = invalid.into_iter().filter_map(Result::err).collect();
        if !invalid.is_empty() {
            tracing::warn!(
                %source,
                action = %action_name,
                invalid = %invalid.join(", "),
                "invalid keybind(s)"
            );
        }
        if !binds.is_empty() {
            kb.map.insert(action, binds);
        }
    }
    for action in KeyAction::all().iter().copied() {
        let Some(binds) = kb.map.get(&action) else {
            continue;
        };
        for bind in binds {
            if let Some(other) = kb.find_conflict(bind, action.scope(), action) {
                tracing::warn!(
                    %source,
                    key = %bind.display(),
                    action = action.label(),
                    other = other.label(),
                    "keybind conflict"
                );
            }
        }
    }
}

pub(crate) fn parse_override_entry(
    action_name: &str,
    raw: serde_json::Value,
    source: &str,
) -> Option<(String, SingleOrVec)> {
    match raw {
        serde_json::Value::String(s) => Some((action_name.to_string(), SingleOrVec::Single(s))),
        serde_json::Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                let serde_json::Value::String(s) = item else {
                    tracing::warn!(%source, action = %action_name, "keybind list item is not a string");
                    return None;
                };
                out.push(s);
            }
            Some((action_name.to_string(), SingleOrVec::Multiple(out)))
        }
        _ => {
            tracing::warn!(
                %source,
                action = %action_name,
                "keybind value must be a string or an array of strings"
            );
            None
        }
    }
}

pub(crate) fn load_keybindings_from(path: &Path) -> KeyBindings {
    let mut kb = KeyBindings::defaults();
    let Ok(raw) = fs::read_to_string(path) else {
        return kb;
    };
    let source = path.display().to_string();
    let Ok(serde_json::Value::Object(obj)) = serde_json::from_str::<serde_json::Value>(&raw)
    else {
        tracing::warn!(%source, "keybinds file must contain a json object");
        return kb;
    };
    let overrides: HashMap<String, SingleOrVec> = obj
        .into_iter()
        .filter_map(|(action_name, raw_val)| parse_override_entry(&action_name, raw_val, &source))
        .collect();
    apply_keybinding_overrides(&mut kb, overrides, &source);
    kb
}

pub(crate) fn load_keybindings() -> KeyBindings {
    match keybinds_file_path() {
        Some(path) => load_keybindings_from(&path),
        None => KeyBindings::defaults(),
    }
}

#[cfg(test)]
mod keybind_tests {
    use super::*;

    #[test]
    fn test_keybind_parse_simple() {
        let kb = KeyBind::parse("ctrl+p").unwrap();
        assert_eq!(kb.modifiers, KeyModifiers::CONTROL);
        assert_eq!(kb.code, KeyCode::Char('p'));
    }

    #[test]
    fn test_keybind_parse_named_and_function_keys() {
        assert_eq!(KeyBind::parse("f5").unwrap().code, KeyCode::F(5));
        assert_eq!(KeyBind::parse("PageDown").unwrap().code, KeyCode::PageDown);
        assert_eq!(KeyBind::parse("ctrl+space").unwrap().code, KeyCode::Char(' '));
        assert_eq!(KeyBind::parse("escape").unwrap().code, KeyCode::Esc);
        let kb = KeyBind::parse("shift+alt+up").unwrap();
        assert_eq!(kb.modifiers, KeyModifiers::SHIFT | KeyModifiers::ALT);
        assert_eq!(kb.code, KeyCode::Up);
    }

    #[test]
    fn test_keybind_parse_invalid() {
        assert!(KeyBind::parse("").is_none());
        assert!(KeyBind::parse("ctrl+unknown_key").is_none());
        assert!(KeyBind::parse("hyper+a").is_none());
        assert!(KeyBind::parse("f13").is_none());
    }

    #[test]
    fn test_keybind_display() {
        let kb = KeyBind::parse("ctrl+shift+f").unwrap();
        assert_eq!(kb.display(), "Ctrl+Shift+F");
        assert_eq!(KeyBind::parse("f1").unwrap().display(), "F1");
        assert_eq!(KeyBind::parse("pagedown").unwrap().display(), "PageDown");
    }

    #[test]
    fn test_keybind_matches_uppercase_and_control_char() {
        let kb = KeyBind::parse("ctrl+p").unwrap();
        assert!(kb.matches(&KeyEvent::new(
            KeyCode::Char('P'),
            KeyModifiers::CONTROL | KeyModifiers::SHIFT
        )));
        assert!(kb.matches(&KeyEvent::new(KeyCode::Char('\u{10}'), KeyModifiers::CONTROL)));
        assert!(!kb.matches(&KeyEvent::new(KeyCode::Char('p'), KeyModifiers::NONE)));
    }

    #[test]
    fn test_shift_letter_matches_capital() {
        let kb = KeyBind::parse("alt+shift+g").unwrap();
        assert!(kb.matches(&KeyEvent::new(
            KeyCode::Char('G'),
            KeyModifiers::ALT | KeyModifiers::SHIFT
        )));
        assert!(!kb.matches(&KeyEvent::new(KeyCode::Char('G'), KeyModifiers::SHIFT)));
    }

    #[test]
    fn test_defaults_has_all_actions() {
        let kb = KeyBindings::defaults();
        for action in KeyAction::all() {
            assert!(
                kb.map.get(action).is_some_and(|b| !b.is_empty()),
                "Default keybindings missing action: {:?}",
                action
            );
        }
    }

    #[test]
    fn test_lookup_respects_scope() {
        let kb = KeyBindings::defaults();
        let ctrl_p = KeyEvent::new(KeyCode::Char('p'), KeyModifiers::CONTROL);
        assert_eq!(kb.lookup(&ctrl_p, KeyScope::Global), Some(KeyAction::FocusLocator));
        let ctrl_a = KeyEvent::new(KeyCode::Char('a'), KeyModifiers::CONTROL);
        assert_eq!(kb.lookup(&ctrl_a, KeyScope::Locator), Some(KeyAction::SelectAll));
        assert_eq!(kb.lookup(&ctrl_a, KeyScope::Global), None);
        let j = KeyEvent::new(KeyCode::Char('j'), KeyModifiers::NONE);
        assert_eq!(kb.lookup(&j, KeyScope::Viewer), Some(KeyAction::ScrollDown));
        assert_eq!(kb.lookup(&j, KeyScope::Locator), None);
    }

    #[test]
    fn test_default_binds_have_no_conflicts() {
        let kb = KeyBindings::defaults();
        for action in KeyAction::all().iter().copied() {
            for bind in &kb.map[&action] {
                assert_eq!(
                    kb.find_conflict(bind, action.scope(), action),
                    None,
                    "{} conflicts",
                    bind.display()
                );
            }
        }
    }

    #[test]
    fn test_display_for_action() {
        let kb = KeyBindings::defaults();
        assert_eq!(kb.display_for(KeyAction::FocusLocator), "Ctrl+P");
        assert_eq!(kb.display_for(KeyAction::ReloadProject), "F5");
    }

    #[test]
    fn test_overrides_replace_and_unbind() {
        let mut kb = KeyBindings::defaults();
        let mut overrides = HashMap::new();
        overrides.insert(
            "focus_locator".to_string(),
            SingleOrVec::Single("ctrl+o".to_string()),
        );
        overrides.insert("help".to_string(), SingleOrVec::Multiple(Vec::new()));
        overrides.insert(
            "quit".to_string(),
            SingleOrVec::Multiple(vec!["bogus+x".to_string(), "ctrl+w".to_string()]),
        );
        overrides.insert("no_such".to_string(), SingleOrVec::Single("f9".to_string()));
        apply_keybinding_overrides(&mut kb, overrides, "test");
        assert_eq!(kb.display_for(KeyAction::FocusLocator), "Ctrl+O");
        assert_eq!(kb.display_for(KeyAction::Help), "unbound");
        assert_eq!(kb.map[&KeyAction::Quit].len(), 1);
        assert_eq!(kb.display_for(KeyAction::Quit), "Ctrl+W");
    }

    #[test]
    fn test_parse_override_entry_rejects_bad_types() {
        assert!(parse_override_entry("quit", serde_json::json!(3), "t").is_none());
        assert!(parse_override_entry("quit", serde_json::json!(["ctrl+q", 1]), "t").is_none());
        assert!(matches!(
            parse_override_entry("quit", serde_json::json!("ctrl+q"), "t"),
            Some((_, SingleOrVec::Single(_)))
        ));
    }

    #[test]
    fn test_load_keybindings_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keybinds.json");
        fs::write(&path, r#"{"reload_project": ["f9", "ctrl+r"]}"#).unwrap();
        let kb = load_keybindings_from(&path);
        let f9 = KeyEvent::new(KeyCode::F(9), KeyModifiers::NONE);
        assert_eq!(kb.lookup(&f9, KeyScope::Global), Some(KeyAction::ReloadProject));

        fs::write(&path, "[1, 2]").unwrap();
        let kb = load_keybindings_from(&path);
        assert_eq!(kb.display_for(KeyAction::ReloadProject), "F5");
    }

    #[test]
    fn test_action_names_round_trip_through_serde() {
        for action in KeyAction::all() {
            let name = serde_json::to_value(action).unwrap();
            assert_eq!(parse_key_action_name(name.as_str().unwrap()), Some(*action));
        }
    }
}
