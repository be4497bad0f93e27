use std::fs;
use std::path::{Path, PathBuf};

use include_dir::{Dir, include_dir};
use ratatui::style::Color;
use serde::Deserialize;

use crate::persistence::app_config_dir;

const LOCAL_THEME_DIR: &str = "themes";
static EMBEDDED_THEMES: Dir = include_dir!("$CARGO_MANIFEST_DIR/themes");

#[derive(Debug, Clone)]
pub(crate) struct Theme {
    pub(crate) name: String,
    pub(crate) theme_type: String,
    pub(crate) bg: Color,
    pub(crate) bg_alt: Color,
    pub(crate) fg: Color,
    pub(crate) fg_muted: Color,
    pub(crate) border: Color,
    pub(crate) accent: Color,
    pub(crate) accent_secondary: Color,
    pub(crate) selection: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            name: "Builtin".to_string(),
            theme_type: "dark".to_string(),
            bg: Color::Rgb(20, 22, 31),
            bg_alt: Color::Rgb(25, 28, 39),
            fg: Color::Rgb(215, 213, 189),
            fg_muted: Color::Rgb(100, 100, 120),
            border: Color::Rgb(127, 122, 88),
            accent: Color::Rgb(206, 198, 130),
            accent_secondary: Color::Rgb(86, 156, 214),
            selection: Color::Rgb(51, 70, 124),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ThemeFile {
    pub(crate) name: String,
    #[serde(rename = "type")]
    pub(crate) theme_type: String,
    pub(crate) colors: ThemeColors,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ThemeColors {
    pub(crate) background: String,
    #[serde(rename = "backgroundAlt")]
    pub(crate) background_alt: String,
    pub(crate) foreground: String,
    #[serde(rename = "foregroundMuted")]
    pub(crate) foreground_muted: String,
    pub(crate) border: String,
    pub(crate) accent: String,
    #[serde(default, rename = "accentSecondary")]
    pub(crate) accent_secondary: Option<String>,
    pub(crate) selection: String,
}

pub(crate) fn color_from_hex(input: &str, fallback: Color) -> Color {
    let s = input.trim();
    if let Some(stripped) = s.strip_prefix('#')
        && stripped.len() == 6
        && stripped.is_ascii()
    {
        let r = u8::from_str_radix(&stripped[0..2], 16).ok();
        let g = u8::from_str_radix(&stripped[2..4], 16).ok();
        let b = u8::from_str_radix(&stripped[4..6], 16).ok();
        if let (Some(r), Some(g), Some(b)) = (r, g, b) {
            return Color::Rgb(r, g, b);
        }
    }
    fallback
}

pub(crate) fn theme_from_file(tf: ThemeFile) -> Theme {
    let base = Theme::default();
    Theme {
        name: tf.name,
        theme_type: tf.theme_type,
        bg: color_from_hex(&tf.colors.background, base.bg),
        bg_alt: color_from_hex(&tf.colors.background_alt, base.bg_alt),
        fg: color_from_hex(&tf.colors.foreground, base.fg),
        fg_muted: color_from_hex(&tf.colors.foreground_muted, base.fg_muted),
        border: color_from_hex(&tf.colors.border, base.border),
        accent: color_from_hex(&tf.colors.accent, base.accent),
        accent_secondary: tf
            .colors
            .accent_secondary
            .as_ref()
            .map_or(base.accent_secondary, |c| {
                color_from_hex(c, base.accent_secondary)
            }),
        selection: color_from_hex(&tf.colors.selection, base.selection),
    }
}

fn load_theme_dir(dir: &Path) -> Vec<Theme> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .ok()
        .into_iter()
        .flat_map(|rd| rd.filter_map(Result::ok))
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|e| e == "json"))
        .collect();
    paths.sort();

    let mut themes = Vec::new();
    for path in paths {
        let Ok(raw) = fs::read_to_string(&path) else {
            continue;
        };
        match serde_json::from_str::<ThemeFile>(&raw) {
            Ok(tf) => themes.push(theme_from_file(tf)),
            Err(err) => tracing::warn!(path = %path.display(), %err, "skipping invalid theme"),
        }
    }
    themes
}

pub(crate) fn load_themes() -> Vec<Theme> {
    let user_dir = app_config_dir().map(|dir| dir.join(LOCAL_THEME_DIR));
    let mut themes = std::iter::once(PathBuf::from(LOCAL_THEME_DIR))
        .chain(user_dir)
        .filter(|dir| dir.is_dir())
        .map(|dir| load_theme_dir(&dir))
        .find(|found| !found.is_empty())
        .unwrap_or_default();
    if themes.is_empty() {
        let mut files: Vec<_> = EMBEDDED_THEMES
            .files()
            .filter(|f| f.path().extension().is_some_and(|e| e == "json"))
            .collect();
        files.sort_by_key(|f| f.path());
        for file in files {
            let Some(raw) = file.contents_utf8() else {
                continue;
            };
            let Ok(tf) = serde_json::from_str::<ThemeFile>(raw) else {
                continue;
            };
            themes.push(theme_from_file(tf));
        }
    }
    if themes.is_empty() {
        themes.push(Theme::default());
    }
    themes.sort_by_key(|t| (t.theme_type != "dark", t.name.to_ascii_lowercase()));
    themes
}

/// Index of the theme called `name`, or the first theme when there is no such theme.
pub(crate) fn theme_index_by_name(themes: &[Theme], name: Option<&str>) -> usize {
    name.and_then(|name| themes.iter().position(|t| t.name.eq_ignore_ascii_case(name)))
        .unwrap_or(0)
}

#[cfg(test)]
mod theme_tests {
    use super::*;

    #[test]
    fn test_theme_file_deserialize_all_fields() {
        let json = r##"{"name":"Test Theme","type":"dark","colors":{"background":"#1a1b26","backgroundAlt":"#16161e","foreground":"#a9b1d6","foregroundMuted":"#565f89","border":"#414868","accent":"#7aa2f7","selection":"#364a82"}}"##;
        let tf: ThemeFile = serde_json::from_str(json).unwrap();
        assert_eq!(tf.name, "Test Theme");
        assert_eq!(tf.theme_type, "dark");
        assert_eq!(tf.colors.background_alt, "#16161e");
        assert!(tf.colors.accent_secondary.is_none());
    }

    #[test]
    fn test_theme_file_deserialize_missing_color_field() {
        let json = r##"{"name":"Incomplete","type":"dark","colors":{"background":"#1a1b26","backgroundAlt":"#16161e","foreground":"#a9b1d6","foregroundMuted":"#565f89","border":"#414868","selection":"#364a82"}}"##;
        assert!(serde_json::from_str::<ThemeFile>(json).is_err());
    }

    #[test]
    fn test_color_from_hex_valid_and_invalid() {
        assert_eq!(
            color_from_hex("  #AABBCC  ", Color::White),
            Color::Rgb(170, 187, 204)
        );
        assert_eq!(color_from_hex("#00ff00", Color::White), Color::Rgb(0, 255, 0));
        assert_eq!(color_from_hex("#FFF", Color::White), Color::White);
        assert_eq!(color_from_hex("#GGGGGG", Color::White), Color::White);
        assert_eq!(color_from_hex("FF0000", Color::White), Color::White);
        assert_eq!(color_from_hex("#aééb", Color::White), Color::White);
    }

    #[test]
    fn test_theme_from_file_falls_back_on_bad_colors() {
        let json = r##"{"name":"Broken","type":"light","colors":{"background":"nope","backgroundAlt":"#000000","foreground":"#ffffff","foregroundMuted":"#808080","border":"#101010","accent":"#ff0000","accentSecondary":"bad","selection":"#0000ff"}}"##;
        let theme = theme_from_file(serde_json::from_str(json).unwrap());
        let base = Theme::default();
        assert_eq!(theme.bg, base.bg);
        assert_eq!(theme.accent_secondary, base.accent_secondary);
        assert_eq!(theme.accent, Color::Rgb(255, 0, 0));
    }

    #[test]
    fn test_embedded_themes_load_and_dark_first() {
        let themes = load_themes();
        assert!(!themes.is_empty());
        assert_eq!(themes[0].theme_type, "dark");
    }

    #[test]
    fn test_load_theme_dir_skips_invalid_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("bad.json"), "{not json").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        fs::write(
            dir.path().join("good.json"),
            r##"{"name":"Good","type":"dark","colors":{"background":"#000000","backgroundAlt":"#111111","foreground":"#eeeeee","foregroundMuted":"#777777","border":"#333333","accent":"#ff8800","selection":"#222244"}}"##,
        )
        .unwrap();
        let themes = load_theme_dir(dir.path());
        assert_eq!(themes.len(), 1);
        assert_eq!(themes[0].name, "Good");
    }

    #[test]
    fn test_theme_index_by_name() {
        let mut a = Theme::default();
        a.name = "Dusk".to_string();
        let mut b = Theme::default();
        b.name = "Paper".to_string();
        let themes = vec![a, b];
        assert_eq!(theme_index_by_name(&themes, Some("paper")), 1);
        assert_eq!(theme_index_by_name(&themes, Some("missing")), 0);
        assert_eq!(theme_index_by_name(&themes, None), 0);
    }
}
