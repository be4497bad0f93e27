use ratatui::layout::Rect;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Split file contents into display lines, keeping a trailing empty line after a final newline.
pub(crate) fn text_to_lines(text: &str) -> Vec<String> {
    if text.is_empty() {
        return vec![String::new()];
    }
    let mut lines: Vec<String> = text.lines().map(ToString::to_string).collect();
    if text.ends_with('\n') {
        lines.push(String::new());
    }
    lines
}

pub(crate) fn inside(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x
        && x < rect.x.saturating_add(rect.width)
        && y >= rect.y
        && y < rect.y.saturating_add(rect.height)
}

pub(crate) fn to_u16_saturating(v: usize) -> u16 {
    u16::try_from(v).unwrap_or(u16::MAX)
}

/// Fit `s` into `max_width` columns, eliding from the left so the file name stays visible.
pub(crate) fn truncate_left(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    if max_width == 0 {
        return String::new();
    }
    let budget = max_width - 1;
    let mut kept: Vec<char> = Vec::new();
    let mut used = 0;
    for c in s.chars().rev() {
        let w = c.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        kept.push(c);
    }
    let mut out = String::from("…");
    out.extend(kept.into_iter().rev());
    out
}

#[cfg(test)]
mod utility_tests {
    use super::*;

    #[test]
    fn test_text_to_lines() {
        assert_eq!(text_to_lines(""), vec![""]);
        assert_eq!(text_to_lines("a\nb"), vec!["a", "b"]);
        assert_eq!(text_to_lines("a\nb\n"), vec!["a", "b", ""]);
        assert_eq!(text_to_lines("a\r\nb"), vec!["a", "b"]);
    }

    #[test]
    fn test_inside_point_at_corners() {
        let rect = Rect::new(10, 10, 20, 20);
        assert!(inside(10, 10, rect)); // top-left inclusive
        assert!(!inside(30, 10, rect)); // top-right exclusive
        assert!(!inside(10, 30, rect)); // bottom-left exclusive
        assert!(inside(29, 29, rect));
        assert!(!inside(9, 15, rect));
    }

    #[test]
    fn test_inside_zero_sized_rect() {
        assert!(!inside(10, 10, Rect::new(10, 10, 0, 0)));
    }

    #[test]
    fn test_to_u16_saturating() {
        assert_eq!(to_u16_saturating(12), 12);
        assert_eq!(to_u16_saturating(usize::MAX), u16::MAX);
    }

    #[test]
    fn test_truncate_left() {
        assert_eq!(truncate_left("src/main.cpp", 20), "src/main.cpp");
        assert_eq!(truncate_left("src/widgets/Locator.cpp", 12), "…Locator.cpp");
        assert_eq!(truncate_left("abc", 0), "");
        assert_eq!(truncate_left("abcdef", 1), "…");
    }

    #[test]
    fn test_truncate_left_wide_chars() {
        let out = truncate_left("dir/日本語.txt", 8);
        assert!(out.width() <= 8);
        assert!(out.ends_with(".txt"));
        assert!(out.starts_with('…'));
    }
}
