use super::App;

use crate::keybinds::KeyAction;

impl App {
    fn viewer_page_rows(&self) -> usize {
        usize::from(self.viewer_rect.height.saturating_sub(2)).max(1)
    }

    fn max_viewer_scroll(&self) -> usize {
        let page = self.viewer_page_rows();
        self.opened
            .as_ref()
            .map_or(0, |f| f.lines.len().saturating_sub(page))
    }

    pub(crate) fn scroll_viewer_by(&mut self, delta: isize) {
        let max = self.max_viewer_scroll();
        if let Some(file) = self.opened.as_mut() {
            file.scroll = file.scroll.saturating_add_signed(delta).min(max);
        }
    }

    pub(crate) fn run_viewer_action(&mut self, action: KeyAction) {
        let page = isize::try_from(self.viewer_page_rows()).unwrap_or(isize::MAX);
        match action {
            KeyAction::ScrollUp => self.scroll_viewer_by(-1),
            KeyAction::ScrollDown => self.scroll_viewer_by(1),
            KeyAction::PageUp => self.scroll_viewer_by(-page),
            KeyAction::PageDown => self.scroll_viewer_by(page),
            KeyAction::GoToStart => self.scroll_viewer_by(isize::MIN),
            KeyAction::GoToEnd => self.scroll_viewer_by(isize::MAX),
            _ => {}
        }
    }
}

#[cfg(test)]
mod viewer_tests {
    use super::*;
    use crate::config::LocatorConfig;
    use crate::keybinds::KeyBindings;
    use ratatui::layout::Rect;
    use std::fs;

    fn app_with_long_file() -> (tempfile::TempDir, App) {
        let dir = tempfile::tempdir().unwrap();
        let body: String = (1..=100).map(|i| format!("line {i}\n")).collect();
        fs::write(dir.path().join("long.txt"), body).unwrap();
        let mut app =
            App::new(dir.path(), LocatorConfig::default(), KeyBindings::defaults()).unwrap();
        app.viewer_rect = Rect::new(0, 3, 80, 22);
        app.open_file("long.txt").unwrap();
        (dir, app)
    }

    fn scroll(app: &App) -> usize {
        app.opened.as_ref().unwrap().scroll
    }

    #[test]
    fn test_scroll_clamps_at_both_ends() {
        let (_dir, mut app) = app_with_long_file();
        app.run_viewer_action(KeyAction::ScrollUp);
        assert_eq!(scroll(&app), 0);
        app.run_viewer_action(KeyAction::ScrollDown);
        assert_eq!(scroll(&app), 1);
        app.run_viewer_action(KeyAction::GoToEnd);
        // 101 lines (trailing newline) minus a 20-row page
        assert_eq!(scroll(&app), 81);
        app.run_viewer_action(KeyAction::ScrollDown);
        assert_eq!(scroll(&app), 81);
        app.run_viewer_action(KeyAction::GoToStart);
        assert_eq!(scroll(&app), 0);
    }

    #[test]
    fn test_page_moves_by_visible_rows() {
        let (_dir, mut app) = app_with_long_file();
        app.run_viewer_action(KeyAction::PageDown);
        assert_eq!(scroll(&app), 20);
        app.run_viewer_action(KeyAction::PageUp);
        assert_eq!(scroll(&app), 0);
    }

    #[test]
    fn test_scroll_without_file_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let mut app =
            App::new(dir.path(), LocatorConfig::default(), KeyBindings::defaults()).unwrap();
        app.run_viewer_action(KeyAction::PageDown);
        assert!(app.opened.is_none());
    }
}
