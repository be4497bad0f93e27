use unicode_width::UnicodeWidthStr;

/// Single-line text input. `cursor` counts chars, not bytes.
#[derive(Debug, Clone, Default)]
pub(crate) struct LocatorTextBox {
    text: String,
    cursor: usize,
    all_selected: bool,
}

impl LocatorTextBox {
    pub(crate) fn text(&self) -> &str {
        &self.text
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub(crate) fn is_all_selected(&self) -> bool {
        self.all_selected
    }

    /// Display columns between the start of the text and the cursor.
    pub(crate) fn cursor_column(&self) -> usize {
        self.text[..self.byte_offset(self.cursor)].width()
    }

    pub(crate) fn set_text(&mut self, text: &str) {
        self.text = text.chars().filter(|c| !c.is_control()).collect();
        self.cursor = self.text.chars().count();
        self.all_selected = false;
    }

    pub(crate) fn select_all(&mut self) {
        self.all_selected = !self.text.is_empty();
    }

    /// Replace the selection (if any) before an insertion; returns whether text was removed.
    fn take_selection(&mut self) -> bool {
        if !self.all_selected {
            return false;
        }
        self.all_selected = false;
        self.cursor = 0;
        if self.text.is_empty() {
            return false;
        }
        self.text.clear();
        true
    }

    pub(crate) fn insert_char(&mut self, c: char) -> bool {
        if c.is_control() {
            return false;
        }
        self.take_selection();
        let at = self.byte_offset(self.cursor);
        self.text.insert(at, c);
        self.cursor += 1;
        true
    }

    /// Insert pasted text; line breaks and other control chars are dropped.
    pub(crate) fn insert_str(&mut self, s: &str) -> bool {
        let clean: String = s.chars().filter(|c| !c.is_control()).collect();
        if clean.is_empty() {
            return false;
        }
        self.take_selection();
        let at = self.byte_offset(self.cursor);
        self.text.insert_str(at, &clean);
        self.cursor += clean.chars().count();
        true
    }

    pub(crate) fn backspace(&mut self) -> bool {
        if self.take_selection() {
            return true;
        }
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        let at = self.byte_offset(self.cursor);
        self.text.remove(at);
        true
    }

    pub(crate) fn delete(&mut self) -> bool {
        if self.take_selection() {
            return true;
        }
        if self.cursor >= self.text.chars().count() {
            return false;
        }
        let at = self.byte_offset(self.cursor);
        self.text.remove(at);
        true
    }

    pub(crate) fn move_left(&mut self) {
        self.all_selected = false;
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub(crate) fn move_right(&mut self) {
        self.all_selected = false;
        self.cursor = (self.cursor + 1).min(self.text.chars().count());
    }

    pub(crate) fn move_home(&mut self) {
        self.all_selected = false;
        self.cursor = 0;
    }

    pub(crate) fn move_end(&mut self) {
        self.all_selected = false;
        self.cursor = self.text.chars().count();
    }

    fn byte_offset(&self, char_idx: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_idx)
            .map_or(self.text.len(), |(i, _)| i)
    }
}

#[cfg(test)]
mod textbox_tests {
    use super::*;

    fn typed(s: &str) -> LocatorTextBox {
        let mut tb = LocatorTextBox::default();
        for c in s.chars() {
            tb.insert_char(c);
        }
        tb
    }

    #[test]
    fn test_insert_and_backspace() {
        let mut tb = typed("main");
        assert_eq!(tb.text(), "main");
        assert_eq!(tb.cursor_column(), 4);
        assert!(tb.backspace());
        assert_eq!(tb.text(), "mai");
        tb.move_home();
        assert!(!tb.backspace());
        assert_eq!(tb.text(), "mai");
    }

    #[test]
    fn test_insert_in_middle_and_delete() {
        let mut tb = typed("mn");
        tb.move_left();
        tb.insert_char('a');
        tb.insert_char('i');
        assert_eq!(tb.text(), "main");
        assert_eq!(tb.cursor_column(), 3);
        assert!(tb.delete());
        assert_eq!(tb.text(), "mai");
        assert!(!tb.delete());
    }

    #[test]
    fn test_select_all_then_type_replaces() {
        let mut tb = typed("editor");
        tb.select_all();
        assert!(tb.is_all_selected());
        tb.insert_char('h');
        assert_eq!(tb.text(), "h");
        assert!(!tb.is_all_selected());
        assert_eq!(tb.cursor_column(), 1);
    }

    #[test]
    fn test_select_all_then_backspace_clears() {
        let mut tb = typed("editor");
        tb.select_all();
        assert!(tb.backspace());
        assert!(tb.is_empty());
        assert_eq!(tb.cursor_column(), 0);
    }

    #[test]
    fn test_select_all_on_empty_is_noop() {
        let mut tb = LocatorTextBox::default();
        tb.select_all();
        assert!(!tb.is_all_selected());
    }

    #[test]
    fn test_cursor_moves_clear_selection() {
        let mut tb = typed("abc");
        tb.select_all();
        tb.move_end();
        assert!(!tb.is_all_selected());
        tb.insert_char('d');
        assert_eq!(tb.text(), "abcd");
    }

    #[test]
    fn test_paste_strips_newlines() {
        let mut tb = typed("src/");
        assert!(tb.insert_str("main\n.cpp\r\n"));
        assert_eq!(tb.text(), "src/main.cpp");
        assert!(!tb.insert_str("\n"));
    }

    #[test]
    fn test_multibyte_cursor_and_width() {
        let mut tb = typed("日本");
        assert_eq!(tb.cursor_column(), 4);
        tb.move_left();
        tb.insert_char('x');
        assert_eq!(tb.text(), "日x本");
        assert!(tb.backspace());
        assert_eq!(tb.text(), "日本");
    }

    #[test]
    fn test_control_chars_rejected() {
        let mut tb = LocatorTextBox::default();
        assert!(!tb.insert_char('\n'));
        tb.set_text("a\tb");
        assert_eq!(tb.text(), "ab");
        assert_eq!(tb.cursor_column(), 2);
    }
}
