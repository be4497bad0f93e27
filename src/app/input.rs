use super::App;
use std::io;

use ratatui::crossterm::event::{
    KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};

use crate::keybinds::{KeyAction, KeyScope};
use crate::locator::LocatorEvent;
use crate::types::Focus;
use crate::util::inside;

impl App {
    pub(crate) fn handle_key(&mut self, key: KeyEvent) -> io::Result<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }
        if self.help_open {
            self.help_open = false;
            return Ok(());
        }

        if let Some(action) = self.keybinds.lookup(&key, KeyScope::Global) {
            return self.run_global_action(action);
        }

        match self.focus {
            Focus::Locator => {
                match self.keybinds.lookup(&key, KeyScope::Locator) {
                    Some(KeyAction::SelectAll) => {
                        self.locator.select_all();
                        return Ok(());
                    }
                    Some(KeyAction::Paste) => {
                        self.paste_into_locator();
                        return Ok(());
                    }
                    _ => {}
                }
                let event = self.locator.handle_key(key, &self.project);
                self.apply_locator_event(event)
            }
            Focus::Viewer => {
                if let Some(action) = self.keybinds.lookup(&key, KeyScope::Viewer) {
                    self.run_viewer_action(action);
                }
                Ok(())
            }
        }
    }

    fn run_global_action(&mut self, action: KeyAction) -> io::Result<()> {
        match action {
            KeyAction::Quit => self.quit = true,
            KeyAction::FocusLocator => self.focus_locator(),
            KeyAction::ToggleFocus => self.toggle_focus(),
            KeyAction::ReloadProject => self.reload_project()?,
            KeyAction::NextTheme => self.next_theme(),
            KeyAction::Help => self.help_open = true,
            _ => {}
        }
        Ok(())
    }

    fn apply_locator_event(&mut self, event: LocatorEvent) -> io::Result<()> {
        match event {
            LocatorEvent::Open(name) => self.open_file(&name),
            LocatorEvent::Dismissed => {
                self.focus_viewer();
                Ok(())
            }
            LocatorEvent::Handled | LocatorEvent::Ignored => Ok(()),
        }
    }

    fn paste_into_locator(&mut self) {
        let Some(clipboard) = self.clipboard.as_mut() else {
            self.set_status("Clipboard unavailable");
            return;
        };
        match clipboard.get_text() {
            Ok(text) => self.locator.paste(&text, &self.project),
            Err(err) => self.set_status(format!("Paste failed: {err}")),
        }
    }

    pub(crate) fn handle_mouse(&mut self, mouse: MouseEvent) -> io::Result<()> {
        if self.help_open {
            if matches!(mouse.kind, MouseEventKind::Down(MouseButton::Left)) {
                self.help_open = false;
            }
            return Ok(());
        }

        match self.locator.handle_mouse(mouse) {
            LocatorEvent::Ignored => {}
            LocatorEvent::Handled => {
                self.focus = Focus::Locator;
                return Ok(());
            }
            event => return self.apply_locator_event(event),
        }

        if !inside(mouse.column, mouse.row, self.viewer_rect) {
            return Ok(());
        }
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => self.focus_viewer(),
            MouseEventKind::ScrollDown => self.scroll_viewer_by(3),
            MouseEventKind::ScrollUp => self.scroll_viewer_by(-3),
            _ => {}
        }
        Ok(())
    }
}
