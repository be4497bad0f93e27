use std::time::{Duration, Instant};

use ratatui::crossterm::event::{
    KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::Rect;

use crate::config::LocatorConfig;
use crate::project::Project;
use crate::util::inside;

mod model;
mod textbox;

pub(crate) use model::{FileKind, SuggestionModel};
pub(crate) use textbox::LocatorTextBox;

const DOUBLE_CLICK_WINDOW: Duration = Duration::from_millis(400);
const MIN_ROWS_ABOVE: u16 = 3;

/// What the host should do after the locator consumed an input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LocatorEvent {
    /// Not for the locator; the host may handle it.
    Ignored,
    Handled,
    /// Escape with the popup already hidden.
    Dismissed,
    /// A suggestion was activated; the host opens this project file.
    Open(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LocatorOptions {
    pub(crate) case_sensitive: bool,
    pub(crate) max_suggestions: Option<usize>,
    pub(crate) popup_width: u16,
    pub(crate) popup_height: u16,
}

impl From<&LocatorConfig> for LocatorOptions {
    fn from(config: &LocatorConfig) -> Self {
        Self {
            case_sensitive: config.case_sensitive,
            max_suggestions: config.max_suggestions,
            popup_width: config.popup_width.max(8),
            popup_height: config.popup_height.max(3),
        }
    }
}

impl Default for LocatorOptions {
    fn default() -> Self {
        Self::from(&LocatorConfig::default())
    }
}

pub(crate) struct Locator {
    options: LocatorOptions,
    textbox: LocatorTextBox,
    model: SuggestionModel,
    selection: Option<usize>,
    scroll: usize,
    popup_visible: bool,
    textbox_rect: Rect,
    bounds: Rect,
    popup_rect: Rect,
    last_click: Option<(Instant, usize)>,
}

impl Locator {
    pub(crate) fn new(options: LocatorOptions) -> Self {
        Self {
            options,
            textbox: LocatorTextBox::default(),
            model: SuggestionModel::default(),
            selection: None,
            scroll: 0,
            popup_visible: false,
            textbox_rect: Rect::default(),
            bounds: Rect::default(),
            popup_rect: Rect::default(),
            last_click: None,
        }
    }

    pub(crate) fn textbox(&self) -> &LocatorTextBox {
        &self.textbox
    }

    pub(crate) fn text(&self) -> &str {
        self.textbox.text()
    }

    pub(crate) fn model(&self) -> &SuggestionModel {
        &self.model
    }

    pub(crate) fn selection(&self) -> Option<usize> {
        self.selection
    }

    pub(crate) fn scroll(&self) -> usize {
        self.scroll
    }

    pub(crate) fn is_popup_visible(&self) -> bool {
        self.popup_visible
    }

    pub(crate) fn popup_rect(&self) -> Rect {
        self.popup_rect
    }

    /// Seed the text box and its suggestions without showing the popup, e.g. from persisted state.
    pub(crate) fn restore(&mut self, text: &str, project: &Project) {
        self.textbox.set_text(text);
        self.update_suggestions(project);
        self.close();
    }

    /// Focus entry point: re-show the previous results with the text selected.
    pub(crate) fn open(&mut self) {
        if !self.textbox.is_empty() {
            self.textbox.select_all();
            self.popup_visible = true;
        }
    }

    pub(crate) fn close(&mut self) {
        self.popup_visible = false;
    }

    pub(crate) fn select_all(&mut self) {
        self.textbox.select_all();
    }

    pub(crate) fn paste(&mut self, text: &str, project: &Project) {
        if self.textbox.insert_str(text) {
            self.update_suggestions(project);
        }
    }

    /// Record where the text box was laid out and the area the popup may use.
    pub(crate) fn set_geometry(&mut self, textbox_rect: Rect, bounds: Rect) {
        self.textbox_rect = textbox_rect;
        self.bounds = bounds;
        self.reposition_popup();
        if let Some(row) = self.selection {
            self.scroll_into_view(row);
        }
    }

    pub(crate) fn visible_rows(&self) -> usize {
        usize::from(self.popup_rect.height.saturating_sub(2)).max(1)
    }

    pub(crate) fn update_suggestions(&mut self, project: &Project) {
        let typed = self.textbox.text().to_string();
        let suggestions =
            matching_files(project, &typed, self.options.case_sensitive, self.options.max_suggestions);
        tracing::debug!(query = %typed, count = suggestions.len(), "locator suggestions updated");
        for s in &suggestions {
            tracing::trace!("    {s}");
        }

        self.model = SuggestionModel::new(suggestions);
        self.selection = None;
        self.scroll = 0;
        self.last_click = None;

        self.reposition_popup();
        tracing::debug!(rect = ?self.popup_rect, "locator popup placed");
        self.popup_visible = true;
    }

    /// Refilter after the project changed, keeping popup visibility and the selected file.
    pub(crate) fn refresh(&mut self, project: &Project) {
        let selected = self
            .selection
            .and_then(|row| self.model.name(row))
            .map(str::to_string);
        let visible = self.popup_visible;
        self.update_suggestions(project);
        self.popup_visible = visible;
        if let Some(row) = selected.and_then(|name| self.model.rows().position(|n| n == name)) {
            self.selection = Some(row);
            self.scroll_into_view(row);
        }
    }

    pub(crate) fn select_previous(&mut self) {
        let target = match self.selection {
            Some(row) => row.checked_sub(1),
            None => Some(0),
        };
        self.select_if_valid(target);
    }

    pub(crate) fn select_next(&mut self) {
        let target = match self.selection {
            Some(row) => Some(row + 1),
            None => Some(0),
        };
        self.select_if_valid(target);
    }

    fn select_if_valid(&mut self, target: Option<usize>) {
        let Some(row) = target.filter(|row| self.model.is_valid_row(*row)) else {
            return;
        };
        self.selection = Some(row);
        self.scroll_into_view(row);
    }

    fn scroll_into_view(&mut self, row: usize) {
        let visible = self.visible_rows();
        if row < self.scroll {
            self.scroll = row;
        } else if row >= self.scroll + visible {
            self.scroll = row + 1 - visible;
        }
    }

    /// Enter: open the selected suggestion, if there is one.
    pub(crate) fn activate_selected(&mut self) -> Option<String> {
        let row = self.selection?;
        self.open_suggestion(row)
    }

    pub(crate) fn open_suggestion(&mut self, row: usize) -> Option<String> {
        let name = self.model.name(row)?.to_string();
        self.close();
        Some(name)
    }

    pub(crate) fn handle_key(&mut self, key: KeyEvent, project: &Project) -> LocatorEvent {
        let changed = match (key.modifiers, key.code) {
            (_, KeyCode::Esc) => {
                if !self.popup_visible {
                    return LocatorEvent::Dismissed;
                }
                self.close();
                return LocatorEvent::Handled;
            }
            (_, KeyCode::Enter) => {
                return match self.activate_selected() {
                    Some(name) => LocatorEvent::Open(name),
                    None => LocatorEvent::Handled,
                };
            }
            (_, KeyCode::Up) => {
                self.select_previous();
                false
            }
            (_, KeyCode::Down) => {
                self.select_next();
                false
            }
            (_, KeyCode::Backspace) => self.textbox.backspace(),
            (_, KeyCode::Delete) => self.textbox.delete(),
            (_, KeyCode::Left) => {
                self.textbox.move_left();
                false
            }
            (_, KeyCode::Right) => {
                self.textbox.move_right();
                false
            }
            (_, KeyCode::Home) => {
                self.textbox.move_home();
                false
            }
            (_, KeyCode::End) => {
                self.textbox.move_end();
                false
            }
            (mods, KeyCode::Char(c)) => {
                if mods.contains(KeyModifiers::CONTROL) || mods.contains(KeyModifiers::ALT) {
                    return LocatorEvent::Ignored;
                }
                self.textbox.insert_char(c)
            }
            _ => return LocatorEvent::Ignored,
        };
        if changed {
            self.update_suggestions(project);
        }
        LocatorEvent::Handled
    }

    pub(crate) fn handle_mouse(&mut self, mouse: MouseEvent) -> LocatorEvent {
        self.handle_mouse_at(mouse, Instant::now())
    }

    pub(crate) fn handle_mouse_at(&mut self, mouse: MouseEvent, now: Instant) -> LocatorEvent {
        let (x, y) = (mouse.column, mouse.row);
        let over_popup = self.popup_visible && inside(x, y, self.popup_rect);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if over_popup {
                    let Some(row) = self.row_at(y) else {
                        return LocatorEvent::Handled;
                    };
                    let double = self
                        .last_click
                        .is_some_and(|(at, prev)| prev == row && now.duration_since(at) <= DOUBLE_CLICK_WINDOW);
                    if double {
                        self.last_click = None;
                        return match self.open_suggestion(row) {
                            Some(name) => LocatorEvent::Open(name),
                            None => LocatorEvent::Handled,
                        };
                    }
                    self.selection = Some(row);
                    self.last_click = Some((now, row));
                    return LocatorEvent::Handled;
                }
                if inside(x, y, self.textbox_rect) {
                    self.open();
                    return LocatorEvent::Handled;
                }
                if self.popup_visible {
                    self.close();
                }
                LocatorEvent::Ignored
            }
            MouseEventKind::ScrollDown if over_popup => {
                self.select_next();
                LocatorEvent::Handled
            }
            MouseEventKind::ScrollUp if over_popup => {
                self.select_previous();
                LocatorEvent::Handled
            }
            _ => LocatorEvent::Ignored,
        }
    }

    fn row_at(&self, y: u16) -> Option<usize> {
        let inner_top = self.popup_rect.y.saturating_add(1);
        let inner_bottom = self
            .popup_rect
            .y
            .saturating_add(self.popup_rect.height)
            .saturating_sub(1);
        if y < inner_top || y >= inner_bottom {
            return None;
        }
        let row = usize::from(y - inner_top) + self.scroll;
        self.model.is_valid_row(row).then_some(row)
    }

    fn reposition_popup(&mut self) {
        self.popup_rect = popup_rect_for(
            self.textbox_rect,
            self.bounds,
            self.options.popup_width,
            self.options.popup_height,
        );
    }
}

/// Every project text file whose name contains `query`, in project order.
pub(crate) fn matching_files(
    project: &Project,
    query: &str,
    case_sensitive: bool,
    limit: Option<usize>,
) -> Vec<String> {
    let needle = if case_sensitive {
        query.to_string()
    } else {
        query.to_lowercase()
    };
    let limit = limit.unwrap_or(usize::MAX);
    let mut out = Vec::new();
    project.for_each_text_file(|file| {
        if out.len() >= limit {
            return;
        }
        let hit = if case_sensitive {
            file.name().contains(&needle)
        } else {
            file.name().to_lowercase().contains(&needle)
        };
        if hit {
            out.push(file.name().to_string());
        }
    });
    out
}

/// Place the popup with its bottom edge on the text box's top edge, falling back to below
/// the text box when fewer than `MIN_ROWS_ABOVE` rows are free above it.
pub(crate) fn popup_rect_for(anchor: Rect, bounds: Rect, width: u16, height: u16) -> Rect {
    if bounds.width == 0 || bounds.height == 0 {
        return Rect::default();
    }
    let width = width.min(bounds.width);
    let max_x = bounds.x + bounds.width - width;
    let x = anchor.x.clamp(bounds.x, max_x);

    let room_above = anchor.y.saturating_sub(bounds.y);
    let anchor_bottom = anchor.y.saturating_add(anchor.height);
    let bounds_bottom = bounds.y + bounds.height;
    let room_below = bounds_bottom.saturating_sub(anchor_bottom);

    if room_above >= height.min(MIN_ROWS_ABOVE) {
        let h = height.min(room_above);
        Rect::new(x, anchor.y - h, width, h)
    } else {
        let h = height.min(room_below);
        Rect::new(x, anchor_bottom, width, h)
    }
}
