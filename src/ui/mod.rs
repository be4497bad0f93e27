mod helpers;
mod overlays;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::app::App;
use crate::keybinds::KeyAction;
use crate::theme::Theme;
use crate::types::Focus;
use crate::util::{to_u16_saturating, truncate_left};
use helpers::pane_block;
use overlays::{render_help, render_locator_popup};

const GUTTER_WIDTH: usize = 5;

pub(crate) fn draw(app: &mut App, frame: &mut Frame<'_>) {
    let theme = app.active_theme().clone();
    let size = frame.area();
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(size);

    render_header(app, frame, vertical[0], &theme);

    app.viewer_rect = vertical[1];
    render_viewer(app, frame, vertical[1], &theme);

    app.locator.set_geometry(vertical[2], size);
    render_locator_bar(app, frame, vertical[2], &theme);

    let kb = &app.keybinds;
    let hints = format!(
        "{}  |  {} Locate  {} Focus  {} Help  {} Quit",
        app.status,
        kb.display_for(KeyAction::FocusLocator),
        kb.display_for(KeyAction::ToggleFocus),
        kb.display_for(KeyAction::Help),
        kb.display_for(KeyAction::Quit),
    );
    let status =
        Paragraph::new(hints).style(Style::default().fg(theme.fg_muted).bg(theme.bg_alt));
    frame.render_widget(status, vertical[3]);

    if app.locator.is_popup_visible() {
        render_locator_popup(app, frame);
    }
    if app.help_open {
        render_help(app, frame);
    }
}

fn render_header(app: &App, frame: &mut Frame<'_>, area: Rect, theme: &Theme) {
    let files = if app.project.is_empty() {
        "no text files".to_string()
    } else {
        format!("{} files", app.project.len())
    };
    let source = match app.project.manifest() {
        Some(manifest) => manifest.display().to_string(),
        None => app.project.root().display().to_string(),
    };
    let line = Line::from(vec![
        Span::styled(
            " locator ",
            Style::default()
                .fg(theme.bg)
                .bg(theme.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("  {source}   {files}"), Style::default().fg(theme.fg)),
    ]);
    frame.render_widget(
        Paragraph::new(line).style(Style::default().bg(theme.bg_alt)),
        area,
    );
}

fn render_viewer(app: &App, frame: &mut Frame<'_>, area: Rect, theme: &Theme) {
    let focused = app.focus == Focus::Viewer;
    let inner_width = usize::from(area.width.saturating_sub(2));
    let Some(file) = app.opened.as_ref() else {
        let hint = format!(
            "Press {} and type part of a file name.",
            app.keybinds.display_for(KeyAction::FocusLocator)
        );
        let empty = Paragraph::new(Span::styled(hint, Style::default().fg(theme.fg_muted)))
            .block(pane_block(theme, focused).title(" No file "));
        frame.render_widget(empty, area);
        return;
    };

    let rows = usize::from(area.height.saturating_sub(2));
    let gutter_style = Style::default().fg(theme.fg_muted);
    let lines: Vec<Line> = file
        .lines
        .iter()
        .enumerate()
        .skip(file.scroll)
        .take(rows)
        .map(|(idx, text)| {
            Line::from(vec![
                Span::styled(format!("{:>4} ", idx + 1), gutter_style),
                Span::raw(text.clone()),
            ])
        })
        .collect();
    let title = format!(
        " {} ",
        truncate_left(&file.name, inner_width.saturating_sub(GUTTER_WIDTH))
    );
    let paragraph = Paragraph::new(lines).block(pane_block(theme, focused).title(title));
    frame.render_widget(paragraph, area);
}

fn render_locator_bar(app: &App, frame: &mut Frame<'_>, area: Rect, theme: &Theme) {
    let focused = app.focus == Focus::Locator;
    let block = pane_block(theme, focused).title(format!(
        " Locate ({}) ",
        app.keybinds.display_for(KeyAction::FocusLocator)
    ));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let textbox = app.locator.textbox();
    let cursor_col = textbox.cursor_column();
    let offset = cursor_col.saturating_sub(usize::from(inner.width.saturating_sub(1)));
    let content = if textbox.is_empty() && !focused {
        Span::styled("file name...", Style::default().fg(theme.fg_muted))
    } else if textbox.is_all_selected() {
        Span::styled(
            textbox.text().to_string(),
            Style::default().fg(theme.fg).bg(theme.selection),
        )
    } else {
        Span::styled(textbox.text().to_string(), Style::default().fg(theme.fg))
    };
    let paragraph = Paragraph::new(Line::from(content)).scroll((0, to_u16_saturating(offset)));
    frame.render_widget(paragraph, inner);

    if focused && !app.help_open {
        let x = inner
            .x
            .saturating_add(to_u16_saturating(cursor_col - offset));
        frame.set_cursor_position((x, inner.y));
    }
}
