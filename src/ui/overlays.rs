use ratatui::Frame;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Clear, Paragraph};

use super::helpers::{centered_rect, help_keybind_line, list_item_style, themed_block};
use crate::app::App;
use crate::keybinds::KeyAction;
use crate::locator::FileKind;
use crate::theme::Theme;
use crate::util::truncate_left;
use unicode_width::UnicodeWidthStr;

fn icon_style(kind: FileKind, theme: &Theme) -> Style {
    match kind {
        FileKind::CPlusPlus => Style::default()
            .fg(theme.accent_secondary)
            .add_modifier(Modifier::BOLD),
        FileKind::Header => Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
        FileKind::Unknown => Style::default().fg(theme.fg_muted),
    }
}

pub(crate) fn render_locator_popup(app: &App, frame: &mut Frame<'_>) {
    let theme = app.active_theme();
    let locator = &app.locator;
    let area = locator.popup_rect();
    if area.width < 3 || area.height < 3 {
        return;
    }
    frame.render_widget(Clear, area);

    let inner_width = usize::from(area.width.saturating_sub(2));
    let show_icons = app.config.show_icons;
    let name_width = if show_icons {
        inner_width.saturating_sub(4)
    } else {
        inner_width
    };

    let model = locator.model();
    let mut lines: Vec<Line> = Vec::new();
    if model.is_empty() {
        lines.push(Line::from(Span::styled(
            "No matching files",
            Style::default().fg(theme.fg_muted),
        )));
    } else {
        let rows = model
            .rows()
            .enumerate()
            .skip(locator.scroll())
            .take(locator.visible_rows());
        for (row, name) in rows {
            let selected = locator.selection() == Some(row);
            let style = list_item_style(selected, theme);
            let mut spans = Vec::new();
            if show_icons && let Some(kind) = model.kind(row) {
                let icon = if selected {
                    style
                } else {
                    icon_style(kind, theme)
                };
                spans.push(Span::styled(kind.icon(), icon));
                spans.push(Span::styled(" ", style));
            }
            let label = truncate_left(name, name_width);
            let pad = name_width.saturating_sub(label.width());
            spans.push(Span::styled(format!("{label}{}", " ".repeat(pad)), style));
            lines.push(Line::from(spans));
        }
    }

    let title = format!(" {} match(es) ", model.row_count());
    let paragraph = Paragraph::new(lines)
        .style(Style::default().fg(theme.fg).bg(theme.bg_alt))
        .block(themed_block(theme).title(title));
    frame.render_widget(paragraph, area);
}

pub(crate) fn render_help(app: &App, frame: &mut Frame<'_>) {
    let theme = app.active_theme();
    let area = centered_rect(60, 70, frame.area());
    frame.render_widget(Clear, area);
    let key_style = Style::default().fg(theme.accent).add_modifier(Modifier::BOLD);
    let desc_style = Style::default().fg(theme.fg);
    let mut lines = vec![
        Line::from(Span::styled(
            "Type in the locator to filter project files by name.",
            Style::default().fg(theme.fg_muted),
        )),
        Line::from(""),
        help_keybind_line("Up/Down".to_string(), "Move selection", key_style, desc_style),
        help_keybind_line("Enter".to_string(), "Open selected file", key_style, desc_style),
        help_keybind_line("Esc".to_string(), "Hide results", key_style, desc_style),
        help_keybind_line(
            "Double-click".to_string(),
            "Open clicked file",
            key_style,
            desc_style,
        ),
    ];
    for action in KeyAction::all().iter().copied() {
        lines.push(help_keybind_line(
            app.keybinds.display_for(action),
            action.label(),
            key_style,
            desc_style,
        ));
    }
    let paragraph = Paragraph::new(lines)
        .style(Style::default().bg(theme.bg_alt))
        .block(themed_block(theme).title(" Help "));
    frame.render_widget(paragraph, area);
}
