use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, AppState};
use crate::cache;

use super::styles;

/// Spacer that right-aligns `right` after `left` within `width` cells.
/// Widths are measured in characters, not bytes, for the glyph spans.
fn gap(width: u16, left: &str, right: &str) -> String {
    let used = left.chars().count() + right.chars().count();
    " ".repeat((width as usize).saturating_sub(used))
}

pub fn render(frame: &mut Frame, app: &App) {
    let theme = app.theme;

    // Body-level theme marker: paint the whole frame
    let background = Block::default().style(styles::base_style(theme));
    frame.render_widget(background, frame.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Title bar
            Constraint::Length(2), // Tabs
            Constraint::Min(5),    // Active panel
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_tabs(frame, app, chunks[1]);
    render_panel(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);

    if matches!(app.state, AppState::ShowingHelp) {
        render_help_overlay(frame, app);
    }

    if matches!(app.state, AppState::ConfirmingQuit) {
        render_quit_overlay(frame, app);
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let theme = app.theme;
    let title = "  Checkmate";

    // Pressed indicator mirrors the theme toggle: filled when day is on
    let toggle = match theme {
        crate::models::Theme::Day => "[t] day \u{25cf}",
        crate::models::Theme::Night => "[t] day \u{25cb}",
    };
    let help_hint = "[?] Help";
    let right = format!("{}   {}", toggle, help_hint);

    let line = Line::from(vec![
        Span::styled(title, styles::title_style(theme)),
        Span::raw(gap(area.width.saturating_sub(2), title, &right)),
        Span::styled(right, styles::muted_style(theme)),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style(theme));
    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let theme = app.theme;
    let mut spans = vec![Span::raw(" ")];

    if app.tabs.is_empty() {
        spans.push(Span::styled("(no checklists)", styles::muted_style(theme)));
    }

    let flags = app.selected_flags();
    for (i, tab) in app.tabs.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style(theme)));
        }
        spans.push(Span::styled(
            tab.name.clone(),
            styles::tab_style(flags[i], theme),
        ));
    }

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style(theme));
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_panel(frame: &mut Frame, app: &App, area: Rect) {
    let theme = app.theme;
    let mut lines: Vec<Line> = Vec::new();

    let (Some(tab), Some(panel)) = (
        app.tabs.get(app.selected_tab),
        app.panels.get(app.selected_tab),
    ) else {
        let empty = Paragraph::new(Line::from(Span::styled(
            " No checklist data. Press [r] to refresh.",
            styles::muted_style(theme),
        )));
        frame.render_widget(empty, area);
        return;
    };

    for (i, item) in tab.items.iter().enumerate() {
        let done = panel.done[i];
        let open = panel.open[i];
        let selected = i == app.item_selection;

        let marker = if done { "[x]" } else { "[ ]" };
        let disclosure = match (&item.notes, open) {
            (Some(_), true) => "\u{25be} ",
            (Some(_), false) => "\u{25b8} ",
            (None, _) => "  ",
        };
        let button = App::done_button_label(done);

        let label_style = if done {
            styles::done_style(theme)
        } else {
            styles::item_style(theme)
        };

        let mut spans = vec![
            Span::raw(" "),
            Span::styled(marker, label_style),
            Span::raw(" "),
            Span::raw(disclosure),
            Span::styled(item.label.clone(), label_style),
            Span::raw("  "),
            Span::styled(format!("[{}]", button), styles::muted_style(theme)),
        ];
        if selected {
            spans = spans
                .into_iter()
                .map(|s| {
                    let style = s.style.patch(styles::selected_style(theme));
                    Span::styled(s.content, style)
                })
                .collect();
        }
        lines.push(Line::from(spans));

        if open {
            if let Some(ref notes) = item.notes {
                for note_line in notes.lines() {
                    lines.push(Line::from(vec![
                        Span::raw("       "),
                        Span::styled(note_line.to_string(), styles::notes_style(theme)),
                    ]));
                }
            }
        }
    }

    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let theme = app.theme;
    let shortcuts = "[e]xpand [c]ollapse [d]one [r]efresh [q]uit ";

    let left = if let Some(ref msg) = app.status_message {
        format!(" {} ", msg)
    } else if let Some(cached_at) = app.bundle_cached_at {
        format!(" {} (bundle {}) ", app.status_line, cache::format_age(cached_at))
    } else {
        format!(" {} ", app.status_line)
    };

    let filler = gap(area.width, &left, shortcuts);
    let line = Line::from(vec![
        Span::raw(left),
        Span::raw(filler),
        Span::styled(shortcuts, styles::muted_style(theme)),
    ]);

    frame.render_widget(
        Paragraph::new(line).style(styles::status_bar_style(theme)),
        area,
    );
}

/// Centered overlay rect helper
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

fn render_help_overlay(frame: &mut Frame, app: &App) {
    let theme = app.theme;
    let entries: &[(&str, &str)] = &[
        ("Left/Right", "Previous / next tab (wraps around)"),
        ("Home/End", "First / last tab"),
        ("Up/Down", "Move item selection"),
        ("Enter/Space", "Toggle item notes"),
        ("d", "Mark item done / not done"),
        ("e / c", "Expand / collapse all notes in this tab"),
        ("t", "Toggle day/night theme"),
        ("r", "Refresh checklist data"),
        ("?", "Toggle this help"),
        ("q", "Quit"),
    ];

    let mut lines = vec![Line::from("")];
    for (key, desc) in entries {
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(format!("{:<12}", key), styles::help_key_style(theme)),
            Span::styled(*desc, styles::help_desc_style(theme)),
        ]));
    }

    let area = centered_rect(56, entries.len() as u16 + 4, frame.area());
    frame.render_widget(Clear, area);
    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .style(styles::base_style(theme));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_quit_overlay(frame: &mut Frame, app: &App) {
    let theme = app.theme;
    let area = centered_rect(36, 5, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "  Quit? [y/n]",
            styles::help_desc_style(theme),
        )),
    ];
    let block = Block::default()
        .title(" Confirm ")
        .borders(Borders::ALL)
        .style(styles::base_style(theme));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gap_counts_cells_not_bytes() {
        // The toggle glyph is multi-byte but occupies one cell
        let right = "[t] day \u{25cb}   [?] Help";
        let left = "  Checkmate";
        let filler = gap(40, left, right);
        assert_eq!(
            left.chars().count() + filler.len() + right.chars().count(),
            40
        );
    }

    #[test]
    fn test_gap_never_underflows() {
        assert_eq!(gap(4, "left", "right"), "");
    }
}
