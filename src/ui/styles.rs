use ratatui::style::{Color, Modifier, Style};

use crate::models::Theme;

// Night palette
const NIGHT_PRIMARY: Color = Color::Rgb(64, 128, 192);
const NIGHT_FG: Color = Color::Rgb(220, 220, 220);
const NIGHT_BG: Color = Color::Rgb(16, 16, 24);
const NIGHT_MUTED: Color = Color::Rgb(128, 128, 128);
const NIGHT_DONE: Color = Color::Rgb(96, 160, 96);
const NIGHT_HIGHLIGHT: Color = Color::Rgb(48, 48, 64);

// Day palette
const DAY_PRIMARY: Color = Color::Rgb(32, 80, 144);
const DAY_FG: Color = Color::Rgb(32, 32, 32);
const DAY_BG: Color = Color::Rgb(236, 236, 228);
const DAY_MUTED: Color = Color::Rgb(112, 112, 104);
const DAY_DONE: Color = Color::Rgb(48, 112, 48);
const DAY_HIGHLIGHT: Color = Color::Rgb(208, 208, 192);

fn primary(theme: Theme) -> Color {
    match theme {
        Theme::Day => DAY_PRIMARY,
        Theme::Night => NIGHT_PRIMARY,
    }
}

fn fg(theme: Theme) -> Color {
    match theme {
        Theme::Day => DAY_FG,
        Theme::Night => NIGHT_FG,
    }
}

fn muted(theme: Theme) -> Color {
    match theme {
        Theme::Day => DAY_MUTED,
        Theme::Night => NIGHT_MUTED,
    }
}

fn highlight(theme: Theme) -> Color {
    match theme {
        Theme::Day => DAY_HIGHLIGHT,
        Theme::Night => NIGHT_HIGHLIGHT,
    }
}

/// Frame-wide base style; this is the body-level theme marker.
pub fn base_style(theme: Theme) -> Style {
    let bg = match theme {
        Theme::Day => DAY_BG,
        Theme::Night => NIGHT_BG,
    };
    Style::default().fg(fg(theme)).bg(bg)
}

pub fn title_style(theme: Theme) -> Style {
    Style::default()
        .fg(primary(theme))
        .add_modifier(Modifier::BOLD)
}

pub fn muted_style(theme: Theme) -> Style {
    Style::default().fg(muted(theme))
}

pub fn tab_style(selected: bool, theme: Theme) -> Style {
    if selected {
        Style::default()
            .fg(primary(theme))
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
    } else {
        Style::default().fg(fg(theme))
    }
}

pub fn selected_style(theme: Theme) -> Style {
    Style::default()
        .bg(highlight(theme))
        .add_modifier(Modifier::BOLD)
}

pub fn item_style(theme: Theme) -> Style {
    Style::default().fg(fg(theme))
}

pub fn done_style(theme: Theme) -> Style {
    let color = match theme {
        Theme::Day => DAY_DONE,
        Theme::Night => NIGHT_DONE,
    };
    Style::default().fg(color)
}

pub fn notes_style(theme: Theme) -> Style {
    Style::default()
        .fg(muted(theme))
        .add_modifier(Modifier::ITALIC)
}

pub fn status_bar_style(theme: Theme) -> Style {
    match theme {
        Theme::Day => Style::default().bg(DAY_HIGHLIGHT).fg(DAY_FG),
        Theme::Night => Style::default().bg(Color::Rgb(32, 32, 40)).fg(NIGHT_FG),
    }
}

pub fn help_key_style(theme: Theme) -> Style {
    Style::default()
        .fg(primary(theme))
        .add_modifier(Modifier::BOLD)
}

pub fn help_desc_style(theme: Theme) -> Style {
    Style::default().fg(fg(theme))
}
