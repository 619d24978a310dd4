//! Keyboard input handling for the TUI.
//!
//! This module translates key events into application state changes. Tab
//! navigation consumes the arrow/Home/End keys so they never fall through
//! to list scrolling, and Space is consumed by the disclosure toggle.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use crate::app::{App, AppState};

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    // Handle help overlay
    if matches!(app.state, AppState::ShowingHelp) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.state = AppState::Normal;
        }
        return Ok(false);
    }

    // Handle quit confirmation
    if matches!(app.state, AppState::ConfirmingQuit) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.state = AppState::Quitting;
                return Ok(true);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return Ok(false);
    }

    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
        }

        // Tab navigation, wrapping at both ends
        KeyCode::Right => app.next_tab(),
        KeyCode::Left => app.prev_tab(),
        KeyCode::Home => app.first_tab(),
        KeyCode::End => app.last_tab(),

        // Item selection within the active panel
        KeyCode::Up | KeyCode::Char('k') => app.move_selection(-1),
        KeyCode::Down | KeyCode::Char('j') => app.move_selection(1),

        // Disclosure toggle on the selected item
        KeyCode::Enter | KeyCode::Char(' ') => app.toggle_selected_disclosure(),

        // Done toggle on the selected item
        KeyCode::Char('d') => app.toggle_selected_item_done(),

        // Disclosures across the active panel only
        KeyCode::Char('e') => app.expand_all(),
        KeyCode::Char('c') => app.collapse_all(),

        KeyCode::Char('t') => app.toggle_theme(),

        KeyCode::Char('r') => {
            app.status_message = Some("Refreshing...".to_string());
            app.refresh();
        }

        _ => {}
    }

    Ok(false)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crossterm::event::{KeyEvent, KeyModifiers};

    use super::*;
    use crate::cache::{CacheController, NullOrigin};
    use crate::models::{Checklist, ChecklistItem, ChecklistSet, Theme};
    use crate::store::StateStore;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn test_app(dir: &tempfile::TempDir) -> App {
        let store = StateStore::open(dir.path().join("state.json")).unwrap();
        let cache = CacheController::new(dir.path().join("cache"), Arc::new(NullOrigin)).unwrap();
        let mut app = App::new(store, cache);
        app.apply_checklists(ChecklistSet {
            checklists: vec![
                Checklist {
                    name: "Preflight".to_string(),
                    items: vec![
                        ChecklistItem {
                            label: "A".to_string(),
                            notes: Some("note".to_string()),
                        },
                        ChecklistItem {
                            label: "B".to_string(),
                            notes: None,
                        },
                    ],
                },
                Checklist {
                    name: "Postflight".to_string(),
                    items: vec![ChecklistItem {
                        label: "C".to_string(),
                        notes: None,
                    }],
                },
            ],
        });
        app
    }

    #[test]
    fn test_arrow_keys_wrap_tabs() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(&dir);

        handle_input(&mut app, key(KeyCode::Right)).unwrap();
        assert_eq!(app.selected_tab, 1);
        handle_input(&mut app, key(KeyCode::Right)).unwrap();
        assert_eq!(app.selected_tab, 0);
        handle_input(&mut app, key(KeyCode::Left)).unwrap();
        assert_eq!(app.selected_tab, 1);
    }

    #[test]
    fn test_home_end_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(&dir);

        handle_input(&mut app, key(KeyCode::End)).unwrap();
        assert_eq!(app.selected_tab, 1);
        handle_input(&mut app, key(KeyCode::Home)).unwrap();
        assert_eq!(app.selected_tab, 0);
    }

    #[test]
    fn test_space_toggles_disclosure_without_moving_selection() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(&dir);

        assert_eq!(app.item_selection, 0);
        handle_input(&mut app, key(KeyCode::Char(' '))).unwrap();
        assert!(app.panels[0].open[0]);
        assert_eq!(app.item_selection, 0);

        handle_input(&mut app, key(KeyCode::Enter)).unwrap();
        assert!(!app.panels[0].open[0]);
    }

    #[test]
    fn test_done_key_toggles_selected_item() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(&dir);

        handle_input(&mut app, key(KeyCode::Char('d'))).unwrap();
        assert!(app.panels[0].done[0]);
        handle_input(&mut app, key(KeyCode::Char('d'))).unwrap();
        assert!(!app.panels[0].done[0]);
    }

    #[test]
    fn test_theme_key() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(&dir);

        assert_eq!(app.theme, Theme::Night);
        handle_input(&mut app, key(KeyCode::Char('t'))).unwrap();
        assert_eq!(app.theme, Theme::Day);
    }

    #[test]
    fn test_quit_requires_confirmation() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(&dir);

        let quit = handle_input(&mut app, key(KeyCode::Char('q'))).unwrap();
        assert!(!quit);
        assert_eq!(app.state, AppState::ConfirmingQuit);

        let quit = handle_input(&mut app, key(KeyCode::Char('n'))).unwrap();
        assert!(!quit);
        assert_eq!(app.state, AppState::Normal);

        handle_input(&mut app, key(KeyCode::Char('q'))).unwrap();
        let quit = handle_input(&mut app, key(KeyCode::Char('y'))).unwrap();
        assert!(quit);
        assert_eq!(app.state, AppState::Quitting);
    }

    #[test]
    fn test_expand_key_scoped_to_active_panel() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(&dir);

        handle_input(&mut app, key(KeyCode::Char('e'))).unwrap();
        assert!(app.panels[0].open.iter().all(|&o| o));
        assert!(app.panels[1].open.iter().all(|&o| !o));

        handle_input(&mut app, key(KeyCode::Char('c'))).unwrap();
        assert!(app.panels[0].open.iter().all(|&o| !o));
    }
}
