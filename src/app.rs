//! Application state management for Checkmate.
//!
//! This module contains the core `App` struct: tab selection, per-item done
//! flags, note disclosures, the day/night theme, the derived status line,
//! and coordination with the bundle cache over a background task channel.

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::{AssetRequest, CacheController};
use crate::models::{Checklist, ChecklistSet, Theme};
use crate::store::{keys, StateStore};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the cache event channel.
/// Install, activate, and a checklist refresh fit comfortably in 8.
const CHANNEL_BUFFER_SIZE: usize = 8;

/// Tab name shown in the status line when no tab is resolvable.
pub const DEFAULT_TAB_NAME: &str = "Preflight";

/// Bundle entry the app itself consumes.
const CHECKLISTS_PATH: &str = "checklists.json";

// ============================================================================
// UI State Types
// ============================================================================

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    ShowingHelp,
    ConfirmingQuit,
    Quitting,
}

/// Runtime state of one panel: done and disclosure-open flags per item.
#[derive(Debug, Clone, Default)]
pub struct PanelState {
    pub done: Vec<bool>,
    pub open: Vec<bool>,
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Events sent from background cache tasks back to the main loop.
pub enum CacheEvent {
    /// The bundle manifest was pre-seeded into the current generation
    Installed,
    /// Superseded generations were purged (count)
    Activated(usize),
    /// Fresh checklist data is available
    Checklists(ChecklistSet),
    /// A background operation failed
    Error(String),
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    // Core services
    pub store: StateStore,
    pub cache: CacheController,

    // UI state
    pub state: AppState,
    pub theme: Theme,
    pub tabs: Vec<Checklist>,
    pub panels: Vec<PanelState>,
    pub selected_tab: usize,
    pub item_selection: usize,
    pub status_line: String,
    pub status_message: Option<String>,
    pub bundle_cached_at: Option<DateTime<Utc>>,

    // Background task channel
    event_rx: mpsc::Receiver<CacheEvent>,
    event_tx: mpsc::Sender<CacheEvent>,
}

impl App {
    /// Create the application, restoring the persisted theme.
    pub fn new(store: StateStore, cache: CacheController) -> Self {
        let theme = Theme::from_stored(store.get(keys::THEME));
        debug!(?theme, "Theme restored");

        let (event_tx, event_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        let mut app = Self {
            store,
            cache,
            state: AppState::Normal,
            theme,
            tabs: Vec::new(),
            panels: Vec::new(),
            selected_tab: 0,
            item_selection: 0,
            status_line: String::new(),
            status_message: None,
            bundle_cached_at: None,
            event_rx,
            event_tx,
        };
        app.update_status_line();
        app
    }

    // =========================================================================
    // Cache coordination
    // =========================================================================

    /// Kick off the cache lifecycle in the background: install the bundle if
    /// this generation has not been seeded yet, purge superseded generations,
    /// then load the checklist data through the cache.
    pub fn bootstrap(&self) -> JoinHandle<()> {
        let cache = self.cache.clone();
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            if !cache.is_installed() {
                match cache.install().await {
                    Ok(()) => {
                        let _ = tx.send(CacheEvent::Installed).await;
                    }
                    Err(e) => {
                        // A failed install leaves every prior generation on
                        // disk, so cleanup is skipped entirely
                        warn!(error = %e, "Bundle install failed");
                        let _ = tx
                            .send(CacheEvent::Error(format!("Install failed: {}", e)))
                            .await;
                        Self::load_checklists(cache, tx).await;
                        return;
                    }
                }
            }

            match cache.activate() {
                Ok(purged) => {
                    let _ = tx.send(CacheEvent::Activated(purged)).await;
                }
                Err(e) => {
                    let _ = tx
                        .send(CacheEvent::Error(format!("Cache cleanup failed: {}", e)))
                        .await;
                }
            }

            Self::load_checklists(cache, tx).await;
        })
    }

    /// Re-fetch the checklist data (stale-while-revalidate through the cache).
    pub fn refresh(&self) -> JoinHandle<()> {
        let cache = self.cache.clone();
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            Self::load_checklists(cache, tx).await;
        })
    }

    async fn load_checklists(cache: CacheController, tx: mpsc::Sender<CacheEvent>) {
        match cache.fetch(&AssetRequest::get(CHECKLISTS_PATH)).await {
            Ok(asset) => match ChecklistSet::from_json(&asset.body) {
                Ok(set) => {
                    let _ = tx.send(CacheEvent::Checklists(set)).await;
                }
                Err(e) => {
                    warn!(error = %e, "Malformed checklist data");
                    let _ = tx
                        .send(CacheEvent::Error(format!("Malformed checklist data: {}", e)))
                        .await;
                }
            },
            Err(e) => {
                let _ = tx.send(CacheEvent::Error(e.to_string())).await;
            }
        }
    }

    /// Drain pending cache events and apply them. Called every loop tick.
    pub fn check_cache_events(&mut self) {
        let mut drained = false;
        while let Ok(event) = self.event_rx.try_recv() {
            drained = true;
            match event {
                CacheEvent::Installed => {
                    info!("Bundle installed");
                    self.status_message = Some("Bundle installed".to_string());
                }
                CacheEvent::Activated(purged) => {
                    if purged > 0 {
                        self.status_message =
                            Some(format!("Cleaned up {} old cache generation(s)", purged));
                    }
                }
                CacheEvent::Checklists(set) => {
                    self.apply_checklists(set);
                    self.status_message = None;
                }
                CacheEvent::Error(msg) => {
                    self.status_message = Some(msg);
                }
            }
        }
        // The timestamp only moves when a background task has run, so the
        // entry is not re-read on idle ticks
        if drained {
            self.bundle_cached_at = self.cache.bundle_cached_at();
        }
    }

    /// Install checklist data: rebuild tabs and panels, restore persisted
    /// done flags and the previously selected tab.
    pub fn apply_checklists(&mut self, set: ChecklistSet) {
        self.tabs = set.checklists;
        self.panels.clear();

        let mut global_index = 0;
        for tab in &self.tabs {
            let mut panel = PanelState::default();
            for item in &tab.items {
                let done = self.store.item_done(&item.done_id(global_index));
                panel.done.push(done);
                panel.open.push(false);
                global_index += 1;
            }
            self.panels.push(panel);
        }

        self.restore_initial_tab();
        self.update_status_line();
    }

    // =========================================================================
    // Tab navigation
    // =========================================================================

    /// Select tab `index`: exclusive selection, persisted, status recomputed.
    pub fn select_tab(&mut self, index: usize) {
        if self.tabs.is_empty() {
            return;
        }
        self.selected_tab = index.min(self.tabs.len() - 1);
        self.item_selection = 0;

        let name = self.tabs[self.selected_tab].name.clone();
        if let Err(e) = self.store.set(keys::ACTIVE_TAB, &name) {
            warn!(error = %e, "Failed to persist active tab");
        }
        self.update_status_line();
    }

    pub fn next_tab(&mut self) {
        if !self.tabs.is_empty() {
            self.select_tab((self.selected_tab + 1) % self.tabs.len());
        }
    }

    pub fn prev_tab(&mut self) {
        if !self.tabs.is_empty() {
            let n = self.tabs.len();
            self.select_tab((self.selected_tab + n - 1) % n);
        }
    }

    pub fn first_tab(&mut self) {
        self.select_tab(0);
    }

    pub fn last_tab(&mut self) {
        if !self.tabs.is_empty() {
            self.select_tab(self.tabs.len() - 1);
        }
    }

    /// Restore the persisted tab selection, guarding against names from a
    /// prior bundle version; unknown names fall back to the first tab.
    fn restore_initial_tab(&mut self) {
        let saved = self.store.get(keys::ACTIVE_TAB).map(|s| s.to_string());
        let index = saved
            .and_then(|name| self.tabs.iter().position(|t| t.name == name))
            .unwrap_or(0);
        self.select_tab(index);
    }

    /// Selection flags for the tab row; exactly one is true whenever any
    /// tabs exist.
    pub fn selected_flags(&self) -> Vec<bool> {
        (0..self.tabs.len())
            .map(|i| i == self.selected_tab)
            .collect()
    }

    // =========================================================================
    // Item state
    // =========================================================================

    pub fn move_selection(&mut self, delta: isize) {
        let Some(panel) = self.panels.get(self.selected_tab) else {
            return;
        };
        if panel.done.is_empty() {
            return;
        }
        let len = panel.done.len() as isize;
        let next = (self.item_selection as isize + delta).clamp(0, len - 1);
        self.item_selection = next as usize;
    }

    /// Flip the done flag of item `item` in tab `tab`, persisting it under
    /// the item's label-derived key.
    pub fn toggle_item_done(&mut self, tab: usize, item: usize) {
        let Some(id) = self
            .tabs
            .get(tab)
            .and_then(|t| t.items.get(item))
            .map(|i| i.done_id(self.global_index(tab, item)))
        else {
            return;
        };

        let flag = &mut self.panels[tab].done[item];
        *flag = !*flag;
        let done = *flag;

        if let Err(e) = self.store.set_item_done(&id, done) {
            warn!(error = %e, item = %id, "Failed to persist done state");
        }
        self.update_status_line();
    }

    pub fn toggle_selected_item_done(&mut self) {
        self.toggle_item_done(self.selected_tab, self.item_selection);
    }

    /// Control label for an item's done button.
    pub fn done_button_label(done: bool) -> &'static str {
        if done {
            "Done"
        } else {
            "Mark done"
        }
    }

    /// Position of the item across the whole bundle, matching the original
    /// document-order fallback identifier.
    fn global_index(&self, tab: usize, item: usize) -> usize {
        self.tabs[..tab].iter().map(|t| t.items.len()).sum::<usize>() + item
    }

    // =========================================================================
    // Disclosures
    // =========================================================================

    /// Toggle the note disclosure under the selected item. Items without
    /// notes have nothing to disclose.
    pub fn toggle_selected_disclosure(&mut self) {
        let tab = self.selected_tab;
        let item = self.item_selection;
        let has_notes = self
            .tabs
            .get(tab)
            .and_then(|t| t.items.get(item))
            .map(|i| i.notes.is_some())
            .unwrap_or(false);
        if !has_notes {
            return;
        }
        if let Some(open) = self.panels.get_mut(tab).and_then(|p| p.open.get_mut(item)) {
            *open = !*open;
        }
    }

    /// Open every disclosure in the currently active panel only.
    pub fn expand_all(&mut self) {
        if let Some(panel) = self.panels.get_mut(self.selected_tab) {
            panel.open.iter_mut().for_each(|o| *o = true);
        }
    }

    /// Close every disclosure in the currently active panel only.
    pub fn collapse_all(&mut self) {
        if let Some(panel) = self.panels.get_mut(self.selected_tab) {
            panel.open.iter_mut().for_each(|o| *o = false);
        }
    }

    // =========================================================================
    // Theme & status line
    // =========================================================================

    /// Flip day/night, persist, recompute the status line.
    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
        if let Err(e) = self.store.set(keys::THEME, self.theme.as_str()) {
            warn!(error = %e, "Failed to persist theme");
        }
        self.update_status_line();
    }

    /// Recompute the derived status line. Pure derivation from current
    /// state; counts span every checklist, not just the active panel.
    pub fn update_status_line(&mut self) {
        let total: usize = self.panels.iter().map(|p| p.done.len()).sum();
        let done: usize = self
            .panels
            .iter()
            .map(|p| p.done.iter().filter(|&&d| d).count())
            .sum();
        let tab_name = self
            .tabs
            .get(self.selected_tab)
            .map(|t| t.name.as_str())
            .unwrap_or(DEFAULT_TAB_NAME);

        self.status_line = format!(
            "{} theme. {}/{} items done. Viewing: {}.",
            self.theme.display_name(),
            done,
            total,
            tab_name
        );
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Arc;

    use super::*;
    use crate::cache::{CachedAsset, NullOrigin, CACHE_GENERATION};
    use crate::models::{Checklist, ChecklistItem};

    fn test_app(dir: &tempfile::TempDir) -> App {
        let store = StateStore::open(dir.path().join("state.json")).unwrap();
        let cache = CacheController::new(dir.path().join("cache"), Arc::new(NullOrigin)).unwrap();
        App::new(store, cache)
    }

    /// Write a checklist entry straight into the current generation directory.
    fn seed_checklists(dir: &Path, body: &[u8]) {
        let generation = dir.join("cache").join(CACHE_GENERATION);
        std::fs::create_dir_all(&generation).unwrap();
        let asset = CachedAsset {
            path: "checklists.json".to_string(),
            content_type: None,
            body: body.to_vec(),
            cached_at: Utc::now(),
        };
        std::fs::write(
            generation.join("checklists.json.json"),
            serde_json::to_string(&asset).unwrap(),
        )
        .unwrap();
    }

    fn item(label: &str, notes: Option<&str>) -> ChecklistItem {
        ChecklistItem {
            label: label.to_string(),
            notes: notes.map(|n| n.to_string()),
        }
    }

    fn three_tabs() -> ChecklistSet {
        ChecklistSet {
            checklists: vec![
                Checklist {
                    name: "Preflight".to_string(),
                    items: vec![item("A", Some("note a")), item("B", None)],
                },
                Checklist {
                    name: "Runup".to_string(),
                    items: vec![item("C", Some("note c"))],
                },
                Checklist {
                    name: "Postflight".to_string(),
                    items: vec![item("D", None)],
                },
            ],
        }
    }

    #[test]
    fn test_tab_wraparound_law() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(&dir);
        app.apply_checklists(three_tabs());

        let n = app.tabs.len();
        for start in 0..n {
            app.select_tab(start);
            for _ in 0..n {
                app.next_tab();
            }
            assert_eq!(app.selected_tab, start);

            for _ in 0..n {
                app.prev_tab();
            }
            assert_eq!(app.selected_tab, start);
        }
    }

    #[test]
    fn test_exactly_one_tab_selected() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(&dir);
        app.apply_checklists(three_tabs());

        app.next_tab();
        app.next_tab();
        app.prev_tab();
        app.last_tab();
        app.first_tab();
        app.next_tab();

        let flags = app.selected_flags();
        assert_eq!(flags.iter().filter(|&&f| f).count(), 1);
    }

    #[test]
    fn test_home_end_navigation() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(&dir);
        app.apply_checklists(three_tabs());

        app.last_tab();
        assert_eq!(app.selected_tab, 2);
        app.first_tab();
        assert_eq!(app.selected_tab, 0);
    }

    #[test]
    fn test_double_toggle_restores_done_state() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(&dir);
        app.apply_checklists(three_tabs());

        assert!(!app.panels[0].done[0]);
        assert_eq!(App::done_button_label(app.panels[0].done[0]), "Mark done");

        app.toggle_item_done(0, 0);
        assert!(app.panels[0].done[0]);
        assert_eq!(app.store.get("itemDone:A"), Some("1"));
        assert_eq!(App::done_button_label(app.panels[0].done[0]), "Done");

        app.toggle_item_done(0, 0);
        assert!(!app.panels[0].done[0]);
        assert_eq!(app.store.get("itemDone:A"), Some("0"));
        assert_eq!(App::done_button_label(app.panels[0].done[0]), "Mark done");
    }

    #[test]
    fn test_done_state_restored_on_reload() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut app = test_app(&dir);
            app.apply_checklists(three_tabs());
            app.toggle_item_done(1, 0); // C
        }

        let mut app = test_app(&dir);
        app.apply_checklists(three_tabs());
        assert!(app.panels[1].done[0]);
        assert!(!app.panels[0].done[0]);
    }

    #[test]
    fn test_theme_persists_and_defaults_to_night() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut app = test_app(&dir);
            assert_eq!(app.theme, Theme::Night);
            app.toggle_theme();
            assert_eq!(app.theme, Theme::Day);
        }

        let app = test_app(&dir);
        assert_eq!(app.theme, Theme::Day);

        let fresh_dir = tempfile::tempdir().unwrap();
        let app = test_app(&fresh_dir);
        assert_eq!(app.theme, Theme::Night);
    }

    #[test]
    fn test_status_line_scenario() {
        // Items [A=0, B=0, C=1], theme night, viewing Postflight
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(&dir);
        app.store.set_item_done("C", true).unwrap();
        app.apply_checklists(ChecklistSet {
            checklists: vec![
                Checklist {
                    name: "Preflight".to_string(),
                    items: vec![item("A", None), item("B", None)],
                },
                Checklist {
                    name: "Postflight".to_string(),
                    items: vec![item("C", None)],
                },
            ],
        });
        app.select_tab(1);

        assert_eq!(
            app.status_line,
            "Night theme. 1/3 items done. Viewing: Postflight."
        );
    }

    #[test]
    fn test_status_line_fallback_tab_name() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(&dir);
        assert_eq!(
            app.status_line,
            "Night theme. 0/0 items done. Viewing: Preflight."
        );
    }

    #[test]
    fn test_restore_tab_guards_stale_identifier() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(&dir);
        app.store.set(keys::ACTIVE_TAB, "Avionics").unwrap();
        app.apply_checklists(three_tabs());
        assert_eq!(app.selected_tab, 0);

        // A valid persisted name is honored on the next load
        app.select_tab(2);
        let mut reloaded = test_app(&dir);
        reloaded.apply_checklists(three_tabs());
        assert_eq!(reloaded.selected_tab, 2);
    }

    #[test]
    fn test_expand_collapse_scoped_to_active_panel() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(&dir);
        app.apply_checklists(three_tabs());

        app.select_tab(0);
        app.expand_all();
        assert!(app.panels[0].open.iter().all(|&o| o));
        assert!(app.panels[1].open.iter().all(|&o| !o));

        app.select_tab(1);
        app.expand_all();
        app.select_tab(0);
        app.collapse_all();
        assert!(app.panels[0].open.iter().all(|&o| !o));
        assert!(app.panels[1].open.iter().all(|&o| o));
    }

    #[test]
    fn test_disclosure_toggle_requires_notes() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(&dir);
        app.apply_checklists(three_tabs());

        // A has notes
        app.item_selection = 0;
        app.toggle_selected_disclosure();
        assert!(app.panels[0].open[0]);
        app.toggle_selected_disclosure();
        assert!(!app.panels[0].open[0]);

        // B has none
        app.item_selection = 1;
        app.toggle_selected_disclosure();
        assert!(!app.panels[0].open[1]);
    }

    #[tokio::test]
    async fn test_failed_install_leaves_previous_generation() {
        let dir = tempfile::tempdir().unwrap();
        let old = dir.path().join("cache").join("checkmate-bundle-v0");
        std::fs::create_dir_all(&old).unwrap();
        std::fs::write(old.join("index.html.json"), b"{}").unwrap();

        // NullOrigin makes the install fail; the old generation must survive
        let mut app = test_app(&dir);
        app.bootstrap().await.unwrap();
        app.check_cache_events();

        assert!(old.join("index.html.json").exists());
        assert!(!app.cache.is_installed());
        assert!(app.status_message.is_some());
    }

    #[tokio::test]
    async fn test_successful_bootstrap_purges_old_generations() {
        let dir = tempfile::tempdir().unwrap();
        let old = dir.path().join("cache").join("checkmate-bundle-v0");
        std::fs::create_dir_all(&old).unwrap();

        let mut app = test_app(&dir);
        seed_checklists(dir.path(), br#"{"checklists":[]}"#);

        // Already installed, so bootstrap goes straight to cleanup
        app.bootstrap().await.unwrap();
        app.check_cache_events();

        assert!(!old.exists());
        assert!(app.cache.is_installed());
    }

    #[tokio::test]
    async fn test_bundle_timestamp_tracks_cache_events() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(&dir);
        seed_checklists(dir.path(), br#"{"checklists":[]}"#);

        // An idle tick with no pending events does not re-read the entry
        app.check_cache_events();
        assert!(app.bundle_cached_at.is_none());

        app.refresh().await.unwrap();
        app.check_cache_events();
        assert!(app.bundle_cached_at.is_some());
    }

    #[test]
    fn test_positional_fallback_key() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(&dir);
        app.apply_checklists(ChecklistSet {
            checklists: vec![Checklist {
                name: "Preflight".to_string(),
                items: vec![item("A", None), item("", None)],
            }],
        });

        app.toggle_item_done(0, 1);
        assert_eq!(app.store.get("itemDone:item-1"), Some("1"));
    }
}
