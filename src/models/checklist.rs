//! Domain models for the checklist bundle.
//!
//! `checklists.json` inside the published bundle defines the tabs the TUI
//! renders: one `Checklist` per tab, each with a list of items. Items may
//! carry a notes disclosure that can be expanded inline.

use serde::{Deserialize, Serialize};

/// The parsed `checklists.json` payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChecklistSet {
    #[serde(default)]
    pub checklists: Vec<Checklist>,
}

impl ChecklistSet {
    /// Parse a bundle's `checklists.json` body.
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

/// One tab/panel pair: a named checklist and its items.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Checklist {
    pub name: String,
    #[serde(default)]
    pub items: Vec<ChecklistItem>,
}

/// A single checklist item. `notes` feeds the expandable disclosure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChecklistItem {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub notes: Option<String>,
}

impl ChecklistItem {
    /// Stable identifier for done-state persistence: the trimmed label text,
    /// or a positional fallback when the label is empty. Duplicate labels
    /// collide, as the original behavior does.
    pub fn done_id(&self, global_index: usize) -> String {
        let label = self.label.trim();
        if label.is_empty() {
            format!("item-{}", global_index)
        } else {
            label.to_string()
        }
    }
}
