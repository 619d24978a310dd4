//! Data models for the checklist bundle.
//!
//! - `ChecklistSet`, `Checklist`, `ChecklistItem`: the tabs and items parsed
//!   from the bundle's `checklists.json`
//! - `Theme`: the day/night display mode

pub mod checklist;
pub mod theme;

pub use checklist::{Checklist, ChecklistItem, ChecklistSet};
pub use theme::Theme;
