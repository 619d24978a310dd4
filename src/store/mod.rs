//! Durable key/value state for the UI.
//!
//! This module provides the `StateStore`, the persistence layer for the
//! active tab, theme mode, and per-item done flags. It is passed explicitly
//! to the parts that mutate state rather than accessed as a global.

pub mod kv;

pub use kv::{keys, StateStore};
