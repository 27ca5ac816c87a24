//! UI layer for the dial shell.

pub mod app;

pub use app::{DialApp, PREFS_STORAGE_KEY};
