//! Worker-thread bridge between the UI command queue and the scene host.

pub mod commands;
pub mod runtime;
