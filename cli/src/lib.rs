//! mission-cli library: command handlers and the terminal dashboard, exposed for tests.

pub mod commands;
pub mod context;
pub mod tui;
