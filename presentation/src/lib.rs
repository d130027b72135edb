//! Presentation layer for pollbot
//!
//! This crate contains the CLI definition, the console formatter for
//! platform activity, and the interactive console chat.

pub mod chat;
pub mod cli;
pub mod output;

// Re-export commonly used types
pub use chat::{ChatRepl, ConsoleInput};
pub use cli::commands::Cli;
pub use output::activity::ActivityView;
pub use output::console::ConsoleFormatter;
