//! Interactive console chat
//!
//! Reads stdin lines and turns them into user actions on the local chat
//! platform.

mod command;
mod repl;

pub use command::ConsoleInput;
pub use repl::ChatRepl;
