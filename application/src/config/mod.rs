//! Application-level configuration.
//!
//! - [`PollSettings`]: daemon period, dialog windows and tally display limits

pub mod poll_settings;

pub use poll_settings::PollSettings;
