//! Logging infrastructure: structured poll event logging.
//!
//! Provides [`JsonlPollEventLogger`], a JSONL file writer that implements
//! the [`PollEventLogger`](pollbot_application::PollEventLogger) port.

mod jsonl_logger;

pub use jsonl_logger::JsonlPollEventLogger;
