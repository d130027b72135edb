//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod chat_transport;
pub mod clock;
pub mod poll_event_logger;
pub mod poll_repository;
