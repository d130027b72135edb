//! Application layer for pollbot
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::PollSettings;
pub use ports::{
    chat_transport::{ChatTransport, EventFilter, TransportError, WaitOutcome},
    clock::{Clock, ManualClock, SystemClock},
    poll_event_logger::{NoPollEventLogger, PollEvent, PollEventLogger},
    poll_repository::{PollRepository, RepositoryError},
};
pub use use_cases::commands::{CommandInvocation, CommandOutcome, PollCommands};
pub use use_cases::context::PollContext;
pub use use_cases::dispatch::ReactionDispatcher;
pub use use_cases::error::PollActionError;
pub use use_cases::lifecycle::{ActionOutcome, CreatePoll, PollLifecycle, VoteToggle};
pub use use_cases::prompt::{
    ChoiceEntryDialog, Confirmation, ConfirmationDialog, DeclineReason, PromptOutcome,
};
pub use use_cases::reconcile::{ReconciliationDaemon, TickReport};
pub use use_cases::router::{ReactionRouter, RouteOutcome};
