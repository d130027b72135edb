//! Domain layer for pollbot
//!
//! This crate contains the poll entities, value objects and pure algorithms.
//! It has no dependencies on storage, transport or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Poll
//!
//! A timed, multi-choice vote rendered as a single chat message. Users vote
//! by reacting to the message; the reaction bar is a row of buttons, not the
//! ballot itself. Votes live in the repository.
//!
//! ## Choice / Response
//!
//! - **Choice**: an option identified by a reaction symbol, unique per poll
//! - **Response**: a (user, choice) pair, whose existence is the vote
//!
//! ## Tally
//!
//! The ordered, truncated vote summary rendered under a poll.

pub mod chat;
pub mod core;
pub mod poll;
pub mod tally;

// Re-export commonly used types
pub use chat::{ChatEvent, ChatMessage, ChatUser, Embed, EmbedField, MessageContent, ReactionEvent};
pub use core::ids::{
    ChannelId, ChoiceId, GuildId, InternalGuildId, InternalUserId, MessageId, PollId, UserId,
};
pub use poll::{
    choice_input::{ChoiceDraft, ChoiceInputError},
    duration::DurationSpec,
    entities::{Choice, NewPoll, Poll, PollState},
    symbol::{
        ADD_CHOICE_SYMBOL, CONFIRM_SYMBOL, CONTROL_SYMBOLS, DECLINE_SYMBOL, DELETE_SYMBOL,
        END_POLL_SYMBOL, ReactionKind, is_control_symbol,
    },
};
pub use tally::{Tally, TallyEntry};
