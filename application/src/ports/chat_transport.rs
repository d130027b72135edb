//! Chat transport port
//!
//! Defines how the application talks to the chat platform: posting and
//! editing messages, managing reactions, checking the admin capability and
//! waiting for follow-up events.
//!
//! The rendered reaction bar is disposable UI. Nothing here is a source of
//! truth for votes, but the *order* of a message's reactions is what the
//! tally projection sorts by.

use async_trait::async_trait;
use pollbot_domain::{ChannelId, ChatEvent, ChatMessage, GuildId, MessageContent, MessageId, UserId};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during chat transport operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The message was deleted (or never existed).
    #[error("Message {0} not found")]
    MessageNotFound(MessageId),

    /// The platform does not recognise the symbol as a reaction.
    #[error("Unknown emoji: {0}")]
    UnknownEmoji(String),

    /// The event feed is gone; no further events will arrive.
    #[error("Transport closed")]
    Closed,

    #[error("Transport error: {0}")]
    Other(String),
}

impl TransportError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, TransportError::MessageNotFound(_))
    }
}

/// Result of waiting for an event with a deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitOutcome<T> {
    Received(T),
    TimedOut,
}

/// Predicate selecting the event a waiter is interested in.
pub type EventFilter = Box<dyn Fn(&ChatEvent) -> bool + Send + Sync>;

/// Gateway to the chat platform.
///
/// Reactions added through this port are added as the bot user.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Our own account on the platform.
    fn bot_user(&self) -> UserId;

    async fn send_message(
        &self,
        channel: ChannelId,
        content: MessageContent,
    ) -> Result<ChatMessage, TransportError>;

    async fn edit_message(
        &self,
        channel: ChannelId,
        message: MessageId,
        content: MessageContent,
    ) -> Result<(), TransportError>;

    async fn delete_message(
        &self,
        channel: ChannelId,
        message: MessageId,
    ) -> Result<(), TransportError>;

    /// Fails with [`TransportError::MessageNotFound`] once the message is gone.
    async fn fetch_message(
        &self,
        channel: ChannelId,
        message: MessageId,
    ) -> Result<ChatMessage, TransportError>;

    /// Fails with [`TransportError::UnknownEmoji`] for unrecognised symbols.
    async fn add_reaction(
        &self,
        channel: ChannelId,
        message: MessageId,
        symbol: &str,
    ) -> Result<(), TransportError>;

    /// Remove one user's reaction.
    async fn remove_reaction(
        &self,
        channel: ChannelId,
        message: MessageId,
        symbol: &str,
        user: UserId,
    ) -> Result<(), TransportError>;

    /// Remove a symbol from the message entirely, for every user.
    async fn clear_reaction(
        &self,
        channel: ChannelId,
        message: MessageId,
        symbol: &str,
    ) -> Result<(), TransportError>;

    /// Whether the user holds the admin capability in the guild.
    async fn is_admin(&self, guild: Option<GuildId>, user: UserId) -> Result<bool, TransportError>;

    /// Suspend until an event matching `filter` arrives, or `timeout` passes.
    ///
    /// Only events delivered after the call starts are considered.
    async fn wait_for(
        &self,
        filter: EventFilter,
        timeout: Duration,
    ) -> Result<WaitOutcome<ChatEvent>, TransportError>;
}
