//! Poll repository port
//!
//! Defines the storage contract for polls, choices, responses, users and
//! guild registrations. The repository is the arbiter of concurrent writes:
//! the unique keys on (poll, symbol), (user, choice) and poll message id
//! turn racing duplicates into [`RepositoryError::Conflict`] instead of
//! silently duplicating data, and ending a poll is idempotent.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pollbot_domain::{
    Choice, ChoiceId, GuildId, InternalGuildId, InternalUserId, MessageId, NewPoll, Poll, PollId,
    UserId,
};
use thiserror::Error;

/// Errors that can occur during repository operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// A uniqueness constraint rejected the write.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The record being written against no longer exists.
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Storage for polls and everything hanging off them.
///
/// Deleting a poll cascades to its choices, and deleting a choice cascades
/// to its responses.
#[async_trait]
pub trait PollRepository: Send + Sync {
    // ==================== Users & guilds ====================

    /// Internal id for a platform user, created on first reference.
    async fn user_id(&self, user: UserId) -> Result<InternalUserId, RepositoryError>;

    /// Register a guild, returning the existing id if already registered.
    async fn register_guild(&self, guild: GuildId) -> Result<InternalGuildId, RepositoryError>;

    /// Internal id of a registered guild.
    async fn guild_id(&self, guild: GuildId) -> Result<Option<InternalGuildId>, RepositoryError>;

    // ==================== Polls ====================

    /// Store a new open poll.
    ///
    /// Fails with `Conflict` if another poll already renders into the same
    /// message.
    async fn create_poll(&self, poll: NewPoll) -> Result<Poll, RepositoryError>;

    async fn poll(&self, id: PollId) -> Result<Option<Poll>, RepositoryError>;

    async fn poll_by_message(&self, message: MessageId) -> Result<Option<Poll>, RepositoryError>;

    /// Every poll whose `ended` flag is still false.
    async fn open_polls(&self) -> Result<Vec<Poll>, RepositoryError>;

    async fn update_end_date(
        &self,
        id: PollId,
        end_date: DateTime<Utc>,
    ) -> Result<(), RepositoryError>;

    /// Point a poll at a new rendered message.
    async fn update_message_id(&self, id: PollId, message: MessageId)
    -> Result<(), RepositoryError>;

    /// Set `ended = true`.
    ///
    /// Idempotent: returns `Ok(false)` if the poll had already ended or no
    /// longer exists.
    async fn set_ended(&self, id: PollId) -> Result<bool, RepositoryError>;

    /// Remove a poll with its choices and responses. `Ok(false)` if absent.
    async fn delete_poll(&self, id: PollId) -> Result<bool, RepositoryError>;

    // ==================== Choices ====================

    /// Fails with `Conflict` if the poll already has a choice for `symbol`,
    /// `NotFound` if the poll is gone.
    async fn create_choice(
        &self,
        poll: PollId,
        symbol: &str,
        text: &str,
    ) -> Result<Choice, RepositoryError>;

    async fn choice(&self, poll: PollId, symbol: &str) -> Result<Option<Choice>, RepositoryError>;

    /// All choices of a poll in creation order.
    async fn choices(&self, poll: PollId) -> Result<Vec<Choice>, RepositoryError>;

    // ==================== Responses ====================

    async fn has_response(
        &self,
        user: InternalUserId,
        choice: ChoiceId,
    ) -> Result<bool, RepositoryError>;

    /// Fails with `Conflict` on a duplicate vote, `NotFound` if the choice
    /// is gone.
    async fn create_response(
        &self,
        user: InternalUserId,
        choice: ChoiceId,
    ) -> Result<(), RepositoryError>;

    /// Fails with `Conflict` if there was no such response to remove.
    async fn delete_response(
        &self,
        user: InternalUserId,
        choice: ChoiceId,
    ) -> Result<(), RepositoryError>;

    /// Platform ids of everyone who voted for a choice, in voting order.
    async fn voters(&self, choice: ChoiceId) -> Result<Vec<UserId>, RepositoryError>;
}
