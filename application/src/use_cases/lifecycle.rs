//! Poll lifecycle controller
//!
//! State machine operations on a single poll:
//!
//! ```text
//!   create ──▶ Open ──(end_date reached, daemon: end_now)──▶ Ended
//!               │  ▲                                          │
//!               │  └── request_end (brings end_date to now)   │
//!               │                                             │
//!               └──────────── request_delete ─────────────────┴──▶ Deleted
//! ```
//!
//! Manual end is deferred: [`PollLifecycle::request_end`] only moves the end
//! date, and the next reconciliation tick performs the transition.
//! Correctness under concurrent reactions rests on the repository's unique
//! keys and its idempotent `set_ended`, not on locking here.

use super::context::PollContext;
use super::error::PollActionError;
use super::prompt::{
    ChoiceEntryDialog, Confirmation, ConfirmationDialog, DeclineReason, PromptOutcome,
    delete_quietly,
};
use crate::ports::chat_transport::TransportError;
use chrono::{DateTime, Utc};
use pollbot_domain::poll::content::{ended_description, open_poll_embed};
use pollbot_domain::{
    CONTROL_SYMBOLS, ChannelId, Choice, DELETE_SYMBOL, DurationSpec, GuildId, InternalGuildId,
    MessageContent, MessageId, NewPoll, Poll, PollId, UserId,
};
use serde_json::json;
use tracing::{debug, info};

const DELETE_QUESTION: &str =
    "Are you sure you want to delete the poll? All responses and choices will be deleted";
const END_QUESTION: &str = "Are you sure you want to end the poll now?";

/// Arguments of a create-poll request.
#[derive(Debug, Clone)]
pub struct CreatePoll {
    pub author: UserId,
    pub guild: Option<GuildId>,
    pub channel: ChannelId,
    /// Raw duration text, e.g. `1d2h`.
    pub duration: String,
    pub title: String,
}

/// Result of toggling a vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteToggle {
    Added,
    Removed,
    /// The symbol is not a choice of this poll.
    NoSuchChoice,
}

/// Result of a destructive request gated by permission and confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Performed,
    NotPermitted,
    Declined(DeclineReason),
}

impl ActionOutcome {
    pub fn is_performed(&self) -> bool {
        matches!(self, ActionOutcome::Performed)
    }
}

#[derive(Clone)]
pub struct PollLifecycle {
    ctx: PollContext,
}

impl PollLifecycle {
    pub fn new(ctx: PollContext) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &PollContext {
        &self.ctx
    }

    /// Post and persist a new open poll.
    ///
    /// Validation failures leave no trace on the platform or in storage. If
    /// persisting fails the posted message is removed again.
    pub async fn create(&self, request: CreatePoll) -> Result<Poll, PollActionError> {
        let delta = DurationSpec::parse(&request.duration)
            .filter(|spec| !spec.is_zero())
            .and_then(|spec| spec.to_time_delta())
            .ok_or(PollActionError::InvalidDuration)?;
        let title = request.title.trim();
        if title.is_empty() {
            return Err(PollActionError::MissingTitle);
        }
        let guild = match request.guild {
            Some(guild) => self.ctx.repository.guild_id(guild).await?,
            None => None,
        }
        .ok_or(PollActionError::GuildNotRegistered)?;

        let end_date = self
            .ctx
            .now()
            .checked_add_signed(delta)
            .ok_or(PollActionError::InvalidDuration)?;
        let message = self
            .ctx
            .transport
            .send_message(request.channel, open_poll_embed(title, end_date).into())
            .await?;

        match self.persist(&request, guild, message.id, title, end_date).await {
            Ok(poll) => {
                info!("Created poll {} \"{}\" ending {}", poll.id, poll.title, end_date);
                self.ctx.log(
                    "poll_created",
                    json!({
                        "poll_id": poll.id,
                        "title": poll.title,
                        "creator": request.author,
                        "channel_id": poll.channel_id,
                        "message_id": poll.message_id,
                        "end_date": poll.end_date,
                    }),
                );
                Ok(poll)
            }
            Err(e) => {
                delete_quietly(&self.ctx, request.channel, message.id).await;
                Err(e)
            }
        }
    }

    async fn persist(
        &self,
        request: &CreatePoll,
        guild: InternalGuildId,
        message: MessageId,
        title: &str,
        end_date: DateTime<Utc>,
    ) -> Result<Poll, PollActionError> {
        for symbol in CONTROL_SYMBOLS {
            self.ctx
                .transport
                .add_reaction(request.channel, message, symbol)
                .await?;
        }
        let creator = self.ctx.repository.user_id(request.author).await?;
        let poll = self
            .ctx
            .repository
            .create_poll(NewPoll {
                creator,
                channel_id: request.channel,
                message_id: message,
                guild,
                title: title.to_string(),
                end_date,
            })
            .await?;
        Ok(poll)
    }

    /// Run the choice-entry dialog for `user`.
    pub async fn add_choice(
        &self,
        poll: &Poll,
        user: UserId,
    ) -> Result<PromptOutcome<Choice>, PollActionError> {
        ChoiceEntryDialog::new(&self.ctx, poll, user).run().await
    }

    /// Flip `user`'s vote for the choice behind `symbol`.
    ///
    /// The poll is re-read first so a vote racing the daemon's end sees the
    /// latest state.
    pub async fn toggle_vote(
        &self,
        poll_id: PollId,
        user: UserId,
        symbol: &str,
    ) -> Result<VoteToggle, PollActionError> {
        let poll = self
            .ctx
            .repository
            .poll(poll_id)
            .await?
            .ok_or(PollActionError::PollNotFound(poll_id))?;
        if !poll.accepts_input(self.ctx.now()) {
            return Err(PollActionError::PollClosed(poll_id));
        }

        let Some(choice) = self.ctx.repository.choice(poll_id, symbol).await? else {
            return Ok(VoteToggle::NoSuchChoice);
        };
        let voter = self.ctx.repository.user_id(user).await?;

        let toggle = if self.ctx.repository.has_response(voter, choice.id).await? {
            self.ctx.repository.delete_response(voter, choice.id).await?;
            VoteToggle::Removed
        } else {
            self.ctx.repository.create_response(voter, choice.id).await?;
            VoteToggle::Added
        };

        debug!("Poll {}: {:?} {} for {}", poll_id, toggle, symbol, user);
        let event_type = match toggle {
            VoteToggle::Added => "vote_added",
            _ => "vote_removed",
        };
        self.ctx.log(
            event_type,
            json!({ "poll_id": poll_id, "choice_id": choice.id, "user": user }),
        );
        Ok(toggle)
    }

    /// Whether `user` may end or delete `poll`: its creator, or an admin.
    pub async fn may_manage(
        &self,
        poll: &Poll,
        user: UserId,
        guild: Option<GuildId>,
    ) -> Result<bool, PollActionError> {
        let internal = self.ctx.repository.user_id(user).await?;
        if poll.is_created_by(internal) {
            return Ok(true);
        }
        Ok(self.ctx.transport.is_admin(guild, user).await?)
    }

    /// Manual end: after confirmation, bring the end date forward to now.
    pub async fn request_end(
        &self,
        poll: &Poll,
        user: UserId,
        guild: Option<GuildId>,
    ) -> Result<ActionOutcome, PollActionError> {
        if !self.may_manage(poll, user, guild).await? {
            debug!("User {} may not end poll {}", user, poll.id);
            return Ok(ActionOutcome::NotPermitted);
        }

        match ConfirmationDialog::new(&self.ctx)
            .ask(poll.channel_id, user, END_QUESTION)
            .await?
        {
            Confirmation::Accepted => {}
            Confirmation::Declined(reason) => return Ok(ActionOutcome::Declined(reason)),
        }

        let now = self.ctx.now();
        self.ctx.repository.update_end_date(poll.id, now).await?;
        info!("Poll {} will end on the next tick", poll.id);
        self.ctx.log(
            "end_requested",
            json!({ "poll_id": poll.id, "user": user, "end_date": now }),
        );
        Ok(ActionOutcome::Performed)
    }

    /// Delete: after confirmation, end the poll, remove it with everything
    /// hanging off it, then remove its message.
    pub async fn request_delete(
        &self,
        poll: &Poll,
        user: UserId,
        guild: Option<GuildId>,
    ) -> Result<ActionOutcome, PollActionError> {
        if !self.may_manage(poll, user, guild).await? {
            debug!("User {} may not delete poll {}", user, poll.id);
            return Ok(ActionOutcome::NotPermitted);
        }

        match ConfirmationDialog::new(&self.ctx)
            .ask(poll.channel_id, user, DELETE_QUESTION)
            .await?
        {
            Confirmation::Accepted => {}
            Confirmation::Declined(reason) => return Ok(ActionOutcome::Declined(reason)),
        }

        // The poll may have been summoned to a new message while the
        // confirmation was open
        let current = self
            .ctx
            .repository
            .poll(poll.id)
            .await?
            .ok_or(PollActionError::PollNotFound(poll.id))?;
        self.ctx.repository.set_ended(current.id).await?;
        self.ctx.repository.delete_poll(current.id).await?;
        delete_quietly(&self.ctx, current.channel_id, current.message_id).await;

        info!("Deleted poll {}", poll.id);
        self.ctx
            .log("poll_deleted", json!({ "poll_id": poll.id, "user": user }));
        Ok(ActionOutcome::Performed)
    }

    /// The Ended transition, driven by the reconciliation daemon.
    ///
    /// Returns whether this call performed the transition; a poll that had
    /// already ended is left alone. `poll` may be stale, so the stored row
    /// is read again. The rendered message is stripped of every reaction
    /// except delete and told it has ended before `ended` is committed, so a
    /// failed render leaves the poll open for the next tick to retry.
    pub async fn end_now(&self, poll: &Poll) -> Result<bool, PollActionError> {
        let Some(current) = self.ctx.repository.poll(poll.id).await? else {
            return Ok(false);
        };
        if current.ended {
            return Ok(false);
        }

        self.render_ended(&current).await?;
        if !self.ctx.repository.set_ended(current.id).await? {
            return Ok(false);
        }

        // A summon between the read and the commit leaves an open-looking copy
        if let Some(moved) = self.ctx.repository.poll(current.id).await?
            && moved.message_id != current.message_id
        {
            self.render_ended(&moved).await?;
        }

        info!("Poll {} has ended", current.id);
        self.ctx.log(
            "poll_ended",
            json!({ "poll_id": current.id, "end_date": current.end_date }),
        );
        Ok(true)
    }

    /// Strip the controls from a poll's message and mark it ended. A missing
    /// message is not an error.
    async fn render_ended(&self, poll: &Poll) -> Result<(), PollActionError> {
        let message = match self
            .ctx
            .transport
            .fetch_message(poll.channel_id, poll.message_id)
            .await
        {
            Ok(message) => message,
            Err(TransportError::MessageNotFound(_)) => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        for symbol in message.reactions.iter().filter(|s| *s != DELETE_SYMBOL) {
            self.ctx
                .transport
                .clear_reaction(poll.channel_id, poll.message_id, symbol)
                .await?;
        }

        let mut embed = message
            .embed()
            .cloned()
            .unwrap_or_else(|| open_poll_embed(&poll.title, poll.end_date));
        embed.description = ended_description();
        match self
            .ctx
            .transport
            .edit_message(poll.channel_id, poll.message_id, embed.into())
            .await
        {
            Ok(()) | Err(TransportError::MessageNotFound(_)) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Repost a poll's message at the bottom of its channel.
    ///
    /// The new message carries the same content and reactions in the same
    /// order. The poll is re-pointed before the old message goes away, so a
    /// concurrent tick always finds one of the two.
    pub async fn bring_forward(&self, poll_id: PollId) -> Result<Poll, PollActionError> {
        let mut poll = self
            .ctx
            .repository
            .poll(poll_id)
            .await?
            .ok_or(PollActionError::PollNotFound(poll_id))?;
        let old = self
            .ctx
            .transport
            .fetch_message(poll.channel_id, poll.message_id)
            .await?;

        let content: MessageContent = old.content.clone();
        let new = self
            .ctx
            .transport
            .send_message(poll.channel_id, content)
            .await?;
        if let Err(e) = self.adopt_copy(&poll, &old.reactions, new.id).await {
            delete_quietly(&self.ctx, poll.channel_id, new.id).await;
            return Err(e);
        }
        delete_quietly(&self.ctx, poll.channel_id, old.id).await;

        info!("Poll {} moved from message {} to {}", poll.id, old.id, new.id);
        self.ctx.log(
            "poll_summoned",
            json!({ "poll_id": poll.id, "old_message_id": old.id, "message_id": new.id }),
        );
        poll.message_id = new.id;

        // Ended while the copy was being made
        if let Some(current) = self.ctx.repository.poll(poll.id).await?
            && current.ended
        {
            self.render_ended(&current).await?;
            poll = current;
        }
        Ok(poll)
    }

    /// Give the copy the original's reactions and point the poll at it.
    async fn adopt_copy(
        &self,
        poll: &Poll,
        reactions: &[String],
        copy: MessageId,
    ) -> Result<(), PollActionError> {
        for symbol in reactions {
            self.ctx
                .transport
                .add_reaction(poll.channel_id, copy, symbol)
                .await?;
        }
        self.ctx.repository.update_message_id(poll.id, copy).await?;
        Ok(())
    }
}
