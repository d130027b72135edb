//! Interactive prompts
//!
//! Two short dialogs with the acting user, both bounded by a timeout and
//! both deleting every message they post on the way out:
//!
//! - [`ConfirmationDialog`]: a yes/no question answered with 👍 or 👎
//! - [`ChoiceEntryDialog`]: collect `<symbol> <text>` for a new choice,
//!   letting the user fix mistakes by editing their message
//!
//! ```text
//! choice entry
//!
//!   post instructions ──▶ wait for message ──timeout──▶ TimedOut
//!                               │
//!                               ▼
//!                       ┌──▶ validate ──ok──▶ store choice ──▶ Completed
//!                       │       │
//!                       │     error
//!                       │       ▼
//!                       │  post error, wait for edit ──timeout──▶ TimedOut
//!                       │       │
//!                       └───────┘
//! ```

use super::context::PollContext;
use super::error::PollActionError;
use crate::ports::chat_transport::{EventFilter, TransportError, WaitOutcome};
use pollbot_domain::{
    CONFIRM_SYMBOL, ChannelId, ChatEvent, ChatMessage, Choice, ChoiceDraft, ChoiceInputError,
    DECLINE_SYMBOL, MessageContent, MessageId, Poll, UserId,
};
use serde_json::json;
use tracing::{debug, warn};

const CHOICE_INSTRUCTIONS: &str =
    "Send a message for the choice in the format `<emoji> <text>`, e.g. :heart: Red Heart";

const EDIT_HINT: &str = "You may edit your original message.";

/// How a bounded dialog finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptOutcome<T> {
    Completed(T),
    TimedOut,
}

/// Why a confirmation was not given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclineReason {
    Timeout,
    Rejected,
}

impl DeclineReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeclineReason::Timeout => "Timeout",
            DeclineReason::Rejected => "Rejected",
        }
    }
}

impl std::fmt::Display for DeclineReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Accepted,
    Declined(DeclineReason),
}

impl Confirmation {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Confirmation::Accepted)
    }
}

/// Delete a message, logging rather than failing if that does not work.
pub(crate) async fn delete_quietly(ctx: &PollContext, channel: ChannelId, message: MessageId) {
    match ctx.transport.delete_message(channel, message).await {
        Ok(()) | Err(TransportError::MessageNotFound(_)) => {}
        Err(e) => warn!("Failed to delete message {}: {}", message, e),
    }
}

/// Yes/no question answered by the asking user's reaction.
pub struct ConfirmationDialog<'a> {
    ctx: &'a PollContext,
}

impl<'a> ConfirmationDialog<'a> {
    pub fn new(ctx: &'a PollContext) -> Self {
        Self { ctx }
    }

    /// Post `question` in `channel` and wait for `user` to answer.
    ///
    /// Reactions from anyone else, or on any other message, are ignored.
    /// The prompt is deleted however the dialog ends.
    pub async fn ask(
        &self,
        channel: ChannelId,
        user: UserId,
        question: &str,
    ) -> Result<Confirmation, PollActionError> {
        let prompt = self
            .ctx
            .transport
            .send_message(channel, MessageContent::text(question))
            .await?;

        let answer = self.await_answer(channel, prompt.id, user).await;
        delete_quietly(self.ctx, channel, prompt.id).await;

        let confirmation = match answer? {
            WaitOutcome::Received(ChatEvent::ReactionAdded(reaction))
                if reaction.symbol == CONFIRM_SYMBOL =>
            {
                Confirmation::Accepted
            }
            WaitOutcome::Received(_) => Confirmation::Declined(DeclineReason::Rejected),
            WaitOutcome::TimedOut => Confirmation::Declined(DeclineReason::Timeout),
        };
        debug!("Confirmation from {} on {}: {:?}", user, prompt.id, confirmation);
        Ok(confirmation)
    }

    async fn await_answer(
        &self,
        channel: ChannelId,
        prompt: MessageId,
        user: UserId,
    ) -> Result<WaitOutcome<ChatEvent>, PollActionError> {
        self.ctx
            .transport
            .add_reaction(channel, prompt, CONFIRM_SYMBOL)
            .await?;
        self.ctx
            .transport
            .add_reaction(channel, prompt, DECLINE_SYMBOL)
            .await?;

        let filter: EventFilter = Box::new(move |event| match event {
            ChatEvent::ReactionAdded(reaction) => {
                reaction.user.id == user
                    && reaction.message_id == prompt
                    && (reaction.symbol == CONFIRM_SYMBOL || reaction.symbol == DECLINE_SYMBOL)
            }
            _ => false,
        });
        Ok(self
            .ctx
            .transport
            .wait_for(filter, self.ctx.settings.confirm_timeout)
            .await?)
    }
}

/// Collects a new choice for a poll from one user.
pub struct ChoiceEntryDialog<'a> {
    ctx: &'a PollContext,
    poll: &'a Poll,
    user: UserId,
}

impl<'a> ChoiceEntryDialog<'a> {
    pub fn new(ctx: &'a PollContext, poll: &'a Poll, user: UserId) -> Self {
        Self { ctx, poll, user }
    }

    /// Run the dialog to completion.
    ///
    /// On success the choice is stored and its symbol has been added to the
    /// poll message. The instructions, any error notices and the user's own
    /// message are deleted on every path.
    pub async fn run(&self) -> Result<PromptOutcome<Choice>, PollActionError> {
        let channel = self.poll.channel_id;
        let instructions = self
            .ctx
            .transport
            .send_message(channel, MessageContent::text(CHOICE_INSTRUCTIONS))
            .await?;

        let outcome = self.collect().await;
        delete_quietly(self.ctx, channel, instructions.id).await;
        outcome
    }

    async fn collect(&self) -> Result<PromptOutcome<Choice>, PollActionError> {
        let channel = self.poll.channel_id;
        let user = self.user;
        let first: EventFilter = Box::new(move |event| {
            matches!(event, ChatEvent::MessageCreated(message)
                if message.author.id == user && message.channel_id == channel)
        });

        let mut draft = match self
            .ctx
            .transport
            .wait_for(first, self.ctx.settings.choice_timeout)
            .await?
        {
            WaitOutcome::Received(ChatEvent::MessageCreated(message)) => message,
            _ => return Ok(PromptOutcome::TimedOut),
        };

        loop {
            let checked = self.validate(&draft).await;
            let input_error = match checked {
                Ok(Ok(parsed)) => {
                    delete_quietly(self.ctx, channel, draft.id).await;
                    return self.store(parsed).await.map(PromptOutcome::Completed);
                }
                Ok(Err(input_error)) => input_error,
                Err(e) => {
                    delete_quietly(self.ctx, channel, draft.id).await;
                    return Err(e);
                }
            };

            match self.await_edit(&draft, &input_error).await {
                Ok(Some(edited)) => draft = edited,
                Ok(None) => {
                    delete_quietly(self.ctx, channel, draft.id).await;
                    return Ok(PromptOutcome::TimedOut);
                }
                Err(e) => {
                    delete_quietly(self.ctx, channel, draft.id).await;
                    return Err(e);
                }
            }
        }
    }

    /// Check a draft against the format, the poll's existing choices and
    /// the platform. Adding the symbol to the poll message doubles as the
    /// platform check.
    async fn validate(
        &self,
        draft: &ChatMessage,
    ) -> Result<Result<ChoiceDraft, ChoiceInputError>, PollActionError> {
        let parsed = match ChoiceDraft::parse(draft.text()) {
            Ok(parsed) => parsed,
            Err(e) => return Ok(Err(e)),
        };

        if self
            .ctx
            .repository
            .choice(self.poll.id, &parsed.symbol)
            .await?
            .is_some()
        {
            return Ok(Err(ChoiceInputError::DuplicateChoice(parsed.symbol)));
        }

        match self
            .ctx
            .transport
            .add_reaction(self.poll.channel_id, self.poll.message_id, &parsed.symbol)
            .await
        {
            Ok(()) => Ok(Ok(parsed)),
            Err(TransportError::UnknownEmoji(_)) => {
                Ok(Err(ChoiceInputError::UnknownEmoji(parsed.symbol)))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Post the error and wait for the user to edit their message.
    async fn await_edit(
        &self,
        draft: &ChatMessage,
        input_error: &ChoiceInputError,
    ) -> Result<Option<ChatMessage>, PollActionError> {
        let channel = self.poll.channel_id;
        let notice = self
            .ctx
            .transport
            .send_message(
                channel,
                MessageContent::text(format!("{input_error} {EDIT_HINT}")),
            )
            .await?;

        let draft_id = draft.id;
        let edited: EventFilter = Box::new(move |event| {
            matches!(event, ChatEvent::MessageEdited(message) if message.id == draft_id)
        });
        let outcome = self
            .ctx
            .transport
            .wait_for(edited, self.ctx.settings.choice_timeout)
            .await;
        delete_quietly(self.ctx, channel, notice.id).await;

        match outcome? {
            WaitOutcome::Received(ChatEvent::MessageEdited(message)) => Ok(Some(message)),
            _ => Ok(None),
        }
    }

    async fn store(&self, parsed: ChoiceDraft) -> Result<Choice, PollActionError> {
        let choice = self
            .ctx
            .repository
            .create_choice(self.poll.id, &parsed.symbol, &parsed.text)
            .await?;
        debug!("Poll {} gained choice {} {}", self.poll.id, choice.symbol, choice.text);
        self.ctx.log(
            "choice_added",
            json!({
                "poll_id": self.poll.id,
                "choice_id": choice.id,
                "symbol": choice.symbol,
                "text": choice.text,
                "user": self.user,
            }),
        );
        Ok(choice)
    }
}
