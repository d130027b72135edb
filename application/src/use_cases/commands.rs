//! Chat command entry points: `create-poll` and `summon-poll`.
//!
//! Commands never return errors to the caller. Failures are reported to
//! the invoking user as a message in the channel the command came from.

use super::context::PollContext;
use super::error::PollActionError;
use super::lifecycle::{CreatePoll, PollLifecycle};
use super::prompt::delete_quietly;
use pollbot_domain::{ChannelId, ChatUser, GuildId, MessageContent, MessageId, PollId};
use tracing::warn;

const GENERIC_FAILURE: &str = "Something went wrong, please try again.";

/// Who ran a command, and where.
#[derive(Debug, Clone)]
pub struct CommandInvocation {
    pub author: ChatUser,
    pub guild_id: Option<GuildId>,
    pub channel_id: ChannelId,
    /// The command message itself, deleted once the command succeeds.
    pub message_id: MessageId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Completed(PollId),
    /// The user was told why, with this text.
    Failed(String),
}

pub struct PollCommands {
    ctx: PollContext,
    lifecycle: PollLifecycle,
}

impl PollCommands {
    pub fn new(ctx: PollContext) -> Self {
        let lifecycle = PollLifecycle::new(ctx.clone());
        Self { ctx, lifecycle }
    }

    pub async fn create_poll(
        &self,
        invocation: &CommandInvocation,
        duration: &str,
        title: &str,
    ) -> CommandOutcome {
        let request = CreatePoll {
            author: invocation.author.id,
            guild: invocation.guild_id,
            channel: invocation.channel_id,
            duration: duration.to_string(),
            title: title.to_string(),
        };
        match self.lifecycle.create(request).await {
            Ok(poll) => {
                delete_quietly(&self.ctx, invocation.channel_id, invocation.message_id).await;
                CommandOutcome::Completed(poll.id)
            }
            Err(e) => {
                let text = if e.is_validation() {
                    e.to_string()
                } else {
                    warn!("create-poll failed: {}", e);
                    GENERIC_FAILURE.to_string()
                };
                self.reply(invocation, text).await
            }
        }
    }

    pub async fn summon_poll(&self, invocation: &CommandInvocation, poll_id: PollId) -> CommandOutcome {
        match self.lifecycle.bring_forward(poll_id).await {
            Ok(poll) => {
                delete_quietly(&self.ctx, invocation.channel_id, invocation.message_id).await;
                CommandOutcome::Completed(poll.id)
            }
            Err(e) if e.is_not_found() => {
                if !matches!(e, PollActionError::PollNotFound(_)) {
                    warn!("summon-poll {}: {}", poll_id, e);
                }
                self.reply(invocation, format!("Poll with ID {poll_id} could not be found."))
                    .await
            }
            Err(e) => {
                warn!("summon-poll {} failed: {}", poll_id, e);
                self.reply(invocation, GENERIC_FAILURE.to_string()).await
            }
        }
    }

    async fn reply(&self, invocation: &CommandInvocation, text: String) -> CommandOutcome {
        if let Err(e) = self
            .ctx
            .transport
            .send_message(invocation.channel_id, MessageContent::text(text.clone()))
            .await
        {
            warn!("Could not report command failure: {}", e);
        }
        CommandOutcome::Failed(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::chat_transport::ChatTransport;
    use crate::use_cases::test_support::{CHANNEL, Fixture, GUILD};
    use pollbot_domain::UserId;

    async fn invocation(fx: &Fixture) -> CommandInvocation {
        // Stand-in for the user's command message
        let message = fx
            .transport
            .send_message(CHANNEL, MessageContent::text("!createpoll"))
            .await
            .unwrap();
        CommandInvocation {
            author: ChatUser::human(UserId(2)),
            guild_id: Some(GUILD),
            channel_id: CHANNEL,
            message_id: message.id,
        }
    }

    #[tokio::test]
    async fn test_create_poll_deletes_command_message() {
        let fx = Fixture::new();
        fx.ctx.repository.register_guild(GUILD).await.unwrap();
        let commands = PollCommands::new(fx.ctx.clone());
        let inv = invocation(&fx).await;

        let outcome = commands.create_poll(&inv, "10s", "Lunch?").await;

        let CommandOutcome::Completed(id) = outcome else {
            panic!("expected success, got {outcome:?}");
        };
        assert!(fx.transport.message(inv.message_id).is_none());
        assert!(fx.ctx.repository.poll(id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_create_poll_reports_bad_duration() {
        let fx = Fixture::new();
        fx.ctx.repository.register_guild(GUILD).await.unwrap();
        let commands = PollCommands::new(fx.ctx.clone());
        let inv = invocation(&fx).await;

        let outcome = commands.create_poll(&inv, "0s", "Lunch?").await;

        let expected = "Poll must have a valid duration that is greater than zero";
        assert_eq!(outcome, CommandOutcome::Failed(expected.to_string()));
        assert_eq!(fx.transport.sent_texts().last().map(String::as_str), Some(expected));
        assert!(fx.transport.message(inv.message_id).is_some());
    }

    #[tokio::test]
    async fn test_summon_unknown_poll() {
        let fx = Fixture::new();
        let commands = PollCommands::new(fx.ctx.clone());
        let inv = invocation(&fx).await;

        let outcome = commands.summon_poll(&inv, PollId(77)).await;

        assert_eq!(
            outcome,
            CommandOutcome::Failed("Poll with ID 77 could not be found.".to_string())
        );
    }

    #[tokio::test]
    async fn test_summon_moves_poll() {
        let fx = Fixture::new();
        let poll = fx.open_poll().await;
        let commands = PollCommands::new(fx.ctx.clone());
        let inv = invocation(&fx).await;

        let outcome = commands.summon_poll(&inv, poll.id).await;

        assert_eq!(outcome, CommandOutcome::Completed(poll.id));
        let moved = fx.ctx.repository.poll(poll.id).await.unwrap().unwrap();
        assert_ne!(moved.message_id, poll.message_id);
        assert!(fx.transport.message(inv.message_id).is_none());
    }
}
