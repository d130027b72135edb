//! Reaction event router
//!
//! Entry point for every reaction added on the platform. The symbol is
//! classified once into a [`ReactionKind`] and dispatched:
//!
//! | Kind | Poll still open | Poll expired or ended |
//! |------|-----------------|-----------------------|
//! | `Delete` | delete (confirmed) | delete (confirmed) |
//! | `AddChoice` | choice-entry dialog | rejected |
//! | `EndPoll` | manual end (confirmed) | rejected |
//! | `Vote` | toggle vote | rejected |
//!
//! The user's reaction is a button press, so it is removed again afterwards
//! unless the whole message went away with a delete.

use super::context::PollContext;
use super::error::PollActionError;
use super::lifecycle::{ActionOutcome, PollLifecycle, VoteToggle};
use super::prompt::PromptOutcome;
use pollbot_domain::{Poll, ReactionEvent, ReactionKind};
use tracing::debug;

/// What the router did with a reaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Bot reaction, or not on a poll message.
    Ignored,
    /// The poll no longer accepts this kind of input.
    Rejected,
    /// A confirmed end or delete went through.
    Performed,
    /// End or delete was refused or not confirmed.
    NotPerformed(ActionOutcome),
    ChoiceAdded(String),
    ChoiceAbandoned,
    Vote(VoteToggle),
    /// Lost a race against a concurrent action on the same record.
    Conflict,
    /// The poll or its message disappeared mid-flight.
    Gone,
}

#[derive(Clone)]
pub struct ReactionRouter {
    ctx: PollContext,
    lifecycle: PollLifecycle,
}

impl ReactionRouter {
    pub fn new(ctx: PollContext) -> Self {
        let lifecycle = PollLifecycle::new(ctx.clone());
        Self { ctx, lifecycle }
    }

    pub async fn handle(&self, event: &ReactionEvent) -> Result<RouteOutcome, PollActionError> {
        if event.user.bot {
            return Ok(RouteOutcome::Ignored);
        }
        let Some(poll) = self
            .ctx
            .repository
            .poll_by_message(event.message_id)
            .await?
        else {
            return Ok(RouteOutcome::Ignored);
        };

        let outcome = match ReactionKind::classify(&event.symbol) {
            ReactionKind::Delete => return self.route_delete(&poll, event).await,
            _ if !poll.accepts_input(self.ctx.now()) => {
                debug!("Poll {} is closed; rejecting {}", poll.id, event.symbol);
                self.remove_user_reaction(event).await;
                return Ok(RouteOutcome::Rejected);
            }
            ReactionKind::AddChoice => self
                .lifecycle
                .add_choice(&poll, event.user.id)
                .await
                .map(|outcome| match outcome {
                    PromptOutcome::Completed(choice) => RouteOutcome::ChoiceAdded(choice.symbol),
                    PromptOutcome::TimedOut => RouteOutcome::ChoiceAbandoned,
                }),
            ReactionKind::EndPoll => self
                .lifecycle
                .request_end(&poll, event.user.id, event.guild_id)
                .await
                .map(Self::action_outcome),
            ReactionKind::Vote(symbol) => self
                .lifecycle
                .toggle_vote(poll.id, event.user.id, &symbol)
                .await
                .map(RouteOutcome::Vote),
        };

        self.remove_user_reaction(event).await;
        absorb(outcome)
    }

    async fn route_delete(
        &self,
        poll: &Poll,
        event: &ReactionEvent,
    ) -> Result<RouteOutcome, PollActionError> {
        let outcome = self
            .lifecycle
            .request_delete(poll, event.user.id, event.guild_id)
            .await;
        if !matches!(outcome, Ok(ActionOutcome::Performed)) {
            self.remove_user_reaction(event).await;
        }
        absorb(outcome.map(Self::action_outcome))
    }

    fn action_outcome(outcome: ActionOutcome) -> RouteOutcome {
        match outcome {
            ActionOutcome::Performed => RouteOutcome::Performed,
            other => RouteOutcome::NotPerformed(other),
        }
    }

    async fn remove_user_reaction(&self, event: &ReactionEvent) {
        if let Err(e) = self
            .ctx
            .transport
            .remove_reaction(
                event.channel_id,
                event.message_id,
                &event.symbol,
                event.user.id,
            )
            .await
        {
            debug!("Could not remove reaction {}: {}", event.symbol, e);
        }
    }
}

/// Fold benign races into outcomes; everything else stays an error.
fn absorb(outcome: Result<RouteOutcome, PollActionError>) -> Result<RouteOutcome, PollActionError> {
    match outcome {
        Err(e) if e.is_conflict() => {
            debug!("Conflict ignored: {}", e);
            Ok(RouteOutcome::Conflict)
        }
        Err(e) if e.is_not_found() => {
            debug!("Target disappeared: {}", e);
            Ok(RouteOutcome::Gone)
        }
        Err(PollActionError::PollClosed(_)) => Ok(RouteOutcome::Rejected),
        other => other,
    }
}
