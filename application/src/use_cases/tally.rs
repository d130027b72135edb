//! Tally refresh: project stored votes onto the rendered poll message.

use super::context::PollContext;
use super::error::PollActionError;
use crate::ports::chat_transport::TransportError;
use pollbot_domain::poll::content::{apply_tally, open_poll_embed};
use pollbot_domain::tally::order_choices;
use pollbot_domain::{MessageContent, Poll, Tally, TallyEntry};

/// Build the tally for a poll, ordered by the rendered reaction bar.
pub async fn project_tally(
    ctx: &PollContext,
    poll: &Poll,
    rendered: &[String],
) -> Result<Tally, PollActionError> {
    let choices = ctx.repository.choices(poll.id).await?;
    let mut entries = Vec::with_capacity(choices.len());
    for choice in order_choices(choices, rendered) {
        let voters = ctx.repository.voters(choice.id).await?;
        entries.push(TallyEntry::new(choice, voters));
    }
    Ok(Tally::new(entries))
}

/// Re-render a poll's fields and footer from the repository.
///
/// Returns `Ok(None)` when the poll message no longer exists.
pub async fn refresh_tally(
    ctx: &PollContext,
    poll: &Poll,
) -> Result<Option<Tally>, PollActionError> {
    let message = match ctx
        .transport
        .fetch_message(poll.channel_id, poll.message_id)
        .await
    {
        Ok(message) => message,
        Err(TransportError::MessageNotFound(_)) => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let tally = project_tally(ctx, poll, &message.reactions).await?;
    let mut embed = message
        .embed()
        .cloned()
        .unwrap_or_else(|| open_poll_embed(&poll.title, poll.end_date));
    apply_tally(
        &mut embed,
        &tally,
        poll.id,
        ctx.settings.voter_limit,
        ctx.now(),
    );

    match ctx
        .transport
        .edit_message(poll.channel_id, poll.message_id, MessageContent::Embed(embed))
        .await
    {
        Ok(()) => Ok(Some(tally)),
        Err(TransportError::MessageNotFound(_)) => Ok(None),
        Err(e) => Err(e.into()),
    }
}
