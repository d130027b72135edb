//! Poll message content
//!
//! What the poll message says at each stage of its life. Layout is kept
//! deliberately plain: title, a description with instructions, one field per
//! choice and a footer with the refresh time and poll id.

use super::symbol::{ADD_CHOICE_SYMBOL, DELETE_SYMBOL, END_POLL_SYMBOL};
use crate::chat::Embed;
use crate::core::ids::PollId;
use crate::tally::Tally;
use chrono::{DateTime, Utc};

/// Accent colour of poll embeds.
pub const POLL_COLOR: u32 = 0x009f_e3;

const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S UTC";

/// Embed for a freshly created poll.
pub fn open_poll_embed(title: &str, end_date: DateTime<Utc>) -> Embed {
    let description = format!(
        "Poll ends: {}\n\
         React with {ADD_CHOICE_SYMBOL} to add a choice\n\
         React with {DELETE_SYMBOL} to delete the poll\n\
         React with {END_POLL_SYMBOL} to end the poll, and finalise the results\n\
         React with the emojis shown below to vote for that option",
        end_date.format(TIMESTAMP_FORMAT)
    );
    Embed::new(title, description).with_color(POLL_COLOR)
}

/// Description shown once a poll has closed. Delete stays available.
pub fn ended_description() -> String {
    format!("Poll has now ended\nReact with {DELETE_SYMBOL} to delete the poll")
}

/// Replace the embed's fields and footer with a fresh tally.
pub fn apply_tally(
    embed: &mut Embed,
    tally: &Tally,
    poll_id: PollId,
    voter_limit: usize,
    updated_at: DateTime<Utc>,
) {
    embed.clear_fields();
    for entry in &tally.entries {
        embed.add_field(entry.heading(), entry.body(voter_limit), false);
    }
    embed.set_footer(format!(
        "Results last updated: {}\nPoll ID: {}",
        updated_at.format(TIMESTAMP_FORMAT),
        poll_id
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ids::{ChoiceId, UserId};
    use crate::poll::entities::Choice;
    use crate::tally::TallyEntry;
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 9, h, m, s).unwrap()
    }

    #[test]
    fn test_open_embed_lists_end_and_controls() {
        let embed = open_poll_embed("Lunch?", at(12, 30, 5));
        assert_eq!(embed.title, "Lunch?");
        assert_eq!(embed.color, Some(POLL_COLOR));
        assert!(embed.description.starts_with("Poll ends: 09/03/2024 12:30:05 UTC\n"));
        assert!(embed.description.contains("React with ➕ to add a choice"));
        assert!(embed.description.contains("React with ✖️ to delete the poll"));
        assert!(embed.description.contains("React with 🛑 to end the poll"));
    }

    #[test]
    fn test_ended_description_keeps_delete() {
        assert_eq!(
            ended_description(),
            "Poll has now ended\nReact with ✖️ to delete the poll"
        );
    }

    #[test]
    fn test_apply_tally_replaces_fields() {
        let mut embed = open_poll_embed("Lunch?", at(12, 0, 0));
        embed.add_field("stale", "stale", false);

        let tally = Tally::new(vec![TallyEntry::new(
            Choice {
                id: ChoiceId(1),
                poll_id: PollId(4),
                symbol: "🍕".into(),
                text: "Pizza".into(),
            },
            vec![UserId(9)],
        )]);
        apply_tally(&mut embed, &tally, PollId(4), 3, at(11, 0, 0));

        assert_eq!(embed.fields.len(), 1);
        assert_eq!(embed.fields[0].name, "🍕 1");
        assert_eq!(embed.fields[0].value, "Pizza - <@9>");
        assert!(!embed.fields[0].inline);
        assert_eq!(
            embed.footer.as_deref(),
            Some("Results last updated: 09/03/2024 11:00:00 UTC\nPoll ID: 4")
        );
    }
}
