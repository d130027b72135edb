//! Tally projection
//!
//! Turns a poll's choices and their voters into the ordered, truncated
//! summary rendered under the poll.
//!
//! Display order comes from the poll message itself: choices follow the
//! order in which their symbols appear in the reaction bar, which is the
//! order they were added over the message's history. The database order is
//! only a tie-breaker for choices whose symbol has gone missing from the
//! bar; those sort last.
//!
//! ```
//! use pollbot_domain::{Choice, ChoiceId, PollId, tally::order_choices};
//!
//! let choice = |id, symbol: &str| Choice {
//!     id: ChoiceId(id),
//!     poll_id: PollId(1),
//!     symbol: symbol.to_string(),
//!     text: String::new(),
//! };
//! let rendered = vec!["A".to_string(), "B".to_string()];
//! let ordered = order_choices(vec![choice(1, "B"), choice(2, "A"), choice(3, "Z")], &rendered);
//! let ids: Vec<_> = ordered.iter().map(|c| c.id.0).collect();
//! assert_eq!(ids, vec![2, 1, 3]);
//! ```

use crate::core::ids::UserId;
use crate::poll::entities::Choice;
use serde::{Deserialize, Serialize};

/// Default number of voters named per choice.
pub const DEFAULT_VOTER_LIMIT: usize = 3;

/// Sort choices by the position of their symbol in the rendered reaction
/// bar. Missing symbols sort last, keeping their input order.
pub fn order_choices(mut choices: Vec<Choice>, rendered: &[String]) -> Vec<Choice> {
    // sort_by_key is stable, which keeps database order among ties
    choices.sort_by_key(|choice| {
        rendered
            .iter()
            .position(|symbol| *symbol == choice.symbol)
            .unwrap_or(usize::MAX)
    });
    choices
}

/// One projected row: a choice and everyone who voted for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TallyEntry {
    pub choice: Choice,
    pub voters: Vec<UserId>,
}

impl TallyEntry {
    pub fn new(choice: Choice, voters: Vec<UserId>) -> Self {
        Self { choice, voters }
    }

    pub fn count(&self) -> usize {
        self.voters.len()
    }

    /// Up to `limit` voter mentions, then `and N more`.
    ///
    /// Empty when nobody has voted.
    pub fn voter_summary(&self, limit: usize) -> String {
        let mut summary = self
            .voters
            .iter()
            .take(limit)
            .map(|user| user.mention())
            .collect::<Vec<_>>()
            .join(", ");
        if self.count() > limit {
            summary.push_str(&format!(" and {} more", self.count() - limit));
        }
        summary
    }

    /// Field heading: `"{symbol} {count}"`.
    pub fn heading(&self) -> String {
        format!("{} {}", self.choice.symbol, self.count())
    }

    /// Field body: the label, followed by ` - {voters}` when anyone voted.
    pub fn body(&self, limit: usize) -> String {
        let voters = self.voter_summary(limit);
        if voters.is_empty() {
            self.choice.text.clone()
        } else {
            format!("{} - {}", self.choice.text, voters)
        }
    }
}

/// The full projection for one poll, in display order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub entries: Vec<TallyEntry>,
}

impl Tally {
    pub fn new(entries: Vec<TallyEntry>) -> Self {
        Self { entries }
    }

    pub fn total_votes(&self) -> usize {
        self.entries.iter().map(TallyEntry::count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
