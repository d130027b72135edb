//! Poll and choice entities

use crate::core::ids::{
    ChannelId, ChoiceId, InternalGuildId, InternalUserId, MessageId, PollId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a poll.
///
/// `Deleted` is never stored: a deleted poll simply has no record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PollState {
    Open,
    Ended,
    Deleted,
}

/// A timed poll rendered as one chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Poll {
    pub id: PollId,
    pub creator: InternalUserId,
    pub channel_id: ChannelId,
    pub message_id: MessageId,
    pub guild: InternalGuildId,
    pub title: String,
    pub end_date: DateTime<Utc>,
    /// Monotonic: once true it is never reset.
    pub ended: bool,
}

impl Poll {
    pub fn state(&self) -> PollState {
        if self.ended {
            PollState::Ended
        } else {
            PollState::Open
        }
    }

    /// Whether the end timestamp has been reached.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        now >= self.end_date
    }

    /// Whether votes and non-delete controls are still accepted.
    ///
    /// An expired poll stops accepting input immediately, even before the
    /// reconciliation daemon has flipped `ended`.
    pub fn accepts_input(&self, now: DateTime<Utc>) -> bool {
        !self.ended && !self.is_due(now)
    }

    pub fn is_created_by(&self, user: InternalUserId) -> bool {
        self.creator == user
    }
}

/// Fields for a poll that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPoll {
    pub creator: InternalUserId,
    pub channel_id: ChannelId,
    pub message_id: MessageId,
    pub guild: InternalGuildId,
    pub title: String,
    pub end_date: DateTime<Utc>,
}

/// One selectable option, identified within its poll by a reaction symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub id: ChoiceId,
    pub poll_id: PollId,
    pub symbol: String,
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn poll(end_date: DateTime<Utc>, ended: bool) -> Poll {
        Poll {
            id: PollId(1),
            creator: InternalUserId(10),
            channel_id: ChannelId(100),
            message_id: MessageId(1000),
            guild: InternalGuildId(1),
            title: "Lunch?".to_string(),
            end_date,
            ended,
        }
    }

    #[test]
    fn test_open_before_end_accepts_input() {
        let now = Utc::now();
        let p = poll(now + TimeDelta::seconds(10), false);
        assert_eq!(p.state(), PollState::Open);
        assert!(!p.is_due(now));
        assert!(p.accepts_input(now));
    }

    #[test]
    fn test_due_exactly_at_end_date() {
        let now = Utc::now();
        let p = poll(now, false);
        assert!(p.is_due(now));
        assert!(!p.accepts_input(now));
    }

    #[test]
    fn test_ended_rejects_input_even_before_end_date() {
        let now = Utc::now();
        let p = poll(now + TimeDelta::hours(1), true);
        assert_eq!(p.state(), PollState::Ended);
        assert!(!p.accepts_input(now));
    }

    #[test]
    fn test_is_created_by() {
        let p = poll(Utc::now(), false);
        assert!(p.is_created_by(InternalUserId(10)));
        assert!(!p.is_created_by(InternalUserId(11)));
    }
}
