//! Poll settings: timing and display knobs for the use cases.
//!
//! [`PollSettings`] groups the static parameters shared by the reaction
//! router, the interactive prompts and the reconciliation daemon. These are
//! application-layer concerns, not domain policy.

use pollbot_domain::tally::DEFAULT_VOTER_LIMIT;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timing and display parameters.
///
/// | Setting | Used by | Default |
/// |---------|---------|---------|
/// | `tick_interval` | reconciliation daemon | 1s |
/// | `confirm_timeout` | end / delete confirmation | 60s |
/// | `choice_timeout` | choice entry (first message and each edit) | 30s |
/// | `voter_limit` | tally projection | 3 |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollSettings {
    /// Period of the reconciliation daemon.
    pub tick_interval: Duration,
    /// How long a confirmation prompt waits for 👍 / 👎.
    pub confirm_timeout: Duration,
    /// How long the choice-entry dialog waits for a message or an edit.
    pub choice_timeout: Duration,
    /// Voters named per choice before "and N more".
    pub voter_limit: usize,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
            confirm_timeout: Duration::from_secs(60),
            choice_timeout: Duration::from_secs(30),
            voter_limit: DEFAULT_VOTER_LIMIT,
        }
    }
}

impl PollSettings {
    // ==================== Builder Methods ====================

    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    pub fn with_confirm_timeout(mut self, timeout: Duration) -> Self {
        self.confirm_timeout = timeout;
        self
    }

    pub fn with_choice_timeout(mut self, timeout: Duration) -> Self {
        self.choice_timeout = timeout;
        self
    }

    pub fn with_voter_limit(mut self, limit: usize) -> Self {
        self.voter_limit = limit;
        self
    }
}
