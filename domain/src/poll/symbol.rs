//! Reaction symbols and their meaning on a poll message
//!
//! Three symbols are reserved as controls on every poll message:
//!
//! | Symbol | Control | Effect |
//! |--------|---------|--------|
//! | ➕ | [`ReactionKind::AddChoice`] | start the choice-entry dialog |
//! | ✖️ | [`ReactionKind::Delete`] | delete the poll (confirmed) |
//! | 🛑 | [`ReactionKind::EndPoll`] | end the poll early (confirmed) |
//!
//! Every other symbol is a vote for whichever choice owns it.
//! Confirmation prompts use 👍 / 👎, which never appear on poll messages.

use serde::{Deserialize, Serialize};

/// Control symbol that starts the add-choice dialog.
pub const ADD_CHOICE_SYMBOL: &str = "\u{2795}";
/// Control symbol that deletes a poll.
pub const DELETE_SYMBOL: &str = "\u{2716}\u{FE0F}";
/// Control symbol that ends a poll early.
pub const END_POLL_SYMBOL: &str = "\u{1F6D1}";

/// Control symbols in the order they are attached to a new poll message.
pub const CONTROL_SYMBOLS: [&str; 3] = [ADD_CHOICE_SYMBOL, DELETE_SYMBOL, END_POLL_SYMBOL];

/// Confirmation prompt: accept.
pub const CONFIRM_SYMBOL: &str = "\u{1F44D}";
/// Confirmation prompt: decline.
pub const DECLINE_SYMBOL: &str = "\u{1F44E}";

/// Whether `symbol` is one of the reserved poll controls.
pub fn is_control_symbol(symbol: &str) -> bool {
    CONTROL_SYMBOLS.contains(&symbol)
}

/// Classification of a reaction added to a poll message.
///
/// Computed once when an event enters the router, then matched
/// exhaustively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "symbol")]
pub enum ReactionKind {
    Delete,
    AddChoice,
    EndPoll,
    /// A vote for the choice owning this symbol (which may not exist).
    Vote(String),
}

impl ReactionKind {
    pub fn classify(symbol: &str) -> Self {
        match symbol {
            DELETE_SYMBOL => ReactionKind::Delete,
            ADD_CHOICE_SYMBOL => ReactionKind::AddChoice,
            END_POLL_SYMBOL => ReactionKind::EndPoll,
            other => ReactionKind::Vote(other.to_string()),
        }
    }

    /// The symbol this kind was classified from.
    pub fn symbol(&self) -> &str {
        match self {
            ReactionKind::Delete => DELETE_SYMBOL,
            ReactionKind::AddChoice => ADD_CHOICE_SYMBOL,
            ReactionKind::EndPoll => END_POLL_SYMBOL,
            ReactionKind::Vote(symbol) => symbol,
        }
    }

    pub fn is_control(&self) -> bool {
        !matches!(self, ReactionKind::Vote(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_controls() {
        assert_eq!(ReactionKind::classify("✖️"), ReactionKind::Delete);
        assert_eq!(ReactionKind::classify("➕"), ReactionKind::AddChoice);
        assert_eq!(ReactionKind::classify("🛑"), ReactionKind::EndPoll);
    }

    #[test]
    fn test_classify_vote() {
        let kind = ReactionKind::classify("❤️");
        assert_eq!(kind, ReactionKind::Vote("❤️".to_string()));
        assert!(!kind.is_control());
        assert_eq!(kind.symbol(), "❤️");
    }

    #[test]
    fn test_symbol_round_trips_for_controls() {
        for symbol in CONTROL_SYMBOLS {
            let kind = ReactionKind::classify(symbol);
            assert!(kind.is_control());
            assert_eq!(kind.symbol(), symbol);
        }
    }

    #[test]
    fn test_bare_cross_is_not_delete() {
        // Without the emoji presentation selector it is a different symbol
        assert!(!is_control_symbol("\u{2716}"));
        assert!(is_control_symbol(DELETE_SYMBOL));
    }

    #[test]
    fn test_confirmation_symbols_are_not_controls() {
        assert!(!is_control_symbol(CONFIRM_SYMBOL));
        assert!(!is_control_symbol(DECLINE_SYMBOL));
    }
}
