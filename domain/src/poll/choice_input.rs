//! Free-text choice entry (`<symbol> <text>`)

use super::symbol::is_control_symbol;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a proposed choice was refused.
///
/// The `Display` text is shown to the user verbatim, followed by an
/// invitation to edit their message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChoiceInputError {
    #[error("New choice wasn't given in the correct format.")]
    WrongFormat,

    #[error("You can't use {0} as a choice.")]
    ReservedSymbol(String),

    #[error("Choice already exists for {0}.")]
    DuplicateChoice(String),

    #[error("'{0}' is an unknown emoji.")]
    UnknownEmoji(String),
}

/// A syntactically valid choice proposal, not yet checked against the poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceDraft {
    pub symbol: String,
    pub text: String,
}

impl ChoiceDraft {
    /// Split a message into symbol and label, rejecting reserved symbols.
    ///
    /// The symbol is everything up to the first whitespace run; the label is
    /// the remainder with surrounding whitespace trimmed and must be
    /// non-empty.
    pub fn parse(content: &str) -> Result<Self, ChoiceInputError> {
        let (symbol, text) = content
            .trim()
            .split_once(char::is_whitespace)
            .ok_or(ChoiceInputError::WrongFormat)?;
        let text = text.trim();
        if text.is_empty() {
            return Err(ChoiceInputError::WrongFormat);
        }
        if is_control_symbol(symbol) {
            return Err(ChoiceInputError::ReservedSymbol(symbol.to_string()));
        }
        Ok(Self {
            symbol: symbol.to_string(),
            text: text.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poll::symbol::CONTROL_SYMBOLS;

    #[test]
    fn test_parse_symbol_and_text() {
        let draft = ChoiceDraft::parse("❤️ Red Heart").unwrap();
        assert_eq!(draft.symbol, "❤️");
        assert_eq!(draft.text, "Red Heart");
    }

    #[test]
    fn test_text_keeps_inner_whitespace() {
        let draft = ChoiceDraft::parse("  🍕   deep  dish  ").unwrap();
        assert_eq!(draft.symbol, "🍕");
        assert_eq!(draft.text, "deep  dish");
    }

    #[test]
    fn test_single_part_is_wrong_format() {
        assert_eq!(ChoiceDraft::parse("🍕"), Err(ChoiceInputError::WrongFormat));
        assert_eq!(ChoiceDraft::parse("🍕   "), Err(ChoiceInputError::WrongFormat));
        assert_eq!(ChoiceDraft::parse(""), Err(ChoiceInputError::WrongFormat));
    }

    #[test]
    fn test_reserved_symbols_always_rejected() {
        for symbol in CONTROL_SYMBOLS {
            let result = ChoiceDraft::parse(&format!("{symbol} sneaky"));
            assert_eq!(
                result,
                Err(ChoiceInputError::ReservedSymbol(symbol.to_string()))
            );
        }
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ChoiceInputError::ReservedSymbol("🛑".into()).to_string(),
            "You can't use 🛑 as a choice."
        );
        assert_eq!(
            ChoiceInputError::DuplicateChoice("🍕".into()).to_string(),
            "Choice already exists for 🍕."
        );
        assert_eq!(
            ChoiceInputError::UnknownEmoji("pizza".into()).to_string(),
            "'pizza' is an unknown emoji."
        );
    }
}
