//! Errors raised by poll use cases

use crate::ports::chat_transport::TransportError;
use crate::ports::poll_repository::RepositoryError;
use pollbot_domain::PollId;
use thiserror::Error;

/// Errors that can occur while acting on a poll
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PollActionError {
    #[error("Poll must have a valid duration that is greater than zero")]
    InvalidDuration,

    #[error("Poll must have a title")]
    MissingTitle,

    #[error("Polls can only be created in a registered server")]
    GuildNotRegistered,

    #[error("Poll {0} is no longer accepting input")]
    PollClosed(PollId),

    #[error("Poll {0} not found")]
    PollNotFound(PollId),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

impl PollActionError {
    /// A uniqueness race lost against a concurrent action.
    pub fn is_conflict(&self) -> bool {
        matches!(self, PollActionError::Repository(RepositoryError::Conflict(_)))
    }

    /// The poll, its message or a record it depends on disappeared.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            PollActionError::PollNotFound(_)
                | PollActionError::Repository(RepositoryError::NotFound(_))
                | PollActionError::Transport(TransportError::MessageNotFound(_))
        )
    }

    /// Input the acting user should fix and retry.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            PollActionError::InvalidDuration
                | PollActionError::MissingTitle
                | PollActionError::GuildNotRegistered
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pollbot_domain::MessageId;

    #[test]
    fn test_conflict_classification() {
        let err: PollActionError = RepositoryError::Conflict("dup".into()).into();
        assert!(err.is_conflict());
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_not_found_classification() {
        assert!(PollActionError::PollNotFound(PollId(1)).is_not_found());
        let err: PollActionError = TransportError::MessageNotFound(MessageId(5)).into();
        assert!(err.is_not_found());
        let err: PollActionError = RepositoryError::NotFound("choice".into()).into();
        assert!(err.is_not_found());
        assert!(!PollActionError::PollClosed(PollId(1)).is_not_found());
    }

    #[test]
    fn test_validation_messages() {
        assert!(PollActionError::InvalidDuration.is_validation());
        assert_eq!(
            PollActionError::InvalidDuration.to_string(),
            "Poll must have a valid duration that is greater than zero"
        );
        assert!(!PollActionError::PollNotFound(PollId(2)).is_validation());
    }
}
