//! Errors surfaced to the user.
//!
//! Only a rejected position load makes it this far; illegal moves are cues,
//! interrupted gestures are cancelled quietly.

use crate::domain::RulesError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("invalid position: {reason}")]
    InvalidPosition { fen: String, reason: String },
}

impl From<RulesError> for SessionError {
    fn from(err: RulesError) -> Self {
        match err {
            RulesError::InvalidPosition { fen, reason } => {
                SessionError::InvalidPosition { fen, reason }
            }
            other => SessionError::InvalidPosition {
                fen: String::new(),
                reason: other.to_string(),
            },
        }
    }
}

/// Result type alias for session operations
pub type SessionResult<T> = Result<T, SessionError>;
