use crate::action::Move;

use std::fmt;

/// Domain failures surfaced through `anyhow::Error`; recover the variant with
/// `err.downcast_ref::<GameError>()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    /// The deal generator kept producing invalid decks until its retry cap.
    DealGenerationFailed { attempts: usize },
    /// A move was applied to a state that does not satisfy its preconditions.
    InvalidMove { mov: Move, reason: String },
    /// A state broke the one-of-each-52-cards invariant.
    CorruptState { reason: String },
}

impl GameError {
    pub fn invalid_move(mov: Move, reason: impl Into<String>) -> Self {
        Self::InvalidMove {
            mov,
            reason: reason.into(),
        }
    }

    pub fn corrupt(reason: impl Into<String>) -> Self {
        Self::CorruptState {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::DealGenerationFailed { attempts } => {
                write!(f, "Failed to generate a valid deal after {attempts} attempts")
            }
            GameError::InvalidMove { mov, reason } => write!(f, "Invalid move {mov:?}; {reason}"),
            GameError::CorruptState { reason } => write!(f, "Corrupt game state; {reason}"),
        }
    }
}

impl std::error::Error for GameError {}
