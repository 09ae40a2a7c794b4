//! Error taxonomy shared by every engine.
//!
//! - [`ConfigError`]: fatal at `create_game`/`setup`.
//! - [`ActionError`]: a rejected `execute`. State is left untouched and the
//!   caller should ask for fresh legal actions.
//!
//! [`ErrorKind`] separates plain invalid actions from resource exhaustion
//! (an empty deck), which some callers treat as a reshuffle trigger.

use serde::{Deserialize, Serialize};

use super::action::Resource;
use super::player::PlayerId;

/// Errors raised while creating or setting up a game.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum ConfigError {
    #[error("unknown game type: {0}")]
    UnknownGame(String),

    #[error("{game} requires exactly {expected} players, got {actual}")]
    PlayerCount {
        game: String,
        expected: usize,
        actual: usize,
    },

    #[error("unknown character class {class:?} for {game}")]
    UnknownClass { game: String, class: String },

    #[error("game has already been set up")]
    AlreadySetUp,
}

/// Coarse classification of an [`ActionError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidAction,
    ResourceExhaustion,
}

/// Reasons an `execute` call is rejected.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum ActionError {
    #[error("game has not been set up")]
    NotSetUp,

    #[error("game is over")]
    GameOver,

    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),

    #[error("{0} has been eliminated")]
    Eliminated(PlayerId),

    #[error("it is not {0}'s turn")]
    OutOfTurn(PlayerId),

    #[error("{0} has already finished this turn")]
    TurnComplete(PlayerId),

    #[error("action belongs to a different game")]
    WrongGame,

    #[error("action is not allowed during the {0} phase")]
    WrongPhase(String),

    #[error("insufficient {resource}: need {need}, have {have}")]
    Insufficient {
        resource: Resource,
        need: i64,
        have: i64,
    },

    #[error("{0}")]
    Precondition(String),

    #[error("action is stale: {0}")]
    Stale(String),

    #[error("{0} is exhausted")]
    Exhausted(String),
}

impl ActionError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            ActionError::Exhausted(_) => ErrorKind::ResourceExhaustion,
            _ => ErrorKind::InvalidAction,
        }
    }

    /// Shorthand for a failed precondition.
    pub fn precondition(msg: impl Into<String>) -> Self {
        ActionError::Precondition(msg.into())
    }

    /// Require `have >= need` of a resource.
    pub fn require(resource: Resource, need: i64, have: i64) -> Result<(), ActionError> {
        if have >= need {
            Ok(())
        } else {
            Err(ActionError::Insufficient {
                resource,
                need,
                have,
            })
        }
    }
}
