//! What a successful `execute` did.
//!
//! Engines describe every observable change as an [`Effect`] so transports
//! and external decision makers can narrate a move without diffing state.
//! [`ActionReport`] is the flat, JSON-shaped form of an `execute` result.

use serde::{Deserialize, Serialize};

use super::action::Resource;
use super::error::{ActionError, ErrorKind};
use super::player::PlayerId;

/// A single observable change.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Effect {
    /// A player's counter changed by `delta`.
    Resource {
        player: PlayerId,
        resource: Resource,
        delta: i64,
    },
    /// A production or income rate changed.
    Production {
        player: PlayerId,
        resource: Resource,
        delta: i64,
    },
    /// A shared global tracker moved to `value`.
    Tracker { name: String, value: i64 },
    /// Victory points awarded.
    Score { player: PlayerId, points: i64 },
    CardGained { player: PlayerId, card: String },
    CardDiscarded { player: PlayerId, card: String },
    /// Removed from the game for good.
    CardLost { player: PlayerId, card: String },
    /// A card changed hands.
    CardStolen {
        from: PlayerId,
        to: PlayerId,
        card: String,
    },
    Built {
        player: PlayerId,
        what: String,
        location: String,
    },
    Moved {
        unit: String,
        from: String,
        to: String,
    },
    Roll {
        purpose: String,
        dice: String,
        total: i64,
    },
    Damage { target: String, amount: i64 },
    Healed { target: String, amount: i64 },
    Defeated { target: String },
    Eliminated { player: PlayerId },
    /// The hazard went back into the deck at `index` (0 = bottom).
    HazardReinserted { index: usize },
    Revealed { player: PlayerId, cards: Vec<String> },
    TurnsOwed { player: PlayerId, turns: u32 },
    /// Free-form event with no structured counterpart.
    Note { text: String },
}

/// Successful result of `execute`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub summary: String,
    pub effects: Vec<Effect>,
}

impl Outcome {
    pub fn new(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            effects: Vec::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn push(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    pub fn note(&mut self, text: impl Into<String>) {
        self.effects.push(Effect::Note { text: text.into() });
    }
}

/// Transport-friendly report of an `execute` call.
///
/// ```
/// use tabletop_rules::core::{ActionError, ActionReport, Outcome};
///
/// let ok: ActionReport = Ok::<_, ActionError>(Outcome::new("passed")).into();
/// assert!(ok.success);
///
/// let err: ActionReport = Err::<Outcome, _>(ActionError::GameOver).into();
/// assert!(!err.success);
/// assert_eq!(err.error.as_deref(), Some("game is over"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionReport {
    pub success: bool,
    pub error: Option<String>,
    pub error_kind: Option<ErrorKind>,
    pub summary: String,
    pub effects: Vec<Effect>,
}

impl From<Result<Outcome, ActionError>> for ActionReport {
    fn from(result: Result<Outcome, ActionError>) -> Self {
        match result {
            Ok(outcome) => Self {
                success: true,
                error: None,
                error_kind: None,
                summary: outcome.summary,
                effects: outcome.effects,
            },
            Err(err) => Self {
                success: false,
                error_kind: Some(err.kind()),
                error: Some(err.to_string()),
                summary: String::new(),
                effects: Vec::new(),
            },
        }
    }
}
