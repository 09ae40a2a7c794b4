//! Rules engine trait for game implementations.
//!
//! Every game implements `RulesEngine`, the lifecycle contract:
//! setup, state query, legal-action enumeration, execution, turn
//! advancement and termination.
//!
//! ## Implementation Notes
//!
//! - `state` and `legal_actions` are pure reads
//! - `legal_actions`: return an empty vec if the player can't act
//! - `execute`: validate fully before mutating, never move the turn pointer
//! - `advance_turn`: the only place turn, round and phase counters move
//! - `is_terminal`: return `None` while the game continues

use serde::{Deserialize, Serialize};

use crate::core::action::{Action, Cost};
use crate::core::config::PlayerConfig;
use crate::core::error::{ActionError, ConfigError};
use crate::core::outcome::Outcome;
use crate::core::player::{PlayerId, Seat};
use crate::core::state::GameState;
use crate::rules::registry::GameKind;

/// Result of a completed game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    /// Single winner.
    Winner(PlayerId),
    /// Draw (no winner).
    Draw,
    /// Multiple winners (team games, shared victory).
    Winners(Vec<PlayerId>),
}

impl GameResult {
    /// Check if a player won.
    #[must_use]
    pub fn is_winner(&self, player: PlayerId) -> bool {
        match self {
            GameResult::Winner(p) => *p == player,
            GameResult::Winners(ps) => ps.contains(&player),
            GameResult::Draw => false,
        }
    }

    /// Winning seats, empty for a draw.
    #[must_use]
    pub fn winners(&self) -> Vec<PlayerId> {
        match self {
            GameResult::Winner(p) => vec![*p],
            GameResult::Winners(ps) => ps.clone(),
            GameResult::Draw => Vec::new(),
        }
    }

    /// Collapse a list of top scorers into a result.
    #[must_use]
    pub fn from_leaders(mut leaders: Vec<PlayerId>) -> Self {
        match leaders.len() {
            0 => GameResult::Draw,
            1 => GameResult::Winner(leaders[0]),
            _ => {
                leaders.sort();
                GameResult::Winners(leaders)
            }
        }
    }
}

/// Rules engine trait.
///
/// Object safe, so the registry and session directory can hold
/// `Box<dyn RulesEngine>`.
pub trait RulesEngine: Send + Sync {
    /// Which game this engine plays.
    fn kind(&self) -> GameKind;

    /// Seat the players and build the initial board.
    ///
    /// Fails on the wrong player count, an unknown class selection, or a
    /// second call.
    fn setup(&mut self, players: &[PlayerConfig]) -> Result<GameState, ConfigError>;

    /// Full snapshot of the current state.
    fn state(&self) -> GameState;

    /// Every action `player` may execute right now.
    fn legal_actions(&self, player: PlayerId) -> Vec<Action>;

    /// Validate and apply one action for `player`.
    fn execute(&mut self, player: PlayerId, action: &Action) -> Result<Outcome, ActionError>;

    /// Move to the next eligible player, running upkeep on wraparound.
    fn advance_turn(&mut self);

    /// Whose turn it is. `None` before setup and after game over.
    fn current_player(&self) -> Option<PlayerId>;

    /// All seats in turn order, empty before setup.
    fn seats(&self) -> &[Seat];

    /// Check if the game is over.
    ///
    /// Returns `Some(result)` if the game has ended, `None` if it continues.
    fn is_terminal(&self) -> Option<GameResult>;

    // === Provided Methods ===

    /// Whether `player` has finished this turn's obligations.
    fn turn_complete(&self, _player: PlayerId) -> bool {
        false
    }

    fn is_set_up(&self) -> bool {
        !self.seats().is_empty()
    }

    /// Common actor checks, run at the top of every `execute`.
    fn check_actor(&self, player: PlayerId) -> Result<(), ActionError> {
        if !self.is_set_up() {
            return Err(ActionError::NotSetUp);
        }
        if self.is_terminal().is_some() {
            return Err(ActionError::GameOver);
        }
        let seat = self
            .seats()
            .get(player.index())
            .ok_or(ActionError::UnknownPlayer(player))?;
        if !seat.alive {
            return Err(ActionError::Eliminated(player));
        }
        if self.current_player() != Some(player) {
            return Err(ActionError::OutOfTurn(player));
        }
        if self.turn_complete(player) {
            return Err(ActionError::TurnComplete(player));
        }
        Ok(())
    }

    /// Whether `player` may act at all right now.
    fn can_act(&self, player: PlayerId) -> bool {
        self.check_actor(player).is_ok()
    }
}

/// Reject an action whose advertised cost no longer matches the state.
pub fn check_cost(action: &Action, derived: Option<Cost>) -> Result<(), ActionError> {
    if action.cost == derived {
        Ok(())
    } else {
        Err(ActionError::Stale(format!(
            "{} now costs {}",
            action.id,
            derived.map_or_else(|| "nothing".to_string(), |c| format!("{} {}", c.amount, c.resource)),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::action::Resource;

    #[test]
    fn test_game_result_is_winner() {
        let result = GameResult::Winner(PlayerId::new(1));
        assert!(!result.is_winner(PlayerId::new(0)));
        assert!(result.is_winner(PlayerId::new(1)));

        let draw = GameResult::Draw;
        assert!(!draw.is_winner(PlayerId::new(0)));

        let team = GameResult::Winners(vec![PlayerId::new(0), PlayerId::new(2)]);
        assert!(team.is_winner(PlayerId::new(0)));
        assert!(!team.is_winner(PlayerId::new(1)));
        assert!(team.is_winner(PlayerId::new(2)));
    }

    #[test]
    fn test_from_leaders() {
        assert_eq!(GameResult::from_leaders(vec![]), GameResult::Draw);
        assert_eq!(
            GameResult::from_leaders(vec![PlayerId::new(3)]),
            GameResult::Winner(PlayerId::new(3))
        );
        assert_eq!(
            GameResult::from_leaders(vec![PlayerId::new(3), PlayerId::new(1)]).winners(),
            vec![PlayerId::new(1), PlayerId::new(3)]
        );
    }

    #[test]
    fn test_check_cost_stale() {
        let action = Action::pass("x").with_cost(Cost::new(Resource::Money, 10));
        assert!(check_cost(&action, Some(Cost::new(Resource::Money, 10))).is_ok());
        assert!(matches!(
            check_cost(&action, Some(Cost::new(Resource::Money, 12))),
            Err(ActionError::Stale(_))
        ));
        assert!(matches!(check_cost(&action, None), Err(ActionError::Stale(_))));
    }
}
