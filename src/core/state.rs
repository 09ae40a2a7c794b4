//! Uniform game snapshot.
//!
//! ## GameState
//!
//! Every engine projects its owned state into the same header:
//! - Game kind, turn and round counters, phase label
//! - Current player, game-over flag and winners
//! - Seats (name, alive, score) and deck counts
//!
//! Game-specific boards and player ledgers live in [`GameDetail`].
//!
//! Snapshots are plain owned values. Taking one never mutates the engine,
//! and two snapshots with no mutation in between compare equal.

use serde::{Deserialize, Serialize};

use super::player::{PlayerId, Seat};
use crate::games::brass::BrassView;
use crate::games::dune::DuneView;
use crate::games::dungeons::DungeonsView;
use crate::games::gloomhaven::GloomhavenView;
use crate::games::kittens::KittensView;
use crate::games::terraforming::TerraformingView;
use crate::rules::registry::GameKind;

/// Remaining cards in a named pile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckCount {
    pub name: String,
    pub remaining: usize,
}

impl DeckCount {
    pub fn new(name: impl Into<String>, remaining: usize) -> Self {
        Self {
            name: name.into(),
            remaining,
        }
    }
}

/// Per-game board and player view.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "game", rename_all = "snake_case")]
pub enum GameDetail {
    Brass(BrassView),
    Gloomhaven(GloomhavenView),
    Terraforming(TerraformingView),
    Dune(DuneView),
    Dungeons(DungeonsView),
    Kittens(KittensView),
}

/// Snapshot returned by `setup` and `state`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub game: GameKind,
    /// Turns taken since setup.
    pub turn: u32,
    /// Round, generation or era-round depending on the game.
    pub round: u32,
    pub phase: String,
    /// `None` before setup and after the game ends.
    pub current_player: Option<PlayerId>,
    pub game_over: bool,
    pub winners: Vec<PlayerId>,
    pub seats: Vec<Seat>,
    pub decks: Vec<DeckCount>,
    pub detail: GameDetail,
}

impl GameState {
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.seats.len()
    }

    /// Seats still in the game.
    pub fn alive(&self) -> impl Iterator<Item = &Seat> {
        self.seats.iter().filter(|s| s.alive)
    }

    #[must_use]
    pub fn deck(&self, name: &str) -> Option<usize> {
        self.decks
            .iter()
            .find(|d| d.name == name)
            .map(|d| d.remaining)
    }
}
