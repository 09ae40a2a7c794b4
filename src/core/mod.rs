//! Core types shared by every engine: players, RNG, dice, decks, actions,
//! outcomes, errors and the uniform snapshot.
//!
//! Nothing here knows a game's rules. Engines compose these pieces.

pub mod action;
pub mod config;
pub mod deck;
pub mod dice;
pub mod error;
pub mod grid;
pub mod outcome;
pub mod player;
pub mod rng;
pub mod state;

pub use action::{Action, ActionKind, Cost, Resource};
pub use config::PlayerConfig;
pub use deck::{Deck, DeckPosition};
pub use dice::{Dice, DiceRoll, ScriptedDice};
pub use error::{ActionError, ConfigError, ErrorKind};
pub use grid::{Bounds, Cell};
pub use outcome::{ActionReport, Effect, Outcome};
pub use player::{PlayerId, PlayerMap, Seat};
pub use rng::GameRng;
pub use state::{DeckCount, GameDetail, GameState};
