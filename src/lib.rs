//! # tabletop-rules
//!
//! Turn-based rule engines for six tabletop games behind one lifecycle
//! contract.
//!
//! ## Design Principles
//!
//! 1. **One Contract**: every game implements [`RulesEngine`]: `setup`,
//!    `state`, `legal_actions`, `execute`, `advance_turn`. Callers never need
//!    to know which game they are driving.
//!
//! 2. **Validate, Then Apply**: `execute` checks the actor, phase and cost
//!    into a private plan before touching state. A rejected action leaves
//!    the game exactly as it was.
//!
//! 3. **Seeded Randomness**: each engine owns a [`GameRng`]. The same seed
//!    and the same actions replay the same game.
//!
//! ## Modules
//!
//! - `core`: players, RNG, dice, decks, grids, actions, outcomes, errors, snapshots
//! - `rules`: the engine trait, shared combat resolution and the game registry
//! - `games`: brass, dune, dungeons, gloomhaven, kittens, terraforming
//! - `session`: an in-process directory of running games
//!
//! ```
//! use tabletop_rules::{create_game_with_seed, PlayerConfig, PlayerId};
//!
//! let mut game = create_game_with_seed("exploding_kittens", 7).unwrap();
//! let state = game.setup(&PlayerConfig::numbered(5)).unwrap();
//! assert_eq!(state.current_player, Some(PlayerId::new(0)));
//!
//! let draw = game
//!     .legal_actions(PlayerId::new(0))
//!     .into_iter()
//!     .find(|a| a.id == "draw_card")
//!     .unwrap();
//! game.execute(PlayerId::new(0), &draw).unwrap();
//! game.advance_turn();
//! ```

pub mod core;
pub mod games;
pub mod rules;
pub mod session;

// Re-export commonly used types
pub use crate::core::{
    Action, ActionError, ActionKind, ActionReport, ConfigError, Cost, Effect, ErrorKind,
    GameDetail, GameRng, GameState, Outcome, PlayerConfig, PlayerId, PlayerMap, Resource, Seat,
};

pub use crate::rules::{
    create_game, create_game_with_seed, required_player_count, GameKind, GameResult, RulesEngine,
};

pub use crate::session::{Features, SessionDirectory, SessionError, SessionInfo};
