//! The game contract and the pieces shared between rule engines.
//!
//! - `engine`: the `RulesEngine` lifecycle trait and `GameResult`
//! - `registry`: game-type ids, player counts and constructors
//! - `combat`: d20 attack resolution and hit points
//!
//! The session layer and transports call into `RulesEngine` but never
//! interpret game-specific concepts directly.

pub mod combat;
pub mod engine;
pub mod registry;

pub use combat::{resolve_attack, Attack, AttackRoll, HitPoints};
pub use engine::{check_cost, GameResult, RulesEngine};
pub use registry::{create_game, create_game_with_seed, required_player_count, GameKind};
