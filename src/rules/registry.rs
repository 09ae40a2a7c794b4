//! Game registry: game-type id → engine constructor and player count.
//!
//! ```
//! use tabletop_rules::rules::registry::{create_game_with_seed, required_player_count};
//! use tabletop_rules::core::PlayerConfig;
//!
//! let mut game = create_game_with_seed("exploding_kittens", 7).unwrap();
//! let players = PlayerConfig::numbered(required_player_count("exploding_kittens").unwrap());
//! let state = game.setup(&players).unwrap();
//! assert_eq!(state.seats.len(), 5);
//!
//! assert!(create_game_with_seed("monopoly", 7).is_err());
//! ```

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::core::error::ConfigError;
use crate::core::rng::GameRng;
use crate::games::brass::BrassBuilder;
use crate::games::dune::DuneBuilder;
use crate::games::dungeons::DungeonsBuilder;
use crate::games::gloomhaven::GloomhavenBuilder;
use crate::games::kittens::KittensBuilder;
use crate::games::terraforming::TerraformingBuilder;
use crate::rules::engine::RulesEngine;

/// The six supported games.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameKind {
    BrassBirmingham,
    Gloomhaven,
    TerraformingMars,
    Dune,
    DungeonsDragons,
    ExplodingKittens,
}

impl GameKind {
    pub const ALL: [GameKind; 6] = [
        GameKind::BrassBirmingham,
        GameKind::Gloomhaven,
        GameKind::TerraformingMars,
        GameKind::Dune,
        GameKind::DungeonsDragons,
        GameKind::ExplodingKittens,
    ];

    /// Stable game-type id.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            GameKind::BrassBirmingham => "brass_birmingham",
            GameKind::Gloomhaven => "gloomhaven",
            GameKind::TerraformingMars => "terraforming_mars",
            GameKind::Dune => "dune",
            GameKind::DungeonsDragons => "dungeons_dragons",
            GameKind::ExplodingKittens => "exploding_kittens",
        }
    }

    /// Exact number of seats the game requires.
    #[must_use]
    pub const fn player_count(self) -> usize {
        match self {
            GameKind::BrassBirmingham => 4,
            GameKind::Gloomhaven => 4,
            GameKind::TerraformingMars => 5,
            GameKind::Dune => 6,
            GameKind::DungeonsDragons => 6,
            GameKind::ExplodingKittens => 5,
        }
    }

    /// Fresh, un-set-up engine with default configuration.
    #[must_use]
    pub fn create(self, seed: u64) -> Box<dyn RulesEngine> {
        match self {
            GameKind::BrassBirmingham => Box::new(BrassBuilder::new().build(seed)),
            GameKind::Gloomhaven => Box::new(GloomhavenBuilder::new().build(seed)),
            GameKind::TerraformingMars => Box::new(TerraformingBuilder::new().build(seed)),
            GameKind::Dune => Box::new(DuneBuilder::new().build(seed)),
            GameKind::DungeonsDragons => Box::new(DungeonsBuilder::new().build(seed)),
            GameKind::ExplodingKittens => Box::new(KittensBuilder::new().build(seed)),
        }
    }
}

impl std::fmt::Display for GameKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for GameKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GameKind::ALL
            .into_iter()
            .find(|k| k.id() == s)
            .ok_or_else(|| ConfigError::UnknownGame(s.to_string()))
    }
}

/// Create an engine seeded from the operating system.
pub fn create_game(id: &str) -> Result<Box<dyn RulesEngine>, ConfigError> {
    create_game_with_seed(id, GameRng::from_entropy().seed())
}

/// Create an engine with a fixed seed for reproducible play.
pub fn create_game_with_seed(id: &str, seed: u64) -> Result<Box<dyn RulesEngine>, ConfigError> {
    let kind: GameKind = id.parse()?;
    tracing::debug!(game = %kind, seed, "creating game");
    Ok(kind.create(seed))
}

/// Number of seats a game id requires.
pub fn required_player_count(id: &str) -> Result<usize, ConfigError> {
    Ok(id.parse::<GameKind>()?.player_count())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_round_trip() {
        for kind in GameKind::ALL {
            assert_eq!(kind.id().parse::<GameKind>(), Ok(kind));
            assert_eq!(kind.to_string(), kind.id());
        }
    }

    #[test]
    fn test_unknown_game() {
        assert_eq!(
            "chess".parse::<GameKind>(),
            Err(ConfigError::UnknownGame("chess".into()))
        );
        assert!(required_player_count("").is_err());
    }

    #[test]
    fn test_player_counts() {
        let counts: Vec<_> = GameKind::ALL.iter().map(|k| k.player_count()).collect();
        assert_eq!(counts, vec![4, 4, 5, 6, 6, 5]);
    }

    #[test]
    fn test_created_engines_report_their_kind() {
        for kind in GameKind::ALL {
            let engine = kind.create(1);
            assert_eq!(engine.kind(), kind);
            assert!(!engine.is_set_up());
            assert_eq!(engine.current_player(), None);
        }
    }

    #[test]
    fn test_wire_id() {
        let json = serde_json::to_string(&GameKind::TerraformingMars).unwrap();
        assert_eq!(json, "\"terraforming_mars\"");
    }
}
