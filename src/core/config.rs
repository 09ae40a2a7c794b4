//! Setup-time configuration.
//!
//! Games receive one [`PlayerConfig`] per seat. The seat order of the slice
//! is the turn order, and some games derive roles from it (faction, DM).

use serde::{Deserialize, Serialize};

use super::error::ConfigError;

/// Setup record for one seat.
///
/// ```
/// use tabletop_rules::core::PlayerConfig;
///
/// let cfg = PlayerConfig::new("Ada").with_class("wizard");
/// assert_eq!(cfg.class.as_deref(), Some("wizard"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerConfig {
    pub name: String,
    /// Character class, for games with class selection.
    pub class: Option<String>,
}

impl PlayerConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            class: None,
        }
    }

    #[must_use]
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    /// `count` players named `Player0..`.
    #[must_use]
    pub fn numbered(count: usize) -> Vec<PlayerConfig> {
        (0..count).map(|i| PlayerConfig::new(format!("Player{i}"))).collect()
    }
}

/// Reject any roster whose size is not exactly `expected`.
pub fn require_players(
    game: &str,
    expected: usize,
    players: &[PlayerConfig],
) -> Result<(), ConfigError> {
    if players.len() == expected {
        Ok(())
    } else {
        Err(ConfigError::PlayerCount {
            game: game.to_string(),
            expected,
            actual: players.len(),
        })
    }
}
