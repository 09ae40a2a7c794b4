//! In-process host for live games, keyed by session id.
//!
//! Each session owns one engine behind an `RwLock`: `execute` and
//! `advance_turn` take the write lock, `state` and `legal_actions` the read
//! lock. Sessions are independent of each other.

use std::sync::{Arc, PoisonError, RwLock};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::core::{Action, ActionReport, ConfigError, GameState, PlayerConfig, PlayerId};
use crate::rules::{create_game, create_game_with_seed, GameKind, RulesEngine};

/// Optional features requested when a session is opened.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Features {
    pub ai_players: bool,
    pub vr_world: bool,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("no session {0:?}")]
    UnknownSession(String),

    #[error("session {0:?} already exists")]
    DuplicateSession(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

struct Session {
    kind: GameKind,
    roster: Vec<PlayerConfig>,
    features: Features,
    engine: RwLock<Box<dyn RulesEngine>>,
}

/// Summary of a running session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub game: GameKind,
    pub roster: Vec<PlayerConfig>,
    pub features: Features,
}

/// All running sessions.
#[derive(Default)]
pub struct SessionDirectory {
    sessions: RwLock<FxHashMap<String, Arc<Session>>>,
}

impl SessionDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and set up a game under `id`. A `seed` makes it reproducible.
    pub fn create(
        &self,
        id: &str,
        game: &str,
        players: &[PlayerConfig],
        features: Features,
        seed: Option<u64>,
    ) -> Result<GameState, SessionError> {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        if sessions.contains_key(id) {
            return Err(SessionError::DuplicateSession(id.to_string()));
        }
        let mut engine = match seed {
            Some(seed) => create_game_with_seed(game, seed)?,
            None => create_game(game)?,
        };
        let state = engine.setup(players)?;
        let kind = engine.kind();
        sessions.insert(
            id.to_string(),
            Arc::new(Session {
                kind,
                roster: players.to_vec(),
                features,
                engine: RwLock::new(engine),
            }),
        );
        info!(session = id, game = %kind, players = players.len(), ?features, "session created");
        Ok(state)
    }

    fn session(&self, id: &str) -> Result<Arc<Session>, SessionError> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
            .ok_or_else(|| SessionError::UnknownSession(id.to_string()))
    }

    pub fn info(&self, id: &str) -> Result<SessionInfo, SessionError> {
        let session = self.session(id)?;
        Ok(SessionInfo {
            game: session.kind,
            roster: session.roster.clone(),
            features: session.features,
        })
    }

    pub fn state(&self, id: &str) -> Result<GameState, SessionError> {
        let session = self.session(id)?;
        let engine = session.engine.read().unwrap_or_else(PoisonError::into_inner);
        Ok(engine.state())
    }

    pub fn legal_actions(&self, id: &str, player: PlayerId) -> Result<Vec<Action>, SessionError> {
        let session = self.session(id)?;
        let engine = session.engine.read().unwrap_or_else(PoisonError::into_inner);
        Ok(engine.legal_actions(player))
    }

    /// Run `action` for `player`. A rejected action is a failed report, not an error.
    pub fn execute(
        &self,
        id: &str,
        player: PlayerId,
        action: &Action,
    ) -> Result<ActionReport, SessionError> {
        let session = self.session(id)?;
        let mut engine = session.engine.write().unwrap_or_else(PoisonError::into_inner);
        let report = ActionReport::from(engine.execute(player, action));
        debug!(session = id, player = %player, action = %action.id, success = report.success, "session execute");
        Ok(report)
    }

    pub fn advance_turn(&self, id: &str) -> Result<GameState, SessionError> {
        let session = self.session(id)?;
        let mut engine = session.engine.write().unwrap_or_else(PoisonError::into_inner);
        engine.advance_turn();
        Ok(engine.state())
    }

    pub fn remove(&self, id: &str) -> Result<(), SessionError> {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
            .map(|_| info!(session = id, "session removed"))
            .ok_or_else(|| SessionError::UnknownSession(id.to_string()))
    }

    /// Session ids, sorted.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        ids.sort();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory_with_kittens() -> SessionDirectory {
        let directory = SessionDirectory::new();
        directory
            .create(
                "table-1",
                "exploding_kittens",
                &PlayerConfig::numbered(5),
                Features::default(),
                Some(11),
            )
            .unwrap();
        directory
    }

    #[test]
    fn test_create_and_query() {
        let directory = directory_with_kittens();
        let info = directory.info("table-1").unwrap();
        assert_eq!(info.game, GameKind::ExplodingKittens);
        assert_eq!(info.roster.len(), 5);
        assert_eq!(directory.state("table-1").unwrap().current_player, Some(PlayerId::new(0)));
        assert!(!directory.legal_actions("table-1", PlayerId::new(0)).unwrap().is_empty());
        assert!(directory.legal_actions("table-1", PlayerId::new(1)).unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_and_unknown_sessions() {
        let directory = directory_with_kittens();
        let again = directory.create(
            "table-1",
            "dune",
            &PlayerConfig::numbered(6),
            Features::default(),
            None,
        );
        assert_eq!(again, Err(SessionError::DuplicateSession("table-1".into())));
        assert_eq!(
            directory.state("table-9"),
            Err(SessionError::UnknownSession("table-9".into()))
        );
        assert_eq!(
            directory.create("t", "chess", &[], Features::default(), None),
            Err(SessionError::Config(ConfigError::UnknownGame("chess".into())))
        );
        assert!(matches!(
            directory.create("t", "dune", &PlayerConfig::numbered(2), Features::default(), None),
            Err(SessionError::Config(ConfigError::PlayerCount { .. }))
        ));
        assert_eq!(directory.ids(), vec!["table-1".to_string()]);
    }

    #[test]
    fn test_execute_reports_and_advance() {
        let directory = directory_with_kittens();
        let p0 = PlayerId::new(0);
        let wrong = directory.execute("table-1", PlayerId::new(3), &Action::pass("")).unwrap();
        assert!(!wrong.success);
        assert!(wrong.error.is_some());

        let draw = directory
            .legal_actions("table-1", p0)
            .unwrap()
            .into_iter()
            .find(|a| a.id == "draw_card")
            .unwrap();
        let report = directory.execute("table-1", p0, &draw).unwrap();
        assert!(report.success);
        let state = directory.advance_turn("table-1").unwrap();
        assert_ne!(state.current_player, Some(p0));
    }

    #[test]
    fn test_remove() {
        let directory = directory_with_kittens();
        directory.remove("table-1").unwrap();
        assert!(directory.ids().is_empty());
        assert_eq!(
            directory.remove("table-1"),
            Err(SessionError::UnknownSession("table-1".into()))
        );
    }
}
