//! JSON shape of snapshots, actions and reports.

use serde_json::Value;
use tabletop_rules::{
    create_game_with_seed, Action, ActionError, ActionReport, GameKind, GameState, PlayerConfig,
    PlayerId,
};

/// Snapshots survive a JSON round trip unchanged.
#[test]
fn test_state_round_trip() {
    for kind in GameKind::ALL {
        let mut game = create_game_with_seed(kind.id(), 3).unwrap();
        let state = game.setup(&PlayerConfig::numbered(kind.player_count())).unwrap();
        let json = serde_json::to_string(&state).unwrap();
        let back: GameState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state, "{kind}");
    }
}

/// The header carries the game id and the detail is tagged with it too.
#[test]
fn test_state_shape() {
    for kind in GameKind::ALL {
        let mut game = create_game_with_seed(kind.id(), 3).unwrap();
        let state = game.setup(&PlayerConfig::numbered(kind.player_count())).unwrap();
        let value = serde_json::to_value(&state).unwrap();

        assert_eq!(value["game"], Value::from(kind.id()));
        assert_eq!(value["current_player"], Value::from(0));
        assert_eq!(value["game_over"], Value::Bool(false));
        assert_eq!(value["seats"].as_array().map(Vec::len), Some(kind.player_count()));
        assert_eq!(value["seats"][0]["name"], Value::from("Player0"));
        assert!(value["detail"]["game"].is_string(), "{kind}");
    }
}

/// Legal actions serialize with a stable id and a tagged kind.
#[test]
fn test_action_shape() {
    let mut game = create_game_with_seed("exploding_kittens", 5).unwrap();
    game.setup(&PlayerConfig::numbered(5)).unwrap();
    for action in game.legal_actions(PlayerId::new(0)) {
        let value = serde_json::to_value(&action).unwrap();
        assert_eq!(value["id"], Value::from(action.id.as_str()));
        assert_eq!(value["kind"]["game"], Value::from("kittens"));

        let back: Action = serde_json::from_value(value).unwrap();
        assert_eq!(back, action);
    }

    let pass = serde_json::to_value(Action::pass("end turn")).unwrap();
    assert_eq!(pass["kind"]["game"], Value::from("pass"));
    assert!(pass["cost"].is_null());
}

/// Failed reports carry the message and a coarse error kind.
#[test]
fn test_report_shape() {
    let report = ActionReport::from(Err(ActionError::OutOfTurn(PlayerId::new(2))));
    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["success"], Value::Bool(false));
    assert_eq!(value["error_kind"], Value::from("invalid_action"));
    assert!(value["error"].as_str().unwrap().contains("turn"));
    assert_eq!(value["effects"], Value::Array(Vec::new()));
}
