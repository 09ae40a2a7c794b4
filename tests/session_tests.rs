//! Session directory shared between threads.

use std::thread;

use tabletop_rules::{Features, PlayerConfig, SessionDirectory};

fn play_draws(directory: &SessionDirectory, id: &str, turns: usize) {
    for _ in 0..turns {
        let state = directory.state(id).unwrap();
        if state.game_over {
            return;
        }
        let Some(player) = state.current_player else {
            directory.advance_turn(id).unwrap();
            continue;
        };
        let draw = directory
            .legal_actions(id, player)
            .unwrap()
            .into_iter()
            .find(|a| a.id == "draw_card")
            .unwrap();
        let report = directory.execute(id, player, &draw).unwrap();
        assert!(report.success, "{id}: {:?}", report.error);
        directory.advance_turn(id).unwrap();
    }
}

/// Independent sessions progress in parallel without interfering.
#[test]
fn test_parallel_sessions() {
    let directory = SessionDirectory::new();
    thread::scope(|scope| {
        for i in 0..4u64 {
            let directory = &directory;
            scope.spawn(move || {
                let id = format!("table-{i}");
                directory
                    .create(
                        &id,
                        "exploding_kittens",
                        &PlayerConfig::numbered(5),
                        Features::default(),
                        Some(i),
                    )
                    .unwrap();
                play_draws(directory, &id, 10);
            });
        }
    });

    assert_eq!(directory.ids(), ["table-0", "table-1", "table-2", "table-3"]);
    for id in directory.ids() {
        let state = directory.state(&id).unwrap();
        assert!(state.turn >= 1, "{id}");
    }
}

/// Readers and a writer can share one session.
#[test]
fn test_shared_session() {
    let directory = SessionDirectory::new();
    let features = Features {
        ai_players: true,
        vr_world: false,
    };
    directory
        .create("shared", "exploding_kittens", &PlayerConfig::numbered(5), features, Some(8))
        .unwrap();

    thread::scope(|scope| {
        scope.spawn(|| play_draws(&directory, "shared", 15));
        for _ in 0..3 {
            scope.spawn(|| {
                for _ in 0..50 {
                    let state = directory.state("shared").unwrap();
                    assert_eq!(state.player_count(), 5);
                    assert!(state.alive().count() >= 1);
                }
            });
        }
    });

    assert_eq!(directory.info("shared").unwrap().features, features);
}

/// The same seed in two sessions gives the same game.
#[test]
fn test_seeded_sessions_match() {
    let directory = SessionDirectory::new();
    for id in ["a", "b"] {
        directory
            .create(id, "terraforming_mars", &PlayerConfig::numbered(5), Features::default(), Some(77))
            .unwrap();
    }
    assert_eq!(directory.state("a").unwrap(), directory.state("b").unwrap());
}
