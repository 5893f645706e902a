//! Save/load and configuration file tests.

use std::fs;
use tempfile::TempDir;
use yarg::config::FOV_RADIUS;
use yarg::{
    GameSession, GenerationConfig, Intent, RadiusFov, Snapshot, TurnState, YargError,
};

fn fov_for(session: &mut GameSession) -> RadiusFov {
    let mut fov = RadiusFov::new(FOV_RADIUS);
    let origin = session.player_position();
    fov.recompute(&mut session.grid, origin);
    fov
}

fn wander(session: &mut GameSession, steps: usize) {
    let mut fov = fov_for(session);
    let moves = [(1, 0), (0, 1), (-1, 0), (0, -1), (1, 1)];
    for (dx, dy) in moves.iter().cycle().take(steps) {
        if session.states.current() != TurnState::PlayersTurn {
            break;
        }
        let outcome = session
            .handle_intent(Intent::Move { dx: *dx, dy: *dy }, &fov)
            .unwrap();
        if outcome.fov_recompute {
            fov = fov_for(session);
        }
    }
}

#[test]
fn save_and_load_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("save.json");

    let mut session = GameSession::new(GenerationConfig::for_testing(11)).unwrap();
    wander(&mut session, 12);
    session.save_to_file(&path).unwrap();

    let loaded = GameSession::load_from_file(&path).unwrap();
    assert_eq!(loaded.snapshot(), session.snapshot());
    assert_eq!(loaded.states.current(), session.states.current());
    assert_eq!(loaded.log.len(), session.log.len());
}

#[test]
fn missing_save_is_reported_with_its_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nowhere.json");

    match GameSession::load_from_file(&path) {
        Err(YargError::SaveNotFound(missing)) => assert_eq!(missing, path),
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("loading a missing save should fail"),
    }
}

#[test]
fn corrupt_save_is_a_serialization_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{ \"grid\": 7").unwrap();

    assert!(matches!(
        GameSession::load_from_file(&path),
        Err(YargError::Serde(_))
    ));
}

#[test]
fn snapshot_without_player_is_rejected() {
    let session = GameSession::new(GenerationConfig::for_testing(2)).unwrap();
    let mut snapshot: Snapshot = session.snapshot();
    snapshot.entities.despawn(snapshot.player);

    let json = serde_json::to_string(&snapshot).unwrap();
    assert!(matches!(
        GameSession::load_from_json(&json),
        Err(YargError::InvalidState(_))
    ));
}

#[test]
fn snapshot_with_invalid_config_is_rejected() {
    let session = GameSession::new(GenerationConfig::for_testing(2)).unwrap();
    let mut snapshot = session.snapshot();
    snapshot.config.room_min_size = 2;

    let json = serde_json::to_string(&snapshot).unwrap();
    assert!(matches!(
        GameSession::load_from_json(&json),
        Err(YargError::InvalidConfig(_))
    ));
}

#[test]
fn restored_games_continue_identically() {
    let mut session = GameSession::new(GenerationConfig::for_testing(5)).unwrap();
    wander(&mut session, 6);
    let json = session.save_to_json().unwrap();

    let mut first = GameSession::load_from_json(&json).unwrap();
    let mut second = GameSession::load_from_json(&json).unwrap();
    wander(&mut first, 20);
    wander(&mut second, 20);

    assert_eq!(first.snapshot(), second.snapshot());
}

#[test]
fn generation_config_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    let config = GenerationConfig::for_testing(99);
    fs::write(&path, serde_json::to_string(&config).unwrap()).unwrap();

    let loaded = GenerationConfig::from_json_file(&path).unwrap();
    assert_eq!(loaded, config);

    let session = GameSession::new(loaded).unwrap();
    assert_eq!(session.grid.width, config.map_width);
}

#[test]
fn invalid_generation_config_file_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    let mut config = GenerationConfig::for_testing(1);
    config.room_max_size = config.map_width;
    fs::write(&path, serde_json::to_string(&config).unwrap()).unwrap();

    assert!(matches!(
        GenerationConfig::from_json_file(&path),
        Err(YargError::InvalidConfig(_))
    ));
}
