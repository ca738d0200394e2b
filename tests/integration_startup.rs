//! Integration test to ensure a run can start up and play without a window.

use reverie::{
    spawn_point, Catalog, DirectoryLevelSource, Entity, GameConfig, GameState, GenerationConfig, InputFrame,
    LevelSnapshot, MarkerRecord, ReverieResult, Vector2,
};
use std::rc::Rc;

fn test_config(seed: u64) -> GameConfig {
    GameConfig {
        generation: GenerationConfig::for_testing(seed),
        ..GameConfig::default()
    }
}

#[test]
fn test_basic_startup() -> ReverieResult<()> {
    let mut game_state = GameState::from_config(test_config(12345), Rc::new(Catalog::builtin()))?;

    assert!(game_state.in_start_room());
    assert!(game_state.room.enemies.is_empty());
    assert!(!game_state.room.doors.is_empty());
    assert!(game_state.map.shop().is_some());
    assert_eq!(game_state.player.position(), spawn_point());
    assert_eq!(game_state.tick, 0);

    // Standing still in the start room is safe.
    for _ in 0..120 {
        game_state.tick(&InputFrame::idle(spawn_point()))?;
    }
    assert_eq!(game_state.tick, 120);
    assert!(!game_state.game_over);
    assert_eq!(game_state.player.health, game_state.player.stats.max_health);
    Ok(())
}

#[test]
fn test_startup_reads_level_directory() -> ReverieResult<()> {
    let dir = tempfile::tempdir()?;
    let catalog = Catalog::builtin();
    let source = DirectoryLevelSource::new(dir.path());

    let mut snapshot = LevelSnapshot::blank("floor");
    snapshot
        .items
        .push(MarkerRecord::new("money", Vector2::new(400.0, 400.0)));
    for archetype in &catalog.rooms {
        source.save_level(&archetype.name, &snapshot)?;
    }

    let config = GameConfig {
        levels_dir: Some(dir.path().to_path_buf()),
        ..test_config(7)
    };
    let game_state = GameState::from_config(config, Rc::new(catalog))?;
    assert_eq!(game_state.room.items.len(), 1);
    assert!(game_state.room.walls.is_empty());
    Ok(())
}

#[test]
fn test_malformed_level_falls_back_to_generator() -> ReverieResult<()> {
    let dir = tempfile::tempdir()?;
    let catalog = Catalog::builtin();
    for archetype in &catalog.rooms {
        std::fs::write(dir.path().join(format!("{}.json", archetype.name)), "{ not a level")?;
    }

    let config = GameConfig {
        levels_dir: Some(dir.path().to_path_buf()),
        ..test_config(7)
    };
    let game_state = GameState::from_config(config, Rc::new(catalog))?;
    assert!(!game_state.room.walls.is_empty());
    assert!(!game_state.room.doors.is_empty());
    assert!(game_state.room.enemies.is_empty());
    Ok(())
}

#[test]
fn test_config_and_catalog_files_load() -> ReverieResult<()> {
    let dir = tempfile::tempdir()?;

    let config_path = dir.path().join("config.json");
    std::fs::write(&config_path, r#"{ "generation": { "seed": 99, "initial_growth": 6 }, "ai_interval": 5 }"#)?;
    let config = GameConfig::load(&config_path)?;
    assert_eq!(config.generation.seed, 99);
    assert_eq!(config.generation.initial_growth, 6);
    assert_eq!(config.generation.grid_size, 40);
    assert_eq!(config.ai_interval, 5);

    let catalog_path = dir.path().join("catalog.json");
    std::fs::write(&catalog_path, serde_json::to_string_pretty(&Catalog::builtin())?)?;
    let catalog = Catalog::load(&catalog_path)?;
    assert_eq!(catalog, Catalog::builtin());

    let game_state = GameState::from_config(config, Rc::new(catalog))?;
    assert!(game_state.map.rooms().count() <= 6);
    Ok(())
}
