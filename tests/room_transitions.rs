//! Moving between rooms through doors on a hand-built two-room map.

use reverie::{
    Catalog, Direction, DoorMask, Entity, GameConfig, GameEvent, GameState, GenerationConfig, GridPosition,
    InputFrame, MapGrid, ProceduralLevelSource, ReverieResult, Vector2,
};
use std::rc::Rc;

/// A full-size map whose root opens right into a single dead end.
fn two_room_map() -> MapGrid {
    let mut map = MapGrid::new(40, 0);
    let root = map.root();
    let east = GridPosition::new(root.row, root.col + 1);

    let cell = map.cell_mut(root);
    cell.archetype = Some("end_right".to_string());
    cell.doors = DoorMask::new(false, true, false, false);

    let cell = map.cell_mut(east);
    cell.archetype = Some("end_left".to_string());
    cell.doors = DoorMask::new(false, false, false, true);
    map
}

fn new_state() -> ReverieResult<GameState> {
    let config = GameConfig {
        generation: GenerationConfig::for_testing(5),
        ..GameConfig::default()
    };
    let catalog = Rc::new(Catalog::builtin());
    let source = Box::new(ProceduralLevelSource::new(Rc::clone(&catalog), config.generation.clone()));
    GameState::from_map(config, catalog, source, two_room_map())
}

#[test]
fn test_leaving_right_arrives_at_left_door() -> ReverieResult<()> {
    let mut state = new_state()?;
    let root = state.level_position;
    state.player.translate(Vector2::new(760.0, 0.0));
    assert_eq!(state.player.position(), Vector2::new(1560.0, 500.0));

    let event = state.change_level(Direction::Right)?;
    assert!(matches!(
        event,
        Some(GameEvent::RoomEntered {
            first_visit: true,
            ..
        })
    ));
    assert_eq!(root, GridPosition::new(19, 19));
    assert_eq!(state.level_position, GridPosition::new(19, 20));
    assert_eq!(state.player.position(), Vector2::new(110.0, 500.0));
    assert_eq!(state.room_archetype(), "end_left");
    Ok(())
}

#[test]
fn test_returning_restores_saved_room() -> ReverieResult<()> {
    let mut state = new_state()?;
    let root = state.level_position;
    state.change_level(Direction::Right)?;
    let enemies = state.room.enemies.len();
    assert!(state.map.cell(root).saved_state.is_some());

    let back = state.change_level(Direction::Left)?;
    assert!(matches!(
        back,
        Some(GameEvent::RoomEntered {
            first_visit: false,
            ..
        })
    ));
    assert!(state.in_start_room());
    assert!(state.room.enemies.is_empty());

    state.change_level(Direction::Right)?;
    assert_eq!(state.room.enemies.len(), enemies);
    Ok(())
}

#[test]
fn test_door_without_room_is_ignored() -> ReverieResult<()> {
    let mut state = new_state()?;
    let before = state.player.position();
    assert!(state.change_level(Direction::Up)?.is_none());
    assert!(state.change_level(Direction::Left)?.is_none());
    assert!(state.in_start_room());
    assert_eq!(state.player.position(), before);
    Ok(())
}

#[test]
fn test_walking_into_door_changes_room() -> ReverieResult<()> {
    let mut state = new_state()?;
    // Center of the upper right door tile.
    let door = Vector2::new(1575.0, 475.0);
    state.player.translate(door - state.player.position());

    let events = state.tick(&InputFrame::idle(door))?;
    assert!(events
        .iter()
        .any(|event| matches!(event, GameEvent::DoorEntered { direction: Direction::Right })));
    assert!(events
        .iter()
        .any(|event| matches!(event, GameEvent::RoomEntered { first_visit: true, .. })));
    assert!(!state.in_start_room());
    assert_eq!(state.player.position(), Vector2::new(125.0, 475.0));
    assert_eq!(state.statistics.rooms_explored, 2);
    Ok(())
}
