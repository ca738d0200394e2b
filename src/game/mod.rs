//! # Game Module
//!
//! The live simulation: entity model, enemy AI, collision/combat rules, room
//! registries and the fixed-tick session state.
//!
//! This module contains the building blocks of a Reverie run:
//! - Content catalog (room archetypes, tiles, enemy/buff/item stats)
//! - Sprites, pixel masks and waypoint movement
//! - Per-room entity registries and level snapshots
//! - Enemy AI and the per-tick collision and combat resolver
//! - The session state that ties them together

pub mod actions;
pub mod ai;
pub mod catalog;
pub mod collision;
pub mod entities;
pub mod events;
pub mod level;
pub mod mask;
pub mod movement;
pub mod room;
pub mod sprite;
pub mod state;

pub use actions::*;
pub use ai::*;
pub use catalog::*;
pub use collision::*;
pub use entities::*;
pub use events::*;
pub use level::*;
pub use mask::*;
pub use movement::*;
pub use room::*;
pub use sprite::*;
pub use state::*;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Address of a cell in the dungeon map grid.
///
/// # Examples
///
/// ```
/// use reverie::{Direction, GridPosition};
///
/// let pos = GridPosition::new(19, 19);
/// assert_eq!(pos.step(Direction::Right, 40), Some(GridPosition::new(19, 20)));
/// assert_eq!(GridPosition::new(0, 5).step(Direction::Up, 40), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPosition {
    pub row: usize,
    pub col: usize,
}

impl GridPosition {
    /// Creates a new grid position.
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Returns the neighbouring cell in `direction`, if it lies inside a
    /// `size`×`size` grid.
    pub fn step(self, direction: Direction, size: usize) -> Option<GridPosition> {
        let (d_row, d_col) = direction.to_delta();
        let row = self.row as isize + d_row;
        let col = self.col as isize + d_col;
        if row < 0 || col < 0 || row as usize >= size || col as usize >= size {
            return None;
        }
        Some(GridPosition::new(row as usize, col as usize))
    }

    /// Returns the in-bounds orthogonal neighbours paired with their direction.
    pub fn neighbors(self, size: usize) -> Vec<(Direction, GridPosition)> {
        Direction::all()
            .into_iter()
            .filter_map(|direction| self.step(direction, size).map(|pos| (direction, pos)))
            .collect()
    }
}

/// The four door sides of a room, in the order used by door masks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    /// Converts a direction to a `(row, col)` delta on the map grid.
    pub fn to_delta(self) -> (isize, isize) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Right => (0, 1),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
        }
    }

    /// The side a player arrives through after leaving through this one.
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Right => Direction::Left,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
        }
    }

    /// Returns all 4 directions in door-mask order (up, right, down, left).
    pub fn all() -> [Direction; 4] {
        [Direction::Up, Direction::Right, Direction::Down, Direction::Left]
    }
}

/// Unique identifier for game entities.
pub type EntityId = Uuid;

/// Creates a new unique entity ID.
pub fn new_entity_id() -> EntityId {
    Uuid::new_v4()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_position_step() {
        let pos = GridPosition::new(5, 5);
        assert_eq!(pos.step(Direction::Up, 10), Some(GridPosition::new(4, 5)));
        assert_eq!(pos.step(Direction::Right, 10), Some(GridPosition::new(5, 6)));
        assert_eq!(pos.step(Direction::Down, 10), Some(GridPosition::new(6, 5)));
        assert_eq!(pos.step(Direction::Left, 10), Some(GridPosition::new(5, 4)));
    }

    #[test]
    fn test_grid_position_edges() {
        let corner = GridPosition::new(0, 9);
        assert_eq!(corner.step(Direction::Up, 10), None);
        assert_eq!(corner.step(Direction::Right, 10), None);
        assert_eq!(corner.neighbors(10).len(), 2);
    }

    #[test]
    fn test_direction_opposite() {
        for direction in Direction::all() {
            assert_eq!(direction.opposite().opposite(), direction);
            assert_ne!(direction.opposite(), direction);
        }
    }

    #[test]
    fn test_entity_id_uniqueness() {
        let id1 = new_entity_id();
        let id2 = new_entity_id();
        assert_ne!(id1, id2);
    }
}
