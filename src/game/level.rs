//! # Level Snapshots
//!
//! The persisted form of a room and the sources rooms are loaded from.
//!
//! A level file is a JSON object:
//!
//! ```json
//! {
//!   "background": [[{"index": "floor", "orientation": 0}, ...], ...],
//!   "shrubs":  [{"index": "fern", "position": [x, y], "orientation": 0}, ...],
//!   "enemies": [{"index": "gloom", "position": [x, y], "orientation": 0}, ...],
//!   "traps":   [{"index": "thorns", "position": [x, y], "orientation": 0}, ...],
//!   "buffs":   [{"index": "random", "position": [x, y]}, ...],
//!   "items":   [{"index": "money", "position": [x, y]}, ...]
//! }
//! ```
//!
//! `background` is `TILES_Y` rows of `TILES_X` tiles.

use crate::config::{TILES_X, TILES_Y};
use crate::game::{GridPosition, RoomArchetype};
use crate::{ReverieError, ReverieResult, Vector2};
use rand::rngs::StdRng;
use serde::de::Error as _;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A background tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileRecord {
    pub index: String,
    pub orientation: i32,
}

impl TileRecord {
    pub fn new(index: impl Into<String>, orientation: i32) -> Self {
        Self {
            index: index.into(),
            orientation,
        }
    }
}

/// A placed, oriented entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedRecord {
    pub index: String,
    pub position: Vector2,
    #[serde(default)]
    pub orientation: i32,
}

impl PlacedRecord {
    pub fn new(index: impl Into<String>, position: Vector2, orientation: i32) -> Self {
        Self {
            index: index.into(),
            position,
            orientation,
        }
    }
}

/// A placed entity without orientation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerRecord {
    pub index: String,
    pub position: Vector2,
}

impl MarkerRecord {
    pub fn new(index: impl Into<String>, position: Vector2) -> Self {
        Self {
            index: index.into(),
            position,
        }
    }
}

/// Persisted state of one room.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelSnapshot {
    pub background: Vec<Vec<TileRecord>>,
    #[serde(default)]
    pub shrubs: Vec<PlacedRecord>,
    #[serde(default)]
    pub enemies: Vec<PlacedRecord>,
    #[serde(default)]
    pub traps: Vec<PlacedRecord>,
    #[serde(default)]
    pub buffs: Vec<MarkerRecord>,
    #[serde(default)]
    pub items: Vec<MarkerRecord>,
}

impl LevelSnapshot {
    /// A room made entirely of `tile`, with nothing in it.
    pub fn blank(tile: &str) -> Self {
        Self {
            background: vec![vec![TileRecord::new(tile, 0); TILES_X]; TILES_Y],
            ..Default::default()
        }
    }

    /// Parses and checks a level file's contents. Any schema violation is
    /// reported as [`ReverieError::MalformedLevel`].
    pub fn from_json(name: &str, text: &str) -> ReverieResult<Self> {
        let malformed = |source| ReverieError::MalformedLevel {
            name: name.to_string(),
            source,
        };
        let snapshot: LevelSnapshot = serde_json::from_str(text).map_err(malformed)?;
        snapshot.check_dimensions().map_err(malformed)?;
        Ok(snapshot)
    }

    pub fn to_json(&self) -> ReverieResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    fn check_dimensions(&self) -> Result<(), serde_json::Error> {
        if self.background.len() != TILES_Y {
            return Err(serde_json::Error::custom(format!(
                "background has {} rows, expected {}",
                self.background.len(),
                TILES_Y
            )));
        }
        if let Some((row, tiles)) = self.background.iter().enumerate().find(|(_, tiles)| tiles.len() != TILES_X) {
            return Err(serde_json::Error::custom(format!(
                "background row {} has {} tiles, expected {}",
                row,
                tiles.len(),
                TILES_X
            )));
        }
        Ok(())
    }

    /// Center of the background tile at `(row, col)` in room pixels.
    pub fn tile_center(row: usize, col: usize) -> Vector2 {
        use crate::config::{TILE_HEIGHT, TILE_WIDTH};
        Vector2::new(
            col as f32 * TILE_WIDTH + TILE_WIDTH / 2.0,
            row as f32 * TILE_HEIGHT + TILE_HEIGHT / 2.0,
        )
    }
}

/// What the session asks a [`LevelSource`] for when a room is entered for
/// the first time.
#[derive(Debug, Clone, Copy)]
pub struct RoomRequest<'a> {
    pub archetype: &'a RoomArchetype,
    pub position: GridPosition,
    /// The room the run starts in
    pub is_start: bool,
}

/// Provides the initial contents of rooms.
pub trait LevelSource {
    fn load_level(&self, request: &RoomRequest<'_>, rng: &mut StdRng) -> ReverieResult<LevelSnapshot>;

    /// Name for logging.
    fn source_name(&self) -> &'static str;
}

/// Reads hand-made levels from `<root>/<archetype>.json`.
#[derive(Debug, Clone)]
pub struct DirectoryLevelSource {
    root: PathBuf,
}

impl DirectoryLevelSource {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn path_for(&self, archetype: &str) -> PathBuf {
        self.root.join(format!("{}.json", archetype))
    }

    /// Writes a snapshot as the level file for `archetype`.
    pub fn save_level(&self, archetype: &str, snapshot: &LevelSnapshot) -> ReverieResult<()> {
        std::fs::create_dir_all(&self.root)?;
        std::fs::write(self.path_for(archetype), snapshot.to_json()?)?;
        Ok(())
    }
}

impl LevelSource for DirectoryLevelSource {
    fn load_level(&self, request: &RoomRequest<'_>, _rng: &mut StdRng) -> ReverieResult<LevelSnapshot> {
        let name = &request.archetype.name;
        let text = std::fs::read_to_string(self.path_for(name))?;
        LevelSnapshot::from_json(name, &text)
    }

    fn source_name(&self) -> &'static str {
        "directory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{DoorMask, RoomKind};
    use rand::SeedableRng;

    #[test]
    fn test_records_match_level_file_schema() {
        let mut snapshot = LevelSnapshot::blank("floor");
        snapshot.enemies.push(PlacedRecord::new("gloom", Vector2::new(10.0, 20.0), 90));
        snapshot.buffs.push(MarkerRecord::new("random", Vector2::new(5.0, 5.0)));

        let value: serde_json::Value = serde_json::from_str(&snapshot.to_json().unwrap()).unwrap();
        assert_eq!(value["background"][0][0], serde_json::json!({"index": "floor", "orientation": 0}));
        assert_eq!(
            value["enemies"][0],
            serde_json::json!({"index": "gloom", "position": [10.0, 20.0], "orientation": 90})
        );
        assert_eq!(value["buffs"][0], serde_json::json!({"index": "random", "position": [5.0, 5.0]}));
    }

    #[test]
    fn test_from_json_accepts_valid_level() {
        let json = LevelSnapshot::blank("floor").to_json().unwrap();
        let snapshot = LevelSnapshot::from_json("end_up", &json).unwrap();
        assert_eq!(snapshot.background.len(), TILES_Y);
        assert!(snapshot.enemies.is_empty());
    }

    #[test]
    fn test_from_json_rejects_wrong_dimensions() {
        let mut snapshot = LevelSnapshot::blank("floor");
        snapshot.background.pop();
        let json = snapshot.to_json().unwrap();
        match LevelSnapshot::from_json("broken", &json) {
            Err(ReverieError::MalformedLevel { name, .. }) => assert_eq!(name, "broken"),
            other => panic!("expected malformed level, got {:?}", other),
        }
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(
            LevelSnapshot::from_json("junk", "{\"background\": 3}"),
            Err(ReverieError::MalformedLevel { .. })
        ));
    }

    #[test]
    fn test_directory_source_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let source = DirectoryLevelSource::new(dir.path());
        let archetype = RoomArchetype::new("end_left", DoorMask::new(false, false, false, true), RoomKind::Basic);

        let mut snapshot = LevelSnapshot::blank("floor");
        snapshot.items.push(MarkerRecord::new("money", Vector2::new(300.0, 300.0)));
        source.save_level(&archetype.name, &snapshot).unwrap();

        let request = RoomRequest {
            archetype: &archetype,
            position: GridPosition::new(0, 0),
            is_start: false,
        };
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(source.load_level(&request, &mut rng).unwrap(), snapshot);
    }

    #[test]
    fn test_directory_source_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = DirectoryLevelSource::new(dir.path());
        let archetype = RoomArchetype::new("nowhere", DoorMask::new(true, false, false, false), RoomKind::Basic);
        let request = RoomRequest {
            archetype: &archetype,
            position: GridPosition::new(0, 0),
            is_start: false,
        };
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(source.load_level(&request, &mut rng), Err(ReverieError::Io(_))));
    }
}
