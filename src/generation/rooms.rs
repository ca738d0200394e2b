//! # Room Layout Generation
//!
//! Builds the contents of a room whose archetype has no hand-made level file.
//! Every layout has a wall border with door gaps on the archetype's open
//! sides. Basic rooms get pillars, shrubs, breakable debris, traps and an
//! encounter; shops get a row of buffs instead of enemies. The start room is
//! left quiet.

use crate::config::{TILES_X, TILES_Y};
use crate::game::{
    Catalog, Direction, LevelSnapshot, LevelSource, PlacedRecord, RoomArchetype, RoomKind, RoomRequest, TileRecord,
    TileRole,
};
use crate::generation::{EncounterGenerator, GenerationConfig, Generator, LootScatter, ShopStock};
use crate::{ReverieError, ReverieResult, Vector2};
use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use std::rc::Rc;

/// Quarter-turn orientations used for randomly placed decorations.
const ORIENTATIONS: [i32; 4] = [0, 90, 180, 270];

/// Entities placed at random stay this far (in pixels) from door tiles.
pub const DOOR_CLEARANCE: f32 = 150.0;

/// Background cells of the door gap on `side`, as `(row, col)`.
pub fn door_cells(side: Direction) -> [(usize, usize); 2] {
    let mid_col = TILES_X / 2;
    let mid_row = TILES_Y / 2;
    match side {
        Direction::Up => [(0, mid_col - 1), (0, mid_col)],
        Direction::Down => [(TILES_Y - 1, mid_col - 1), (TILES_Y - 1, mid_col)],
        Direction::Left => [(mid_row - 1, 0), (mid_row, 0)],
        Direction::Right => [(mid_row - 1, TILES_X - 1), (mid_row, TILES_X - 1)],
    }
}

fn side_orientation(side: Direction) -> i32 {
    match side {
        Direction::Up => 0,
        Direction::Right => 270,
        Direction::Down => 180,
        Direction::Left => 90,
    }
}

/// Centers of every door tile in `layout`.
pub fn door_positions(layout: &LevelSnapshot, catalog: &Catalog) -> Vec<Vector2> {
    let mut doors = Vec::new();
    for (row, tiles) in layout.background.iter().enumerate() {
        for (col, tile) in tiles.iter().enumerate() {
            if matches!(catalog.tile(&tile.index), Ok(spec) if spec.role == TileRole::Door) {
                doors.push(LevelSnapshot::tile_center(row, col));
            }
        }
    }
    doors
}

/// Floor tile centers at least `clearance` pixels from every point in
/// `keep_clear` and not already holding a placed entity.
pub fn free_floor(layout: &LevelSnapshot, catalog: &Catalog, keep_clear: &[Vector2], clearance: f32) -> Vec<Vector2> {
    let taken: Vec<Vector2> = layout
        .shrubs
        .iter()
        .chain(&layout.enemies)
        .chain(&layout.traps)
        .map(|record| record.position)
        .chain(layout.buffs.iter().chain(&layout.items).map(|record| record.position))
        .collect();

    let mut floor = Vec::new();
    for (row, tiles) in layout.background.iter().enumerate() {
        for (col, tile) in tiles.iter().enumerate() {
            if !matches!(catalog.tile(&tile.index), Ok(spec) if spec.role == TileRole::Floor) {
                continue;
            }
            let center = LevelSnapshot::tile_center(row, col);
            let near_door = keep_clear.iter().any(|point| point.distance_to(center) < clearance);
            let occupied = taken.iter().any(|point| point.distance_to(center) < 1.0);
            if !near_door && !occupied {
                floor.push(center);
            }
        }
    }
    floor
}

/// Lays out one room for an archetype.
pub struct RoomLayoutGenerator<'a> {
    catalog: &'a Catalog,
    archetype: &'a RoomArchetype,
    is_start: bool,
}

impl<'a> RoomLayoutGenerator<'a> {
    pub fn new(catalog: &'a Catalog, archetype: &'a RoomArchetype, is_start: bool) -> Self {
        Self {
            catalog,
            archetype,
            is_start,
        }
    }

    /// Floor everywhere, walls around the edge, door gaps on open sides.
    fn shell(&self) -> LevelSnapshot {
        let palette = &self.catalog.palette;
        let mut layout = LevelSnapshot::blank(&palette.floor);

        for col in 0..TILES_X {
            layout.background[0][col] = TileRecord::new(&palette.wall, side_orientation(Direction::Up));
            layout.background[TILES_Y - 1][col] = TileRecord::new(&palette.wall, side_orientation(Direction::Down));
        }
        for row in 1..TILES_Y - 1 {
            layout.background[row][0] = TileRecord::new(&palette.wall, side_orientation(Direction::Left));
            layout.background[row][TILES_X - 1] = TileRecord::new(&palette.wall, side_orientation(Direction::Right));
        }

        for side in Direction::all() {
            if self.archetype.doors.has(side) {
                for (row, col) in door_cells(side) {
                    layout.background[row][col] = TileRecord::new(&palette.door, side_orientation(side));
                }
            }
        }
        layout
    }

    /// Scatters pillars through the interior, keeping the lanes between the
    /// doors and the room center clear.
    fn place_pillars(&self, layout: &mut LevelSnapshot, rng: &mut StdRng) {
        let lane_rows = TILES_Y / 2 - 2..=TILES_Y / 2 + 1;
        let lane_cols = TILES_X / 2 - 2..=TILES_X / 2 + 1;
        let count = rng.gen_range(0..=6);
        for _ in 0..count {
            let row = rng.gen_range(2..TILES_Y - 2);
            let col = rng.gen_range(2..TILES_X - 2);
            if lane_rows.contains(&row) || lane_cols.contains(&col) {
                continue;
            }
            layout.background[row][col] = TileRecord::new(&self.catalog.palette.pillar, 0);
        }
    }

    fn scatter<R: Rng>(&self, layout: &LevelSnapshot, indices: &[String], count: usize, rng: &mut R) -> Vec<PlacedRecord> {
        let doors = door_positions(layout, self.catalog);
        let floor = free_floor(layout, self.catalog, &doors, DOOR_CLEARANCE);
        let positions: Vec<Vector2> = floor.choose_multiple(rng, count).copied().collect();
        let mut placed = Vec::with_capacity(positions.len());
        for position in positions {
            let (Some(index), Some(orientation)) = (indices.choose(rng), ORIENTATIONS.choose(rng)) else {
                break;
            };
            placed.push(PlacedRecord::new(index.clone(), position, *orientation));
        }
        placed
    }
}

impl Generator<LevelSnapshot> for RoomLayoutGenerator<'_> {
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> ReverieResult<LevelSnapshot> {
        let mut layout = self.shell();
        let basic = self.archetype.kind == RoomKind::Basic;

        if basic && !self.is_start {
            self.place_pillars(&mut layout, rng);
        }

        let mut decorations = self.catalog.palette.shrubs.clone();
        decorations.extend(self.catalog.debris.keys().cloned());
        let shrub_count = rng.gen_range(2..=6);
        layout.shrubs = self.scatter(&layout, &decorations, shrub_count, rng);

        if basic && !self.is_start {
            let trap_count = rng.gen_range(0..=2);
            layout.traps = self.scatter(&layout, &self.catalog.palette.traps, trap_count, rng);
            layout.enemies = EncounterGenerator::new(self.catalog, &layout).generate(config, rng)?;
            layout.items = LootScatter::new(self.catalog, &layout).generate(config, rng)?;
        }
        if self.archetype.kind == RoomKind::Shop {
            layout.buffs = ShopStock::default().generate(config, rng)?;
        }

        self.validate(&layout, config)?;
        debug!(
            "Laid out '{}': {} shrubs, {} enemies, {} buffs",
            self.archetype.name,
            layout.shrubs.len(),
            layout.enemies.len(),
            layout.buffs.len()
        );
        Ok(layout)
    }

    fn validate(&self, layout: &LevelSnapshot, _config: &GenerationConfig) -> ReverieResult<()> {
        for side in Direction::all() {
            for (row, col) in door_cells(side) {
                let role = self.catalog.tile(&layout.background[row][col].index)?.role;
                if (role == TileRole::Door) != self.archetype.doors.has(side) {
                    return Err(ReverieError::GenerationFailed(format!(
                        "layout for '{}' has the wrong door state on the {:?} side",
                        self.archetype.name, side
                    )));
                }
            }
        }
        if self.is_start && !layout.enemies.is_empty() {
            return Err(ReverieError::GenerationFailed("start room contains enemies".to_string()));
        }
        Ok(())
    }

    fn generator_type(&self) -> &'static str {
        "RoomLayoutGenerator"
    }
}

/// Produces every room procedurally. Used directly when no level directory
/// is configured and as the fallback when a level file is missing or broken.
#[derive(Debug, Clone)]
pub struct ProceduralLevelSource {
    catalog: Rc<Catalog>,
    config: GenerationConfig,
}

impl ProceduralLevelSource {
    pub fn new(catalog: Rc<Catalog>, config: GenerationConfig) -> Self {
        Self { catalog, config }
    }
}

impl LevelSource for ProceduralLevelSource {
    fn load_level(&self, request: &RoomRequest<'_>, rng: &mut StdRng) -> ReverieResult<LevelSnapshot> {
        RoomLayoutGenerator::new(&self.catalog, request.archetype, request.is_start).generate(&self.config, rng)
    }

    fn source_name(&self) -> &'static str {
        "procedural"
    }
}
