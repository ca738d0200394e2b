//! # Dungeon Map Generation
//!
//! The dungeon is a square grid of cells, each either blank or holding a room
//! archetype. Generation plants a growth budget in the root cell and lets it
//! spread:
//!
//! - A cell with growth above one hands `growth - 1` units to eligible blank
//!   neighbours (neighbours that touch no other occupied cell), one unit at a
//!   time to a random eligible neighbour.
//! - A cell with any growth then becomes a room whose archetype matches the
//!   door mask formed by its occupied neighbours, and its growth is spent.
//!
//! Scans repeat row by row until a full pass changes nothing. Finally one dead
//! end (other than the start room) is turned into a shop.

use crate::game::{Catalog, Direction, DoorMask, GridPosition, LevelSnapshot, RoomKind, ROOT_ARCHETYPE};
use crate::generation::{GenerationConfig, Generator};
use crate::{ReverieError, ReverieResult};
use log::{debug, info, trace};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{HashSet, VecDeque};

/// One cell of the dungeon map.
#[derive(Debug, Clone, PartialEq)]
pub struct MapCell {
    /// Room archetype, or `None` for a blank cell
    pub archetype: Option<String>,
    /// Doors of the assigned archetype
    pub doors: DoorMask,
    /// Unspent growth budget
    pub growth: u32,
    pub position: GridPosition,
    /// Room contents captured when the player last left
    pub saved_state: Option<LevelSnapshot>,
}

impl MapCell {
    pub fn blank(position: GridPosition) -> Self {
        Self {
            archetype: None,
            doors: DoorMask::default(),
            growth: 0,
            position,
            saved_state: None,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.archetype.is_none()
    }

    /// Occupied cells count as neighbours for eligibility and door masks.
    fn is_occupied(&self) -> bool {
        self.growth > 0 || !self.is_blank()
    }

    pub fn is_visited(&self) -> bool {
        self.saved_state.is_some()
    }
}

/// The dungeon map.
///
/// # Examples
///
/// ```
/// use reverie::{GridPosition, MapGrid};
///
/// let map = MapGrid::new(40, 15);
/// assert_eq!(map.root(), GridPosition::new(19, 19));
/// assert_eq!(map.cell(map.root()).growth, 15);
/// assert_eq!(map.cell(map.root()).archetype.as_deref(), Some("4_way"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MapGrid {
    size: usize,
    cells: Vec<MapCell>,
    shop: Option<GridPosition>,
}

impl MapGrid {
    /// A blank grid with the root archetype and `initial_growth` planted in
    /// the center cell.
    pub fn new(size: usize, initial_growth: u32) -> Self {
        let cells = (0..size * size)
            .map(|index| MapCell::blank(GridPosition::new(index / size, index % size)))
            .collect();
        let mut grid = Self { size, cells, shop: None };
        let root = grid.root();
        if size > 0 {
            let cell = grid.cell_mut(root);
            cell.archetype = Some(ROOT_ARCHETYPE.to_string());
            cell.growth = initial_growth;
        }
        grid
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Where the run starts.
    pub fn root(&self) -> GridPosition {
        let center = self.size.saturating_sub(1) / 2;
        GridPosition::new(center, center)
    }

    /// The shop cell, once one has been placed.
    pub fn shop(&self) -> Option<GridPosition> {
        self.shop
    }

    pub fn contains(&self, position: GridPosition) -> bool {
        position.row < self.size && position.col < self.size
    }

    /// Panics when `position` is outside the grid.
    pub fn cell(&self, position: GridPosition) -> &MapCell {
        &self.cells[position.row * self.size + position.col]
    }

    pub fn cell_mut(&mut self, position: GridPosition) -> &mut MapCell {
        &mut self.cells[position.row * self.size + position.col]
    }

    pub fn get(&self, position: GridPosition) -> Option<&MapCell> {
        self.contains(position).then(|| self.cell(position))
    }

    pub fn cells(&self) -> impl Iterator<Item = &MapCell> {
        self.cells.iter()
    }

    /// Cells holding a room.
    pub fn rooms(&self) -> impl Iterator<Item = &MapCell> {
        self.cells.iter().filter(|cell| !cell.is_blank())
    }

    /// Doors implied by which neighbours are occupied, ordered
    /// (up, right, down, left).
    pub fn connections(&self, position: GridPosition) -> DoorMask {
        let mut mask = DoorMask::default();
        for (direction, neighbor) in position.neighbors(self.size) {
            mask.set(direction, self.cell(neighbor).is_occupied());
        }
        mask
    }

    fn occupied_neighbors(&self, position: GridPosition) -> usize {
        position
            .neighbors(self.size)
            .into_iter()
            .filter(|(_, neighbor)| self.cell(*neighbor).is_occupied())
            .count()
    }

    /// Whether a blank neighbour can receive growth: it must have no growth of
    /// its own and touch at most one occupied cell.
    pub fn is_eligible(&self, position: GridPosition) -> bool {
        let cell = self.cell(position);
        cell.growth == 0 && cell.is_blank() && self.occupied_neighbors(position) <= 1
    }

    /// Neighbour of `position` through `direction`, if it holds a room.
    pub fn room_beyond(&self, position: GridPosition, direction: Direction) -> Option<&MapCell> {
        position
            .step(direction, self.size)
            .map(|neighbor| self.cell(neighbor))
            .filter(|cell| !cell.is_blank())
    }

    /// Cells reachable from the root by walking through doors.
    pub fn reachable_from_root(&self) -> HashSet<GridPosition> {
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([self.root()]);
        while let Some(position) = queue.pop_front() {
            if !seen.insert(position) {
                continue;
            }
            let doors = self.cell(position).doors;
            for (direction, neighbor) in position.neighbors(self.size) {
                if doors.has(direction) && !self.cell(neighbor).is_blank() {
                    queue.push_back(neighbor);
                }
            }
        }
        seen
    }
}

/// Grows the dungeon map from the root cell.
pub struct GrowthMapGenerator<'a> {
    catalog: &'a Catalog,
}

impl<'a> GrowthMapGenerator<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Hands the growth of `position` to its eligible neighbours. Returns the
    /// amount handed out; with no eligible neighbour the surplus is dropped.
    pub fn distribute_growth<R: Rng>(&self, grid: &mut MapGrid, position: GridPosition, rng: &mut R) -> u32 {
        let growth = grid.cell(position).growth;
        let surplus = growth.saturating_sub(1);
        let eligible: Vec<GridPosition> = position
            .neighbors(grid.size())
            .into_iter()
            .map(|(_, neighbor)| neighbor)
            .filter(|neighbor| grid.is_eligible(*neighbor))
            .collect();

        match eligible.as_slice() {
            [] => {
                trace!("No room to grow at {:?}; dropping {} growth", position, surplus);
                0
            }
            [only] => {
                grid.cell_mut(*only).growth = surplus;
                surplus
            }
            _ => {
                for _ in 0..surplus {
                    let target = eligible[rng.gen_range(0..eligible.len())];
                    grid.cell_mut(target).growth += 1;
                }
                surplus
            }
        }
    }

    /// Turns a growing cell into a room that matches its neighbourhood.
    fn assign_archetype<R: Rng>(&self, grid: &mut MapGrid, position: GridPosition, rng: &mut R) -> ReverieResult<()> {
        let doors = grid.connections(position);
        let candidates = self.catalog.archetypes_matching(doors, RoomKind::Basic);
        let chosen = candidates.choose(rng).ok_or_else(|| {
            ReverieError::Configuration(format!("no basic room archetype with doors {:?}", <[u8; 4]>::from(doors)))
        })?;

        let cell = grid.cell_mut(position);
        cell.archetype = Some(chosen.name.clone());
        cell.doors = doors;
        cell.growth = 0;
        Ok(())
    }

    fn grow<R: Rng>(&self, grid: &mut MapGrid, rng: &mut R) -> ReverieResult<usize> {
        let size = grid.size();
        let mut passes = 0;
        loop {
            passes += 1;
            let mut growing = false;
            for row in 0..size {
                for col in 0..size {
                    let position = GridPosition::new(row, col);
                    if grid.cell(position).growth > 1 {
                        self.distribute_growth(grid, position, rng);
                    }
                    if grid.cell(position).growth > 0 {
                        self.assign_archetype(grid, position, rng)?;
                        growing = true;
                    }
                }
            }
            if !growing {
                return Ok(passes);
            }
        }
    }

    /// Replaces a random dead end (never the start room) with a shop of the
    /// same door mask.
    pub fn assign_special_rooms<R: Rng>(&self, grid: &mut MapGrid, rng: &mut R) -> ReverieResult<GridPosition> {
        let root = grid.root();
        let dead_ends: Vec<GridPosition> = grid
            .rooms()
            .filter(|cell| cell.position != root && cell.doors.is_dead_end())
            .map(|cell| cell.position)
            .collect();

        let position = *dead_ends
            .choose(rng)
            .ok_or_else(|| ReverieError::GenerationFailed("map has no dead end to place a shop in".to_string()))?;
        let doors = grid.cell(position).doors;
        let shop = self
            .catalog
            .archetypes_matching(doors, RoomKind::Shop)
            .choose(rng)
            .map(|archetype| archetype.name.clone())
            .ok_or_else(|| {
                ReverieError::Configuration(format!("no shop archetype with doors {:?}", <[u8; 4]>::from(doors)))
            })?;

        debug!("Shop '{}' placed at {:?}", shop, position);
        grid.cell_mut(position).archetype = Some(shop);
        grid.shop = Some(position);
        Ok(position)
    }
}

impl Generator<MapGrid> for GrowthMapGenerator<'_> {
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> ReverieResult<MapGrid> {
        config.validate()?;
        let mut grid = MapGrid::new(config.grid_size, config.initial_growth);
        let passes = self.grow(&mut grid, rng)?;
        self.assign_special_rooms(&mut grid, rng)?;
        self.validate(&grid, config)?;

        info!(
            "Generated dungeon map: {} rooms in {} passes (seed {})",
            grid.rooms().count(),
            passes,
            config.seed
        );
        Ok(grid)
    }

    fn validate(&self, grid: &MapGrid, _config: &GenerationConfig) -> ReverieResult<()> {
        if grid.cell(grid.root()).is_blank() {
            return Err(ReverieError::GenerationFailed("root cell is blank".to_string()));
        }

        let mut shops = 0;
        for cell in grid.rooms() {
            let name = cell.archetype.as_deref().unwrap_or_default();
            let archetype = self.catalog.archetype(name)?;
            if archetype.doors != cell.doors {
                return Err(ReverieError::GenerationFailed(format!(
                    "archetype '{}' at {:?} does not match its doors",
                    name, cell.position
                )));
            }
            if archetype.kind == RoomKind::Shop {
                shops += 1;
            }
            for direction in Direction::all() {
                let neighbor_has_room = grid.room_beyond(cell.position, direction).is_some();
                if cell.doors.has(direction) != neighbor_has_room {
                    return Err(ReverieError::GenerationFailed(format!(
                        "door {:?} of {:?} leads nowhere",
                        direction, cell.position
                    )));
                }
            }
        }

        if shops != 1 {
            return Err(ReverieError::GenerationFailed(format!("expected one shop, found {}", shops)));
        }
        Ok(())
    }

    fn generator_type(&self) -> &'static str {
        "GrowthMapGenerator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn catalog() -> Catalog {
        Catalog::builtin()
    }

    #[test]
    fn test_root_position() {
        assert_eq!(MapGrid::new(40, 1).root(), GridPosition::new(19, 19));
        assert_eq!(MapGrid::new(5, 1).root(), GridPosition::new(2, 2));
    }

    #[test]
    fn test_single_eligible_neighbor_takes_all() {
        let catalog = catalog();
        let generator = GrowthMapGenerator::new(&catalog);
        let mut rng = StdRng::seed_from_u64(0);
        // Root in a corner-ish spot: block three neighbours by occupying them.
        let mut grid = MapGrid::new(9, 6);
        let root = grid.root();
        for direction in [Direction::Up, Direction::Right, Direction::Down] {
            let neighbor = root.step(direction, 9).unwrap();
            grid.cell_mut(neighbor).archetype = Some("end_up".to_string());
        }

        assert_eq!(generator.distribute_growth(&mut grid, root, &mut rng), 5);
        let left = root.step(Direction::Left, 9).unwrap();
        assert_eq!(grid.cell(left).growth, 5);
    }

    #[test]
    fn test_no_eligible_neighbor_drops_growth() {
        let catalog = catalog();
        let generator = GrowthMapGenerator::new(&catalog);
        let mut rng = StdRng::seed_from_u64(0);
        let mut grid = MapGrid::new(9, 6);
        let root = grid.root();
        for (_, neighbor) in root.neighbors(9) {
            grid.cell_mut(neighbor).growth = 1;
        }

        assert_eq!(generator.distribute_growth(&mut grid, root, &mut rng), 0);
        let total: u32 = grid.cells().map(|cell| cell.growth).sum();
        assert_eq!(total, 6 + 4);
    }

    #[test]
    fn test_distribution_conserves_surplus() {
        let catalog = catalog();
        let generator = GrowthMapGenerator::new(&catalog);
        let mut rng = StdRng::seed_from_u64(5);
        let mut grid = MapGrid::new(9, 15);
        let root = grid.root();

        assert_eq!(generator.distribute_growth(&mut grid, root, &mut rng), 14);
        let handed_out: u32 = root.neighbors(9).iter().map(|(_, n)| grid.cell(*n).growth).sum();
        assert_eq!(handed_out, 14);
    }

    #[test]
    fn test_neighbor_touching_two_rooms_is_ineligible() {
        let mut grid = MapGrid::new(9, 0);
        let a = GridPosition::new(4, 3);
        let b = GridPosition::new(4, 5);
        grid.cell_mut(a).archetype = Some("end_right".to_string());
        grid.cell_mut(b).archetype = Some("end_left".to_string());
        // (4, 4) is the root, so make it blank for this check.
        grid.cell_mut(GridPosition::new(4, 4)).archetype = None;
        assert!(!grid.is_eligible(GridPosition::new(4, 4)));
        assert!(grid.is_eligible(GridPosition::new(2, 2)));
    }

    #[test]
    fn test_generate_produces_consistent_map() {
        let catalog = catalog();
        let generator = GrowthMapGenerator::new(&catalog);
        for seed in 0..20 {
            let config = GenerationConfig::new(seed);
            let mut rng = crate::generation::utils::create_rng(&config);
            let grid = generator.generate(&config, &mut rng).unwrap();

            let rooms = grid.rooms().count();
            assert!(rooms >= 2);
            assert!(rooms <= config.initial_growth as usize + 1);
            assert_eq!(grid.reachable_from_root().len(), rooms);
            assert!(grid.cells().all(|cell| cell.growth == 0));
            let shop = grid.shop().unwrap();
            assert_ne!(shop, grid.root());
        }
    }

    #[test]
    fn test_generation_is_deterministic() {
        let catalog = catalog();
        let generator = GrowthMapGenerator::new(&catalog);
        let config = GenerationConfig::new(1234);
        let a = generator
            .generate(&config, &mut crate::generation::utils::create_rng(&config))
            .unwrap();
        let b = generator
            .generate(&config, &mut crate::generation::utils::create_rng(&config))
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_missing_archetype_is_configuration_error() {
        let mut catalog = catalog();
        catalog.rooms.retain(|archetype| archetype.doors.open_count() != 1 || archetype.kind == RoomKind::Shop);
        let generator = GrowthMapGenerator::new(&catalog);
        let config = GenerationConfig::new(3);
        let result = generator.generate(&config, &mut crate::generation::utils::create_rng(&config));
        assert!(matches!(result, Err(ReverieError::Configuration(_))));
    }
}
