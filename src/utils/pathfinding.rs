//! # Pathfinding
//!
//! Sub-tile walkability grids and A* routing for enemies that bump into walls
//! while chasing the player.
//!
//! Every background tile is split into a 2×2 block of cells whose passability
//! comes from the tile's pattern in the [`Catalog`]. Routes are searched over
//! that grid with diagonal steps allowed only when at most one of the two
//! orthogonal cells beside the diagonal is blocked, so enemies never slip
//! through the corner where two walls meet.

use crate::config::{TILE_HEIGHT, TILE_WIDTH};
use crate::game::{Catalog, TileRecord, Waypoint};
use crate::{ReverieResult, Vector2};
use pathfinding::prelude::astar;

/// Cost of an orthogonal step.
const STRAIGHT_COST: u32 = 10;
/// Cost of a diagonal step (10·√2 rounded).
const DIAGONAL_COST: u32 = 14;

/// A cell of the walkability grid, addressed by column (`x`) and row (`y`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridNode {
    pub x: usize,
    pub y: usize,
}

impl GridNode {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Center of this cell in room pixel space.
    pub fn to_world(self) -> Vector2 {
        let (cell_w, cell_h) = cell_size();
        Vector2::new(
            self.x as f32 * cell_w + cell_w / 2.0,
            self.y as f32 * cell_h + cell_h / 2.0,
        )
    }
}

/// Width and height of one walkability cell in pixels (half a tile).
pub fn cell_size() -> (f32, f32) {
    (TILE_WIDTH / 2.0, TILE_HEIGHT / 2.0)
}

/// Passability of every sub-tile cell in a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkabilityGrid {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl WalkabilityGrid {
    /// Creates a grid where every cell is walkable.
    pub fn open(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![true; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Checks whether a cell exists and can be walked on.
    pub fn is_walkable(&self, x: isize, y: isize) -> bool {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return false;
        }
        self.cells[y as usize * self.width + x as usize]
    }

    pub fn set_walkable(&mut self, node: GridNode, walkable: bool) {
        if node.x < self.width && node.y < self.height {
            self.cells[node.y * self.width + node.x] = walkable;
        }
    }

    /// Maps a pixel position onto the cell containing it.
    pub fn node_at(&self, position: Vector2) -> Option<GridNode> {
        let (cell_w, cell_h) = cell_size();
        if position.x < 0.0 || position.y < 0.0 {
            return None;
        }
        let node = GridNode::new(
            (position.x / cell_w).floor() as usize,
            (position.y / cell_h).floor() as usize,
        );
        (node.x < self.width && node.y < self.height).then_some(node)
    }

    fn successors(&self, node: &GridNode) -> Vec<(GridNode, u32)> {
        let x = node.x as isize;
        let y = node.y as isize;
        let mut next = Vec::with_capacity(8);

        for (dx, dy) in [(0, -1), (1, 0), (0, 1), (-1, 0)] {
            if self.is_walkable(x + dx, y + dy) {
                next.push((GridNode::new((x + dx) as usize, (y + dy) as usize), STRAIGHT_COST));
            }
        }

        for (dx, dy) in [(1, -1), (1, 1), (-1, 1), (-1, -1)] {
            if !self.is_walkable(x + dx, y + dy) {
                continue;
            }
            let blocked_sides = [self.is_walkable(x + dx, y), self.is_walkable(x, y + dy)]
                .iter()
                .filter(|walkable| !**walkable)
                .count();
            if blocked_sides <= 1 {
                next.push((GridNode::new((x + dx) as usize, (y + dy) as usize), DIAGONAL_COST));
            }
        }

        next
    }
}

/// Builds the walkability grid of a room from its background tiles.
///
/// Fails with a configuration error when a tile has no passability pattern
/// registered in the catalog.
pub fn build_grid(tiles: &[Vec<TileRecord>], catalog: &Catalog) -> ReverieResult<WalkabilityGrid> {
    let height = tiles.len() * 2;
    let width = tiles.first().map(|row| row.len() * 2).unwrap_or(0);
    let mut grid = WalkabilityGrid::open(width, height);

    for (row, tile_row) in tiles.iter().enumerate() {
        for (col, tile) in tile_row.iter().enumerate() {
            let pattern = catalog.tile(&tile.index)?.passability;
            for (dy, quadrant_row) in pattern.iter().enumerate() {
                for (dx, walkable) in quadrant_row.iter().enumerate() {
                    grid.set_walkable(GridNode::new(col * 2 + dx, row * 2 + dy), *walkable);
                }
            }
        }
    }

    Ok(grid)
}

/// Finds the shortest route between two pixel positions.
///
/// The result starts at the start cell and ends at the goal cell. It is empty
/// when either endpoint is off the grid or blocked, or when no route exists;
/// callers treat that as "stay put".
pub fn find_path(start: Vector2, end: Vector2, grid: &WalkabilityGrid) -> Vec<GridNode> {
    let (Some(start), Some(goal)) = (grid.node_at(start), grid.node_at(end)) else {
        return Vec::new();
    };
    if !grid.is_walkable(start.x as isize, start.y as isize)
        || !grid.is_walkable(goal.x as isize, goal.y as isize)
    {
        return Vec::new();
    }

    astar(
        &start,
        |node| grid.successors(node),
        |node| octile_distance(*node, goal),
        |node| *node == goal,
    )
    .map(|(path, _cost)| path)
    .unwrap_or_default()
}

fn octile_distance(a: GridNode, b: GridNode) -> u32 {
    let dx = a.x.abs_diff(b.x) as u32;
    let dy = a.y.abs_diff(b.y) as u32;
    STRAIGHT_COST * dx.max(dy) + (DIAGONAL_COST - STRAIGHT_COST) * dx.min(dy)
}

/// Expands a grid route into per-tick waypoints for an entity moving at `speed`.
///
/// Every edge of the route is split into `cell_size / 2` steps of `speed`
/// pixels, clamped so a step never overshoots the next node; the final node is
/// always the last waypoint. Routes shorter than two nodes need no movement and
/// expand to nothing.
pub fn to_waypoints(path: &[GridNode], speed: f32) -> Vec<Waypoint> {
    if path.len() < 2 {
        return Vec::new();
    }

    let (cell_w, _) = cell_size();
    let steps_per_edge = (cell_w / 2.0) as usize;
    let mut waypoints = Vec::with_capacity((path.len() - 1) * steps_per_edge + 1);

    for edge in path.windows(2) {
        let from = edge[0].to_world();
        let to = edge[1].to_world();
        let length = from.distance_to(to);
        let heading = (to - from).normalize_or_zero();

        for step in 0..steps_per_edge {
            let travelled = (step as f32 * speed).min(length);
            waypoints.push(Waypoint::new(from + heading * travelled, 0));
        }
    }

    if let Some(last) = path.last() {
        waypoints.push(Waypoint::new(last.to_world(), 0));
    }
    waypoints
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_from_rows(rows: &[&str]) -> WalkabilityGrid {
        let mut grid = WalkabilityGrid::open(rows[0].len(), rows.len());
        for (y, row) in rows.iter().enumerate() {
            for (x, cell) in row.chars().enumerate() {
                grid.set_walkable(GridNode::new(x, y), cell == '.');
            }
        }
        grid
    }

    fn world(x: usize, y: usize) -> Vector2 {
        GridNode::new(x, y).to_world()
    }

    #[test]
    fn test_straight_path() {
        let grid = grid_from_rows(&["....", "....", "...."]);
        let path = find_path(world(0, 0), world(3, 0), &grid);
        assert_eq!(path.first(), Some(&GridNode::new(0, 0)));
        assert_eq!(path.last(), Some(&GridNode::new(3, 0)));
        assert_eq!(path.len(), 4);
    }

    #[test]
    fn test_path_avoids_walls() {
        let grid = grid_from_rows(&[".#..", ".#..", "...."]);
        let path = find_path(world(0, 0), world(2, 0), &grid);
        assert!(!path.is_empty());
        for node in &path {
            assert!(grid.is_walkable(node.x as isize, node.y as isize));
        }
        assert_eq!(path.last(), Some(&GridNode::new(2, 0)));
    }

    #[test]
    fn test_no_corner_cutting_between_two_walls() {
        // Moving from (0,1) to (1,0) diagonally would squeeze between two blocked cells.
        let grid = grid_from_rows(&["#.", ".#"]);
        let path = find_path(world(0, 1), world(1, 0), &grid);
        assert!(path.is_empty());
    }

    #[test]
    fn test_diagonal_allowed_past_single_obstacle() {
        let grid = grid_from_rows(&["..", ".#", ".."]);
        let path = find_path(world(0, 0), world(1, 2), &grid);
        // (0,0) -> (0,1) -> (1,2): the diagonal has only one blocked side.
        assert_eq!(path, vec![GridNode::new(0, 0), GridNode::new(0, 1), GridNode::new(1, 2)]);
    }

    #[test]
    fn test_unreachable_target_returns_empty() {
        let grid = grid_from_rows(&["..#..", "..#..", "..#.."]);
        assert!(find_path(world(0, 0), world(4, 2), &grid).is_empty());
        // Blocked goal and off-grid start.
        assert!(find_path(world(0, 0), world(2, 1), &grid).is_empty());
        assert!(find_path(Vector2::new(-5.0, 0.0), world(1, 1), &grid).is_empty());
    }

    #[test]
    fn test_path_is_deterministic() {
        let grid = grid_from_rows(&["......", ".####.", "......", "......"]);
        let first = find_path(world(0, 3), world(5, 0), &grid);
        let second = find_path(world(0, 3), world(5, 0), &grid);
        assert!(!first.is_empty());
        assert_eq!(first, second);
    }

    #[test]
    fn test_waypoints_reach_final_node() {
        let path = vec![GridNode::new(0, 0), GridNode::new(1, 0), GridNode::new(2, 0)];
        let waypoints = to_waypoints(&path, 3.0);
        assert_eq!(waypoints.len(), 2 * 12 + 1);
        let last = waypoints.last().unwrap().position;
        assert_eq!(last, GridNode::new(2, 0).to_world());

        for pair in waypoints.windows(2) {
            assert!(pair[1].position.x >= pair[0].position.x);
            assert_eq!(pair[1].position.y, pair[0].position.y);
        }
    }

    #[test]
    fn test_slow_waypoints_never_overshoot() {
        let path = vec![GridNode::new(0, 0), GridNode::new(1, 1)];
        let waypoints = to_waypoints(&path, 10.0);
        let end = GridNode::new(1, 1).to_world();
        let start = GridNode::new(0, 0).to_world();
        let span = start.distance_to(end);
        for waypoint in &waypoints {
            assert!(start.distance_to(waypoint.position) <= span + 1e-3);
        }
    }

    #[test]
    fn test_single_node_path_has_no_waypoints() {
        assert!(to_waypoints(&[GridNode::new(3, 3)], 2.0).is_empty());
        assert!(to_waypoints(&[], 2.0).is_empty());
    }

    #[test]
    fn test_build_grid_uses_tile_patterns() {
        let catalog = Catalog::builtin();
        let tiles = vec![vec![
            TileRecord::new("floor", 0),
            TileRecord::new("wall", 0),
        ]];
        let grid = build_grid(&tiles, &catalog).unwrap();
        assert_eq!(grid.width(), 4);
        assert_eq!(grid.height(), 2);
        assert!(grid.is_walkable(0, 0));
        assert!(grid.is_walkable(1, 1));
        assert!(!grid.is_walkable(2, 0));
        assert!(!grid.is_walkable(3, 1));
    }

    #[test]
    fn test_build_grid_rejects_unknown_tile() {
        let catalog = Catalog::builtin();
        let tiles = vec![vec![TileRecord::new("lava_of_mystery", 0)]];
        assert!(build_grid(&tiles, &catalog).is_err());
    }
}
