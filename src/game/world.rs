//! # Tile Grid
//!
//! Per-cell walkability and sight flags for a single dungeon floor.

use crate::game::Position;
use serde::{Deserialize, Serialize};

/// A single map cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    /// Whether movement through this cell is impossible
    pub blocked: bool,
    /// Whether this cell stops line of sight
    pub block_sight: bool,
    /// Whether the player has ever seen this cell
    pub explored: bool,
}

impl Tile {
    /// Solid rock. Every cell starts out like this.
    pub fn wall() -> Self {
        Self {
            blocked: true,
            block_sight: true,
            explored: false,
        }
    }

    pub fn floor() -> Self {
        Self {
            blocked: false,
            block_sight: false,
            explored: false,
        }
    }
}

/// The walkable layout of one floor, indexed as `tiles[y][x]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileGrid {
    pub width: i32,
    pub height: i32,
    pub tiles: Vec<Vec<Tile>>,
}

impl TileGrid {
    /// Creates a grid of solid walls.
    ///
    /// # Examples
    ///
    /// ```
    /// use yarg::{Position, TileGrid};
    ///
    /// let grid = TileGrid::new(10, 8);
    /// assert!(grid.is_blocked(Position::new(3, 3)));
    /// assert!(grid.is_blocked(Position::new(-1, 3)));
    /// ```
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            tiles: vec![vec![Tile::wall(); width.max(0) as usize]; height.max(0) as usize],
        }
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    pub fn get_tile(&self, pos: Position) -> Option<&Tile> {
        if !self.in_bounds(pos) {
            return None;
        }
        self.tiles
            .get(pos.y as usize)
            .and_then(|row| row.get(pos.x as usize))
    }

    pub fn get_tile_mut(&mut self, pos: Position) -> Option<&mut Tile> {
        if !self.in_bounds(pos) {
            return None;
        }
        self.tiles
            .get_mut(pos.y as usize)
            .and_then(|row| row.get_mut(pos.x as usize))
    }

    /// Whether movement into `pos` is impossible. Cells off the map count as blocked.
    pub fn is_blocked(&self, pos: Position) -> bool {
        self.get_tile(pos).map(|tile| tile.blocked).unwrap_or(true)
    }

    /// Makes a cell walkable and transparent. Cells off the map are ignored.
    pub fn carve(&mut self, pos: Position) {
        if let Some(tile) = self.get_tile_mut(pos) {
            tile.blocked = false;
            tile.block_sight = false;
        }
    }

    /// Carves a horizontal corridor on row `y`, both ends included.
    pub fn carve_h_tunnel(&mut self, x1: i32, x2: i32, y: i32) {
        for x in x1.min(x2)..=x1.max(x2) {
            self.carve(Position::new(x, y));
        }
    }

    /// Carves a vertical corridor on column `x`, both ends included.
    pub fn carve_v_tunnel(&mut self, y1: i32, y2: i32, x: i32) {
        for y in y1.min(y2)..=y1.max(y2) {
            self.carve(Position::new(x, y));
        }
    }

    /// Iterates over every walkable cell.
    pub fn walkable_positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.tiles.iter().enumerate().flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, tile)| !tile.blocked)
                .map(move |(x, _)| Position::new(x as i32, y as i32))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_grid_is_solid() {
        let grid = TileGrid::new(5, 4);
        assert_eq!(grid.tiles.len(), 4);
        assert_eq!(grid.tiles[0].len(), 5);
        assert_eq!(grid.walkable_positions().count(), 0);
        assert!(grid
            .tiles
            .iter()
            .flatten()
            .all(|tile| tile.blocked && tile.block_sight && !tile.explored));
    }

    #[test]
    fn test_out_of_bounds_is_blocked() {
        let grid = TileGrid::new(5, 4);
        assert!(grid.get_tile(Position::new(5, 0)).is_none());
        assert!(grid.get_tile(Position::new(0, -1)).is_none());
        assert!(grid.is_blocked(Position::new(10, 10)));
    }

    #[test]
    fn test_tunnels_are_inclusive() {
        let mut grid = TileGrid::new(10, 10);
        grid.carve_h_tunnel(6, 2, 3);
        grid.carve_v_tunnel(1, 4, 8);

        for x in 2..=6 {
            assert!(!grid.is_blocked(Position::new(x, 3)));
        }
        for y in 1..=4 {
            assert!(!grid.is_blocked(Position::new(8, y)));
        }
        assert!(grid.is_blocked(Position::new(1, 3)));
        assert!(grid.is_blocked(Position::new(7, 3)));
        assert_eq!(grid.walkable_positions().count(), 9);
    }

    #[test]
    fn test_carving_off_map_is_ignored() {
        let mut grid = TileGrid::new(3, 3);
        grid.carve(Position::new(-1, 0));
        grid.carve_h_tunnel(1, 5, 1);
        assert_eq!(grid.walkable_positions().count(), 2);
    }
}
