//! # Visibility
//!
//! Field-of-view computation is a collaborator of the core: the core only
//! asks whether a cell is currently visible. [`RadiusFov`] is a simple stand-in
//! that treats everything within a circle as visible.

use crate::game::{Position, TileGrid};
use std::collections::HashSet;

/// Answers "can the player currently see this cell?".
pub trait VisibilityMap {
    fn is_visible(&self, pos: Position) -> bool;
}

/// Circular field of view without line-of-sight checks.
#[derive(Debug, Clone, Default)]
pub struct RadiusFov {
    pub radius: i32,
    visible: HashSet<Position>,
}

impl RadiusFov {
    /// Creates a field of view that sees nothing until the first recompute.
    pub fn new(radius: i32) -> Self {
        Self {
            radius,
            visible: HashSet::new(),
        }
    }

    /// Recomputes visibility around `origin` and marks visible tiles explored.
    ///
    /// Only the `explored` flags of the grid change.
    pub fn recompute(&mut self, grid: &mut TileGrid, origin: Position) {
        self.visible.clear();

        for dy in -self.radius..=self.radius {
            for dx in -self.radius..=self.radius {
                let pos = Position::new(origin.x + dx, origin.y + dy);
                if origin.euclidean_distance(pos) > self.radius as f64 {
                    continue;
                }
                if let Some(tile) = grid.get_tile_mut(pos) {
                    tile.explored = true;
                    self.visible.insert(pos);
                }
            }
        }
    }

    pub fn visible_count(&self) -> usize {
        self.visible.len()
    }
}

impl VisibilityMap for RadiusFov {
    fn is_visible(&self, pos: Position) -> bool {
        self.visible.contains(&pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nothing_visible_before_recompute() {
        let fov = RadiusFov::new(5);
        assert!(!fov.is_visible(Position::new(0, 0)));
    }

    #[test]
    fn test_recompute_marks_explored() {
        let mut grid = TileGrid::new(20, 20);
        let mut fov = RadiusFov::new(3);
        fov.recompute(&mut grid, Position::new(10, 10));

        assert!(fov.is_visible(Position::new(10, 13)));
        assert!(!fov.is_visible(Position::new(13, 13)));
        assert!(grid.get_tile(Position::new(12, 10)).unwrap().explored);
        assert!(!grid.get_tile(Position::new(0, 0)).unwrap().explored);
    }

    #[test]
    fn test_recompute_clips_to_grid() {
        let mut grid = TileGrid::new(4, 4);
        let mut fov = RadiusFov::new(10);
        fov.recompute(&mut grid, Position::new(0, 0));
        assert_eq!(fov.visible_count(), 16);
        assert!(!fov.is_visible(Position::new(-1, 0)));
    }

    #[test]
    fn test_recompute_leaves_blocked_flags_alone() {
        let mut grid = TileGrid::new(10, 10);
        grid.carve_h_tunnel(1, 8, 5);
        let blocked_before: Vec<bool> = grid.tiles.iter().flatten().map(|t| t.blocked).collect();

        let mut fov = RadiusFov::new(4);
        fov.recompute(&mut grid, Position::new(5, 5));
        fov.recompute(&mut grid, Position::new(5, 5));

        let blocked_after: Vec<bool> = grid.tiles.iter().flatten().map(|t| t.blocked).collect();
        assert_eq!(blocked_before, blocked_after);
    }
}
