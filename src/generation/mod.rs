//! # Generation Module
//!
//! Procedural content generation for dungeon floors, monsters and items.
//!
//! Floors are carved out of solid rock one room at a time; every accepted room
//! is handed to a list of [`Populator`]s that stock it with content.

pub mod dungeon;
pub mod encounters;
pub mod items;

pub use dungeon::*;
pub use encounters::*;
pub use items::*;

use crate::config;
use crate::game::{EntityArena, Position};
use crate::{YargError, YargResult};
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for floor generation.
///
/// Controls map dimensions, room sizes and content density.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Random seed for reproducible generation
    pub seed: u64,
    pub map_width: i32,
    pub map_height: i32,
    /// Smallest room side, walls included
    pub room_min_size: i32,
    /// Largest room side, walls included
    pub room_max_size: i32,
    /// Room placement attempts per floor
    pub max_rooms: u32,
    pub max_monsters_per_room: u32,
    pub max_items_per_room: u32,
}

impl GenerationConfig {
    /// Creates the standard configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use yarg::GenerationConfig;
    ///
    /// let config = GenerationConfig::new(12345);
    /// assert_eq!(config.map_width, 80);
    /// assert!(config.room_max_size >= config.room_min_size);
    /// assert!(config.validate().is_ok());
    /// ```
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            map_width: config::DEFAULT_MAP_WIDTH,
            map_height: config::DEFAULT_MAP_HEIGHT,
            room_min_size: config::ROOM_MIN_SIZE,
            room_max_size: config::ROOM_MAX_SIZE,
            max_rooms: config::MAX_ROOMS,
            max_monsters_per_room: config::MAX_MONSTERS_PER_ROOM,
            max_items_per_room: config::MAX_ITEMS_PER_ROOM,
        }
    }

    /// Creates a configuration for testing with smaller, emptier floors.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            seed,
            map_width: 40,
            map_height: 30,
            room_min_size: 5,
            room_max_size: 8,
            max_rooms: 12,
            max_monsters_per_room: 1,
            max_items_per_room: 1,
        }
    }

    /// Reads a configuration from a JSON file.
    pub fn from_json_file(path: &Path) -> YargResult<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: GenerationConfig = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every room size fits on the map and has an interior.
    pub fn validate(&self) -> YargResult<()> {
        if self.room_min_size < 3 {
            return Err(YargError::InvalidConfig(format!(
                "room_min_size must be at least 3, got {}",
                self.room_min_size
            )));
        }
        if self.room_min_size > self.room_max_size {
            return Err(YargError::InvalidConfig(format!(
                "room_min_size {} exceeds room_max_size {}",
                self.room_min_size, self.room_max_size
            )));
        }
        if self.room_max_size >= self.map_width || self.room_max_size >= self.map_height {
            return Err(YargError::InvalidConfig(format!(
                "rooms up to {} tiles do not fit a {}x{} map",
                self.room_max_size, self.map_width, self.map_height
            )));
        }
        if self.max_rooms == 0 {
            return Err(YargError::InvalidConfig(
                "max_rooms must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new(42)
    }
}

/// Axis-aligned room bounds, walls included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self {
            x1: x,
            y1: y,
            x2: x + w,
            y2: y + h,
        }
    }

    pub fn center(&self) -> Position {
        Position::new((self.x1 + self.x2) / 2, (self.y1 + self.y2) / 2)
    }

    /// Inclusive overlap test; rooms that share an edge intersect.
    ///
    /// # Examples
    ///
    /// ```
    /// use yarg::Rect;
    ///
    /// let a = Rect::new(0, 0, 5, 5);
    /// assert!(a.intersects(&Rect::new(5, 0, 5, 5)));
    /// assert!(!a.intersects(&Rect::new(6, 0, 5, 5)));
    /// ```
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x1 <= other.x2 && self.x2 >= other.x1 && self.y1 <= other.y2 && self.y2 >= other.y1
    }

    /// Cells strictly inside the walls.
    pub fn interior_positions(&self) -> Vec<Position> {
        ((self.y1 + 1)..self.y2)
            .flat_map(|y| ((self.x1 + 1)..self.x2).map(move |x| Position::new(x, y)))
            .collect()
    }

    pub fn contains_interior(&self, pos: Position) -> bool {
        pos.x > self.x1 && pos.x < self.x2 && pos.y > self.y1 && pos.y < self.y2
    }
}

/// Stocks a freshly carved room with content.
pub trait Populator {
    /// Places content in `room`, returning how many entities were spawned.
    fn populate(
        &self,
        room: &Rect,
        entities: &mut EntityArena,
        config: &GenerationConfig,
        rng: &mut StdRng,
    ) -> usize;

    /// Gets the populator name for logging and debugging.
    fn populator_type(&self) -> &'static str;
}

/// Utility functions for generation algorithms.
pub mod utils {
    use super::*;
    use crate::game::TileGrid;
    use rand::SeedableRng;
    use std::collections::{HashSet, VecDeque};

    /// Creates a seeded random number generator from the config.
    pub fn create_rng(config: &GenerationConfig) -> StdRng {
        StdRng::seed_from_u64(config.seed)
    }

    /// A uniformly random interior cell of `room`.
    pub fn random_interior_position(room: &Rect, rng: &mut StdRng) -> Position {
        Position::new(
            rng.gen_range((room.x1 + 1)..room.x2),
            rng.gen_range((room.y1 + 1)..room.y2),
        )
    }

    /// Every walkable cell reachable from `start` by king moves.
    pub fn reachable_from(grid: &TileGrid, start: Position) -> HashSet<Position> {
        let mut visited = HashSet::new();
        if grid.is_blocked(start) {
            return visited;
        }

        let mut queue = VecDeque::from([start]);
        visited.insert(start);
        while let Some(pos) = queue.pop_front() {
            for next in pos.adjacent_positions() {
                if !grid.is_blocked(next) && visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        visited
    }

    /// Fails unless every room center is reachable from the first room.
    pub fn validate_connectivity(grid: &TileGrid, rooms: &[Rect]) -> YargResult<()> {
        let Some(first) = rooms.first() else {
            return Err(YargError::GenerationFailed("Floor has no rooms".to_string()));
        };

        let reachable = reachable_from(grid, first.center());
        match rooms.iter().find(|room| !reachable.contains(&room.center())) {
            Some(room) => Err(YargError::GenerationFailed(format!(
                "Room at {:?} is not connected",
                room.center()
            ))),
            None => Ok(()),
        }
    }
}
