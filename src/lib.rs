//! # YARG Simulation Core
//!
//! Yet Another Roguelike Game: the turn-based simulation core of a classic
//! dungeon crawler.
//!
//! ## Architecture Overview
//!
//! The core is organized around a few key concepts:
//!
//! - **Tile Grid**: per-cell walkability and sight flags for one floor
//! - **Dungeon Generation**: rooms carved out of solid rock, joined by L-shaped tunnels
//! - **Entity Arena**: actors and objects with optional capabilities and stable handles
//! - **Action Resolver**: turns a decoded intent into mutations and outcome events
//! - **Event Reducer**: applies outcome events uniformly for player and monster turns
//! - **Turn State Machine**: whose turn it is and which modal screen is open
//!
//! Rendering, input decoding and real field-of-view computation live outside
//! the core. The core consumes an [`Intent`] or [`PointerAction`] per tick plus a
//! [`VisibilityMap`], and exposes the tile grid, the floor entities and an
//! append-only message log for presentation.

pub mod game;
pub mod generation;
pub mod input;

pub use game::*;
pub use generation::*;
pub use input::*;

use std::path::PathBuf;

/// Core error type for the YARG simulation core.
///
/// Gameplay failures (nothing to pick up, unusable item, no stairs) are never
/// errors; they are reported through the message log.
#[derive(thiserror::Error, Debug)]
pub enum YargError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Game state is invalid
    #[error("Invalid game state: {0}")]
    InvalidState(String),

    /// Generation parameters cannot produce a floor
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// An entity handle no longer refers to a live entity
    #[error("Entity {0} does not exist")]
    MissingEntity(EntityId),

    /// No saved game at the requested location
    #[error("No save data found at {}", .0.display())]
    SaveNotFound(PathBuf),

    /// Generation failed
    #[error("Generation failed: {0}")]
    GenerationFailed(String),
}

/// Result type used throughout the YARG codebase.
pub type YargResult<T> = Result<T, YargError>;

/// Version information for the game.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Game configuration constants.
pub mod config {
    /// Default dungeon width in tiles
    pub const DEFAULT_MAP_WIDTH: i32 = 80;

    /// Default dungeon height in tiles
    pub const DEFAULT_MAP_HEIGHT: i32 = 43;

    /// Smallest room side, walls included
    pub const ROOM_MIN_SIZE: i32 = 6;

    /// Largest room side, walls included
    pub const ROOM_MAX_SIZE: i32 = 10;

    /// Room placement attempts per floor
    pub const MAX_ROOMS: u32 = 30;

    pub const MAX_MONSTERS_PER_ROOM: u32 = 3;

    pub const MAX_ITEMS_PER_ROOM: u32 = 2;

    pub const PLAYER_HP: i32 = 30;
    pub const PLAYER_DEFENSE: i32 = 2;
    pub const PLAYER_POWER: i32 = 5;

    /// Inventory slots; one per menu letter
    pub const INVENTORY_CAPACITY: usize = 26;

    /// Default sight radius used by the radius-based visibility map
    pub const FOV_RADIUS: i32 = 10;

    /// Paths longer than this fall back to stepping straight at the target
    pub const MAX_PATH_LENGTH: usize = 25;

    /// Recent messages shown in the end-of-game report
    pub const MESSAGE_WINDOW: usize = 5;
}
