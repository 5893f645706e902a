//! # Input Module
//!
//! Decoded player intents. Turning key presses and mouse clicks into these
//! values is the job of the front end; the core only consumes them.

use crate::game::{Direction, Fighter, Position};
use serde::{Deserialize, Serialize};

/// What the player asked for this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    /// Step (or attack) by the given offset
    Move { dx: i32, dy: i32 },
    /// Pass the turn
    Wait,
    /// Pick up an item at the player's feet
    Pickup,
    /// Open the inventory to use an item
    ShowInventory,
    /// Open the inventory to drop an item
    DropInventory,
    /// Choose an inventory slot in an open inventory menu
    InventoryIndex(usize),
    /// Choose a stat on the level-up screen
    LevelUp(LevelUpChoice),
    ShowCharacterScreen,
    TakeStairsDown,
    /// Leave the current menu, or the game
    Exit,
    FullscreenToggle,
}

impl Intent {
    /// A one-step move in `direction`.
    ///
    /// # Examples
    ///
    /// ```
    /// use yarg::{Direction, Intent};
    ///
    /// assert_eq!(Intent::move_in(Direction::Northwest), Intent::Move { dx: -1, dy: -1 });
    /// ```
    pub fn move_in(direction: Direction) -> Self {
        let delta = direction.to_delta();
        Intent::Move {
            dx: delta.x,
            dy: delta.y,
        }
    }
}

/// Mouse actions, used while selecting a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerAction {
    /// Confirm the cell under the pointer
    LeftClick(Position),
    /// Cancel
    RightClick,
}

/// Stat bonus picked on level-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelUpChoice {
    /// +20 max HP, healing the same amount
    Constitution,
    /// +1 attack power
    Strength,
    /// +1 defense
    Agility,
}

impl LevelUpChoice {
    pub fn all() -> [LevelUpChoice; 3] {
        [
            LevelUpChoice::Constitution,
            LevelUpChoice::Strength,
            LevelUpChoice::Agility,
        ]
    }

    /// Maps a menu slot (a, b, c) to a choice.
    pub fn from_index(index: usize) -> Option<LevelUpChoice> {
        Self::all().get(index).copied()
    }

    /// Menu label showing the stat's current value.
    pub fn describe(self, fighter: &Fighter) -> String {
        match self {
            LevelUpChoice::Constitution => {
                format!("Constitution (+20 HP, from {})", fighter.max_hp)
            }
            LevelUpChoice::Strength => format!("Strength (+1 attack, from {})", fighter.power),
            LevelUpChoice::Agility => format!("Agility (+1 defense, from {})", fighter.defense),
        }
    }
}
