//! # Entities
//!
//! Actors and objects on a floor and the arena that owns them.
//!
//! An [`Entity`] is a fixed-shape record: position, presentation data and one
//! optional slot per capability. Systems check a slot for presence before
//! acting on it, so a potion and a troll are the same type holding different
//! capabilities.

use crate::game::{EffectParams, EntityId, GameEvent, ItemEffect, Message, Position, Severity};
use serde::{Deserialize, Serialize};

/// RGB color carried for renderers. The core never interprets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::new(255, 255, 255);
    pub const DARK_RED: Color = Color::new(191, 0, 0);
    pub const DESATURATED_GREEN: Color = Color::new(63, 127, 63);
    pub const DARKER_GREEN: Color = Color::new(0, 127, 0);
    pub const VIOLET: Color = Color::new(127, 0, 255);
    pub const YELLOW: Color = Color::new(255, 255, 0);
    pub const RED: Color = Color::new(255, 0, 0);
    pub const LIGHT_PINK: Color = Color::new(255, 115, 184);
    pub const LIGHT_GREY: Color = Color::new(159, 159, 159);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Draw order; later variants are drawn on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RenderOrder {
    Stairs,
    Corpse,
    Item,
    Actor,
}

/// Combat capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fighter {
    pub max_hp: i32,
    pub hp: i32,
    pub defense: i32,
    pub power: i32,
    /// Experience granted to whoever kills this fighter
    pub xp: u32,
}

impl Fighter {
    pub fn new(hp: i32, defense: i32, power: i32, xp: u32) -> Self {
        Self {
            max_hp: hp,
            hp,
            defense,
            power,
            xp,
        }
    }

    /// Damage this fighter deals to `defender`. Never negative.
    pub fn damage_against(&self, defender: &Fighter) -> i32 {
        (self.power - defender.defense).max(0)
    }

    /// Restores hit points without exceeding the maximum.
    pub fn heal(&mut self, amount: i32) {
        self.hp = (self.hp + amount).min(self.max_hp);
    }
}

/// Decision-making capability for monsters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ai {
    /// Chases the player while visible and attacks when adjacent
    Basic,
    /// Stumbles around at random, then reverts to `previous`
    Confused { previous: Box<Ai>, turns: u32 },
}

/// Carrying capability. Held items stay in the arena but off the floor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    pub capacity: usize,
    pub items: Vec<EntityId>,
}

impl Inventory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            items: Vec::new(),
        }
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    /// Stores `item` unless the inventory is full.
    ///
    /// A full inventory yields only a warning message and stays unchanged.
    pub fn add_item(&mut self, item: EntityId, item_name: &str) -> Vec<GameEvent> {
        if self.is_full() {
            return vec![GameEvent::Message(Message::new(
                "You cannot carry any more, your inventory is full",
                Severity::Warning,
            ))];
        }

        self.items.push(item);
        vec![
            GameEvent::ItemAdded { item },
            GameEvent::Message(Message::new(
                format!("You pick up the {} and place it in your inventory", item_name),
                Severity::Notice,
            )),
        ]
    }

    /// Removes `item`, returning whether it was held.
    pub fn remove_item(&mut self, item: EntityId) -> bool {
        let before = self.items.len();
        self.items.retain(|&held| held != item);
        self.items.len() != before
    }
}

/// Usable-object capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// What happens on use; `None` for inert objects
    pub effect: Option<ItemEffect>,
    /// Whether use must first go through target selection
    pub targeting: bool,
    /// Prompt logged when target selection starts
    pub targeting_message: Option<String>,
    /// Default parameters, overridden by call-site parameters on use
    pub params: EffectParams,
}

impl Item {
    pub fn inert() -> Self {
        Self {
            effect: None,
            targeting: false,
            targeting_message: None,
            params: EffectParams::default(),
        }
    }
}

/// Experience and character level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    pub current_level: u32,
    pub current_xp: u32,
    pub level_up_base: u32,
    pub level_up_factor: u32,
}

impl Default for Level {
    fn default() -> Self {
        Self {
            current_level: 1,
            current_xp: 0,
            level_up_base: 200,
            level_up_factor: 150,
        }
    }
}

impl Level {
    pub fn experience_to_next_level(&self) -> u32 {
        self.level_up_base + self.current_level * self.level_up_factor
    }

    /// Adds experience and reports whether a level was gained.
    ///
    /// At most one level is gained per call; surplus experience carries over
    /// towards the next threshold.
    ///
    /// # Examples
    ///
    /// ```
    /// use yarg::Level;
    ///
    /// let mut level = Level::default();
    /// assert!(!level.add_xp(100));
    /// assert!(level.add_xp(250));
    /// assert_eq!(level.current_level, 2);
    /// assert_eq!(level.current_xp, 0);
    /// ```
    pub fn add_xp(&mut self, xp: u32) -> bool {
        self.current_xp += xp;
        let threshold = self.experience_to_next_level();
        if self.current_xp >= threshold {
            self.current_xp -= threshold;
            self.current_level += 1;
            true
        } else {
            false
        }
    }
}

/// Marks a staircase leading down from floor `floor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stairs {
    pub floor: u32,
}

/// Any actor or object in the world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    pub glyph: char,
    pub color: Color,
    pub position: Position,
    pub blocks_movement: bool,
    pub render_order: RenderOrder,
    pub fighter: Option<Fighter>,
    pub ai: Option<Ai>,
    pub inventory: Option<Inventory>,
    pub item: Option<Item>,
    pub level: Option<Level>,
    pub stairs: Option<Stairs>,
}

impl Entity {
    /// Creates a bare, non-blocking entity with no capabilities.
    pub fn new(name: impl Into<String>, glyph: char, color: Color, position: Position) -> Self {
        Self {
            name: name.into(),
            glyph,
            color,
            position,
            blocks_movement: false,
            render_order: RenderOrder::Corpse,
            fighter: None,
            ai: None,
            inventory: None,
            item: None,
            level: None,
            stairs: None,
        }
    }

    /// The player character with starting stats from [`crate::config`].
    pub fn player(position: Position) -> Self {
        use crate::config::{INVENTORY_CAPACITY, PLAYER_DEFENSE, PLAYER_HP, PLAYER_POWER};

        Entity::new("Player", '@', Color::WHITE, position)
            .blocking()
            .with_render_order(RenderOrder::Actor)
            .with_fighter(Fighter::new(PLAYER_HP, PLAYER_DEFENSE, PLAYER_POWER, 0))
            .with_inventory(Inventory::new(INVENTORY_CAPACITY))
            .with_level(Level::default())
    }

    pub fn blocking(mut self) -> Self {
        self.blocks_movement = true;
        self
    }

    pub fn with_render_order(mut self, render_order: RenderOrder) -> Self {
        self.render_order = render_order;
        self
    }

    pub fn with_fighter(mut self, fighter: Fighter) -> Self {
        self.fighter = Some(fighter);
        self
    }

    pub fn with_ai(mut self, ai: Ai) -> Self {
        self.ai = Some(ai);
        self
    }

    pub fn with_inventory(mut self, inventory: Inventory) -> Self {
        self.inventory = Some(inventory);
        self
    }

    pub fn with_item(mut self, item: Item) -> Self {
        self.item = Some(item);
        self.render_order = RenderOrder::Item;
        self
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = Some(level);
        self
    }

    pub fn with_stairs(mut self, stairs: Stairs) -> Self {
        self.stairs = Some(stairs);
        self.render_order = RenderOrder::Stairs;
        self
    }

    pub fn is_fighter(&self) -> bool {
        self.fighter.is_some()
    }

    pub fn has_ai(&self) -> bool {
        self.ai.is_some()
    }

    pub fn is_item(&self) -> bool {
        self.item.is_some()
    }

    pub fn is_alive(&self) -> bool {
        self.fighter.as_ref().map(|f| f.hp > 0).unwrap_or(false)
    }

    pub fn distance(&self, pos: Position) -> f64 {
        self.position.euclidean_distance(pos)
    }

    pub fn distance_to(&self, other: &Entity) -> f64 {
        self.distance(other.position)
    }
}

/// Owns every entity of a session behind stable [`EntityId`] handles.
///
/// Besides the slots, the arena keeps the ordered list of entities lying on
/// the floor. Carried items live in the arena but not on the floor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityArena {
    slots: Vec<Option<Entity>>,
    floor: Vec<EntityId>,
}

impl EntityArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entity and puts it on the floor.
    pub fn spawn(&mut self, entity: Entity) -> EntityId {
        let id = self.insert(entity);
        self.floor.push(id);
        id
    }

    /// Adds an entity without putting it on the floor.
    pub fn insert(&mut self, entity: Entity) -> EntityId {
        let id = EntityId(self.slots.len());
        self.slots.push(Some(entity));
        id
    }

    /// Removes an entity from the session entirely.
    pub fn despawn(&mut self, id: EntityId) -> Option<Entity> {
        self.floor.retain(|&floor_id| floor_id != id);
        self.slots.get_mut(id.0).and_then(Option::take)
    }

    /// Takes an entity off the floor, keeping it alive in the arena.
    pub fn lift(&mut self, id: EntityId) -> bool {
        let before = self.floor.len();
        self.floor.retain(|&floor_id| floor_id != id);
        self.floor.len() != before
    }

    /// Puts a live entity back on the floor, at the end of the floor order.
    pub fn place(&mut self, id: EntityId) -> bool {
        if self.get(id).is_none() || self.is_on_floor(id) {
            return false;
        }
        self.floor.push(id);
        true
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    pub fn is_on_floor(&self, id: EntityId) -> bool {
        self.floor.contains(&id)
    }

    /// Floor entities in floor order.
    pub fn floor_ids(&self) -> &[EntityId] {
        &self.floor
    }

    pub fn floor_entities(&self) -> impl Iterator<Item = (EntityId, &Entity)> + '_ {
        self.floor
            .iter()
            .filter_map(move |&id| self.get(id).map(|entity| (id, entity)))
    }

    /// First blocking floor entity standing at `pos`.
    pub fn blocking_entity_at(&self, pos: Position) -> Option<EntityId> {
        self.floor_entities()
            .find(|(_, entity)| entity.blocks_movement && entity.position == pos)
            .map(|(id, _)| id)
    }

    /// Every floor entity standing at `pos`, in floor order.
    pub fn entities_at(&self, pos: Position) -> Vec<EntityId> {
        self.floor_entities()
            .filter(|(_, entity)| entity.position == pos)
            .map(|(id, _)| id)
            .collect()
    }

    /// Number of live entities, carried ones included.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn orc(position: Position) -> Entity {
        Entity::new("Orc", 'o', Color::DESATURATED_GREEN, position)
            .blocking()
            .with_fighter(Fighter::new(10, 0, 3, 35))
            .with_ai(Ai::Basic)
    }

    #[test]
    fn test_damage_is_never_negative() {
        let weak = Fighter::new(10, 0, 1, 0);
        let tank = Fighter::new(10, 5, 1, 0);
        assert_eq!(weak.damage_against(&tank), 0);
        assert_eq!(tank.damage_against(&weak), 1);
    }

    #[test]
    fn test_heal_caps_at_max() {
        let mut fighter = Fighter::new(20, 0, 1, 0);
        fighter.hp = 5;
        fighter.heal(40);
        assert_eq!(fighter.hp, 20);
    }

    #[test]
    fn test_inventory_rejects_when_full() {
        let mut inventory = Inventory::new(1);
        let events = inventory.add_item(EntityId(1), "potion");
        assert!(matches!(events[0], GameEvent::ItemAdded { item } if item == EntityId(1)));

        let events = inventory.add_item(EntityId(2), "scroll");
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], GameEvent::Message(m) if m.text.contains("full")));
        assert_eq!(inventory.items, vec![EntityId(1)]);
    }

    #[test]
    fn test_level_gains_once_per_award() {
        let mut level = Level::default();
        assert_eq!(level.experience_to_next_level(), 350);
        // Enough for several levels, but only one is granted
        assert!(level.add_xp(1000));
        assert_eq!(level.current_level, 2);
        assert_eq!(level.current_xp, 650);
    }

    #[test]
    fn test_arena_handles_are_stable() {
        let mut arena = EntityArena::new();
        let a = arena.spawn(orc(Position::new(1, 1)));
        let b = arena.spawn(orc(Position::new(2, 2)));
        arena.despawn(a);
        let c = arena.spawn(orc(Position::new(3, 3)));

        assert!(arena.get(a).is_none());
        assert_ne!(c, a);
        assert_eq!(arena.get(b).unwrap().position, Position::new(2, 2));
        assert_eq!(arena.floor_ids(), &[b, c]);
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn test_lift_and_place() {
        let mut arena = EntityArena::new();
        let potion = arena.spawn(Entity::new("Potion", '!', Color::VIOLET, Position::new(1, 1)));
        let other = arena.spawn(orc(Position::new(4, 4)));

        assert!(arena.lift(potion));
        assert!(!arena.is_on_floor(potion));
        assert!(arena.get(potion).is_some());
        assert!(!arena.lift(potion));

        assert!(arena.place(potion));
        assert!(!arena.place(potion));
        assert_eq!(arena.floor_ids(), &[other, potion]);
    }

    #[test]
    fn test_blocking_lookup_ignores_items() {
        let mut arena = EntityArena::new();
        let pos = Position::new(3, 3);
        let potion = arena.spawn(Entity::new("Potion", '!', Color::VIOLET, pos));
        assert_eq!(arena.blocking_entity_at(pos), None);

        let monster = arena.spawn(orc(pos));
        assert_eq!(arena.blocking_entity_at(pos), Some(monster));
        assert_eq!(arena.entities_at(pos), vec![potion, monster]);
        assert_eq!(arena.blocking_entity_at(Position::new(0, 0)), None);
    }
}
