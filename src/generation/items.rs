//! # Item Generation
//!
//! Item templates and per-room loot placement.

use crate::game::{Color, Entity, EntityArena, Item, ItemEffect, Position};
use crate::generation::{utils, GenerationConfig, Populator, Rect};
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::Rng;

/// Relative spawn weights of the item kinds.
const ITEM_WEIGHTS: [(ItemEffect, u32); 4] = [
    (ItemEffect::Heal, 70),
    (ItemEffect::Lightning, 10),
    (ItemEffect::Fireball, 10),
    (ItemEffect::Confuse, 10),
];

fn item(effect: ItemEffect, targeting_message: Option<&str>) -> Item {
    Item {
        effect: Some(effect),
        targeting: targeting_message.is_some(),
        targeting_message: targeting_message.map(str::to_string),
        params: effect.default_params(),
    }
}

pub fn healing_potion(position: Position) -> Entity {
    Entity::new("Healing Potion", '!', Color::VIOLET, position).with_item(item(ItemEffect::Heal, None))
}

pub fn lightning_scroll(position: Position) -> Entity {
    Entity::new("Lightning Scroll", '#', Color::YELLOW, position)
        .with_item(item(ItemEffect::Lightning, None))
}

pub fn fireball_scroll(position: Position) -> Entity {
    Entity::new("Fireball Scroll", '#', Color::RED, position).with_item(item(
        ItemEffect::Fireball,
        Some("Left-click a target tile for the fireball, or right-click to cancel."),
    ))
}

pub fn confusion_scroll(position: Position) -> Entity {
    Entity::new("Confusion Scroll", '#', Color::LIGHT_PINK, position).with_item(item(
        ItemEffect::Confuse,
        Some("Left-click an enemy to confuse it, or right-click to cancel."),
    ))
}

/// The floor template for an item kind.
pub fn item_template(effect: ItemEffect, position: Position) -> Entity {
    match effect {
        ItemEffect::Heal => healing_potion(position),
        ItemEffect::Lightning => lightning_scroll(position),
        ItemEffect::Fireball => fireball_scroll(position),
        ItemEffect::Confuse => confusion_scroll(position),
    }
}

/// Scatters up to `max_items_per_room` items in a room, weighted by kind.
#[derive(Debug, Clone, Copy, Default)]
pub struct ItemPopulator;

impl Populator for ItemPopulator {
    fn populate(
        &self,
        room: &Rect,
        entities: &mut EntityArena,
        config: &GenerationConfig,
        rng: &mut StdRng,
    ) -> usize {
        let Ok(weights) = WeightedIndex::new(ITEM_WEIGHTS.iter().map(|(_, weight)| *weight)) else {
            return 0;
        };

        let count = rng.gen_range(0..=config.max_items_per_room);
        let mut spawned = 0;

        for _ in 0..count {
            let position = utils::random_interior_position(room, rng);
            if !entities.entities_at(position).is_empty() {
                continue;
            }

            let (effect, _) = ITEM_WEIGHTS[weights.sample(rng)];
            entities.spawn(item_template(effect, position));
            spawned += 1;
        }
        spawned
    }

    fn populator_type(&self) -> &'static str {
        "ItemPopulator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use std::collections::HashMap;

    #[test]
    fn test_targeting_items_carry_prompts() {
        let fireball = fireball_scroll(Position::new(0, 0));
        let cap = fireball.item.unwrap();
        assert!(cap.targeting);
        assert!(cap.targeting_message.unwrap().contains("fireball"));

        let potion = healing_potion(Position::new(0, 0)).item.unwrap();
        assert!(!potion.targeting);
        assert_eq!(potion.params.amount, Some(40));
    }

    #[test]
    fn test_potions_are_most_common() {
        let room = Rect::new(0, 0, 30, 30);
        let mut config = GenerationConfig::new(1);
        config.max_items_per_room = 2;
        let mut rng = StdRng::seed_from_u64(21);
        let mut entities = EntityArena::new();

        for _ in 0..200 {
            ItemPopulator.populate(&room, &mut entities, &config, &mut rng);
        }

        let mut counts: HashMap<String, usize> = HashMap::new();
        for (_, entity) in entities.floor_entities() {
            *counts.entry(entity.name.clone()).or_default() += 1;
        }
        let potions = counts.get("Healing Potion").copied().unwrap_or(0);
        let scrolls: usize = counts
            .iter()
            .filter(|(name, _)| name.ends_with("Scroll"))
            .map(|(_, count)| *count)
            .sum();
        assert!(potions > scrolls);
    }
}
