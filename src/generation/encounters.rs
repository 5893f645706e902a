//! # Encounter Generation
//!
//! Monster templates and per-room monster placement.

use crate::game::{Ai, Color, Entity, EntityArena, Fighter, Position, RenderOrder};
use crate::generation::{utils, GenerationConfig, Populator, Rect};
use rand::rngs::StdRng;
use rand::Rng;

/// Chance, in percent, that a spawned monster is an orc rather than a troll.
const ORC_CHANCE: u32 = 80;

pub fn orc(position: Position) -> Entity {
    Entity::new("Orc", 'o', Color::DESATURATED_GREEN, position)
        .blocking()
        .with_render_order(RenderOrder::Actor)
        .with_fighter(Fighter::new(10, 0, 3, 35))
        .with_ai(Ai::Basic)
}

pub fn troll(position: Position) -> Entity {
    Entity::new("Troll", 'T', Color::DARKER_GREEN, position)
        .blocking()
        .with_render_order(RenderOrder::Actor)
        .with_fighter(Fighter::new(16, 1, 4, 100))
        .with_ai(Ai::Basic)
}

/// Places up to `max_monsters_per_room` monsters in a room.
///
/// Each monster picks a random interior cell; the monster is skipped if
/// anything already stands there.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonsterPopulator;

impl Populator for MonsterPopulator {
    fn populate(
        &self,
        room: &Rect,
        entities: &mut EntityArena,
        config: &GenerationConfig,
        rng: &mut StdRng,
    ) -> usize {
        let count = rng.gen_range(0..=config.max_monsters_per_room);
        let mut spawned = 0;

        for _ in 0..count {
            let position = utils::random_interior_position(room, rng);
            if !entities.entities_at(position).is_empty() {
                continue;
            }

            let monster = if rng.gen_range(0..100) < ORC_CHANCE {
                orc(position)
            } else {
                troll(position)
            };
            entities.spawn(monster);
            spawned += 1;
        }
        spawned
    }

    fn populator_type(&self) -> &'static str {
        "MonsterPopulator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_templates() {
        let o = orc(Position::new(1, 1));
        assert_eq!(o.glyph, 'o');
        assert_eq!(o.fighter, Some(Fighter::new(10, 0, 3, 35)));
        assert!(o.blocks_movement);

        let t = troll(Position::new(1, 1));
        assert_eq!(t.fighter.as_ref().map(|f| (f.hp, f.defense, f.power, f.xp)), Some((16, 1, 4, 100)));
        assert_eq!(t.ai, Some(Ai::Basic));
    }

    #[test]
    fn test_monsters_stay_inside_and_never_stack() {
        let room = Rect::new(2, 2, 4, 4);
        let mut config = GenerationConfig::new(5);
        config.max_monsters_per_room = 20;
        let mut rng = StdRng::seed_from_u64(5);
        let mut entities = EntityArena::new();

        for _ in 0..10 {
            MonsterPopulator.populate(&room, &mut entities, &config, &mut rng);
        }

        let positions: Vec<Position> = entities.floor_entities().map(|(_, e)| e.position).collect();
        assert!(!positions.is_empty());
        assert!(positions.len() <= room.interior_positions().len());
        for pos in &positions {
            assert!(room.contains_interior(*pos));
            assert_eq!(entities.entities_at(*pos).len(), 1);
        }
    }

    #[test]
    fn test_zero_monster_config_spawns_nothing() {
        let mut config = GenerationConfig::new(5);
        config.max_monsters_per_room = 0;
        let mut rng = StdRng::seed_from_u64(9);
        let mut entities = EntityArena::new();
        let spawned = MonsterPopulator.populate(&Rect::new(0, 0, 8, 8), &mut entities, &config, &mut rng);
        assert_eq!(spawned, 0);
        assert!(entities.is_empty());
    }
}
