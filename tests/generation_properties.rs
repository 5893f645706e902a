//! Property tests for floor generation.

use proptest::prelude::*;
use rand::{rngs::StdRng, SeedableRng};
use std::collections::HashSet;
use yarg::generation::utils;
use yarg::{DungeonGenerator, Entity, EntityArena, EntityId, GenerationConfig, Position, Rect, TileGrid};

fn generate(config: &GenerationConfig) -> (TileGrid, EntityArena, EntityId, Vec<Rect>) {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut grid = TileGrid::new(config.map_width, config.map_height);
    let mut entities = EntityArena::new();
    let player = entities.spawn(Entity::player(Position::new(0, 0)));
    let rooms = DungeonGenerator::new()
        .make_map(config, &mut rng, &mut grid, &mut entities, player, 1)
        .expect("generation should succeed");
    (grid, entities, player, rooms)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn accepted_rooms_never_intersect(seed in any::<u64>()) {
        let (_, _, _, rooms) = generate(&GenerationConfig::new(seed));
        for (i, a) in rooms.iter().enumerate() {
            for b in &rooms[i + 1..] {
                prop_assert!(!a.intersects(b), "seed={seed}: {a:?} intersects {b:?}");
            }
        }
    }

    #[test]
    fn every_room_is_reachable_from_the_first(seed in any::<u64>()) {
        let (grid, _, _, rooms) = generate(&GenerationConfig::new(seed));
        let reachable = utils::reachable_from(&grid, rooms[0].center());
        for room in &rooms {
            prop_assert!(reachable.contains(&room.center()), "seed={seed}: {room:?} unreachable");
        }
    }

    #[test]
    fn floor_entities_stand_on_walkable_tiles(seed in any::<u64>()) {
        let (grid, entities, player, rooms) = generate(&GenerationConfig::new(seed));

        prop_assert_eq!(entities.get(player).unwrap().position, rooms[0].center());

        let mut blocking_positions = HashSet::new();
        for (_, entity) in entities.floor_entities() {
            prop_assert!(!grid.is_blocked(entity.position), "seed={seed}: {} in a wall", entity.name);
            if entity.blocks_movement {
                prop_assert!(
                    blocking_positions.insert(entity.position),
                    "seed={seed}: two blockers at {:?}",
                    entity.position
                );
            }
        }
    }

    #[test]
    fn monster_count_respects_room_budget(seed in any::<u64>()) {
        let config = GenerationConfig::new(seed);
        let (_, entities, _, rooms) = generate(&config);
        let monsters = entities.floor_entities().filter(|(_, e)| e.has_ai()).count();
        prop_assert!(monsters <= rooms.len() * config.max_monsters_per_room as usize);
    }
}

#[test]
fn single_room_on_a_small_map() {
    let config = GenerationConfig {
        seed: 17,
        map_width: 10,
        map_height: 10,
        room_min_size: 6,
        room_max_size: 6,
        max_rooms: 1,
        max_monsters_per_room: 0,
        max_items_per_room: 0,
    };
    let (grid, entities, player, rooms) = generate(&config);

    assert_eq!(rooms.len(), 1);
    let room = rooms[0];
    assert_eq!(room.x2 - room.x1, 6);
    assert_eq!(entities.get(player).unwrap().position, room.center());
    assert!(!grid.is_blocked(room.center()));
    assert_eq!(entities.floor_entities().filter(|(_, e)| e.has_ai()).count(), 0);

    // Only the room interior is carved
    assert_eq!(grid.walkable_positions().count(), 25);
}

#[test]
fn single_room_may_hold_monsters() {
    let seen_monster = (0..50u64).any(|seed| {
        let config = GenerationConfig {
            seed,
            map_width: 10,
            map_height: 10,
            room_min_size: 6,
            room_max_size: 6,
            max_rooms: 1,
            max_monsters_per_room: 3,
            max_items_per_room: 0,
        };
        let (_, entities, _, _) = generate(&config);
        let has_monster = entities.floor_entities().any(|(_, e)| e.has_ai());
        has_monster
    });
    assert!(seen_monster);
}

#[test]
fn invalid_configuration_is_rejected_before_carving() {
    let mut config = GenerationConfig::new(1);
    config.room_min_size = 12;
    let mut rng = StdRng::seed_from_u64(1);
    let mut grid = TileGrid::new(config.map_width, config.map_height);
    let mut entities = EntityArena::new();
    let player = entities.spawn(Entity::player(Position::new(0, 0)));

    let result = DungeonGenerator::new().make_map(&config, &mut rng, &mut grid, &mut entities, player, 1);

    assert!(result.is_err());
    assert_eq!(grid.walkable_positions().count(), 0);
}
