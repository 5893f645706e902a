//! # Dungeon Generation
//!
//! Room-and-corridor floor generation.
//!
//! The generator works on a grid of solid rock:
//! 1. Tries a fixed number of random room placements, dropping any that touch
//!    an accepted room
//! 2. Carves each accepted room and joins it to the previous one with an
//!    L-shaped tunnel
//! 3. Hands each room to the populators for monsters and items
//! 4. Puts the down staircase in the last room

use crate::game::{Color, Entity, EntityArena, EntityId, Position, Stairs, TileGrid};
use crate::generation::{utils, GenerationConfig, ItemPopulator, MonsterPopulator, Populator, Rect};
use crate::{YargError, YargResult};
use log::{debug, info, trace};
use rand::rngs::StdRng;
use rand::Rng;

/// Primary floor generator.
pub struct DungeonGenerator {
    /// Run on every accepted room, in order
    pub populators: Vec<Box<dyn Populator>>,
    /// Whether to verify that every room is reachable after carving
    pub ensure_connectivity: bool,
}

impl DungeonGenerator {
    /// Creates a generator that stocks rooms with monsters and items.
    ///
    /// # Examples
    ///
    /// ```
    /// use yarg::DungeonGenerator;
    ///
    /// let generator = DungeonGenerator::new();
    /// assert_eq!(generator.populators.len(), 2);
    /// ```
    pub fn new() -> Self {
        Self {
            populators: vec![Box::new(MonsterPopulator), Box::new(ItemPopulator)],
            ensure_connectivity: true,
        }
    }

    /// Creates a generator that only carves rooms and tunnels.
    pub fn empty() -> Self {
        Self {
            populators: Vec::new(),
            ensure_connectivity: true,
        }
    }

    /// Carves a floor into `grid` and populates `entities`.
    ///
    /// The player is moved to the center of the first room. `depth` is the
    /// floor number recorded on the down staircase. Returns the accepted
    /// rooms in placement order.
    pub fn make_map(
        &self,
        config: &GenerationConfig,
        rng: &mut StdRng,
        grid: &mut TileGrid,
        entities: &mut EntityArena,
        player: EntityId,
        depth: u32,
    ) -> YargResult<Vec<Rect>> {
        config.validate()?;
        if grid.width != config.map_width || grid.height != config.map_height {
            return Err(YargError::InvalidConfig(format!(
                "grid is {}x{} but configuration asks for {}x{}",
                grid.width, grid.height, config.map_width, config.map_height
            )));
        }

        let mut rooms: Vec<Rect> = Vec::new();

        for attempt in 0..config.max_rooms {
            let w = rng.gen_range(config.room_min_size..=config.room_max_size);
            let h = rng.gen_range(config.room_min_size..=config.room_max_size);
            let x = rng.gen_range(0..=grid.width - w - 1);
            let y = rng.gen_range(0..=grid.height - h - 1);
            let new_room = Rect::new(x, y, w, h);

            if rooms.iter().any(|other| new_room.intersects(other)) {
                trace!("Attempt {} rejected: {:?} overlaps", attempt, new_room);
                continue;
            }

            self.carve_room(grid, &new_room);
            let center = new_room.center();

            match rooms.last() {
                None => {
                    let player_entity = entities
                        .get_mut(player)
                        .ok_or(YargError::MissingEntity(player))?;
                    player_entity.position = center;
                }
                Some(previous) => self.connect(grid, previous.center(), center, rng),
            }

            for populator in &self.populators {
                let spawned = populator.populate(&new_room, entities, config, rng);
                if spawned > 0 {
                    trace!("{} spawned {} in {:?}", populator.populator_type(), spawned, new_room);
                }
            }

            rooms.push(new_room);
        }

        if self.ensure_connectivity {
            utils::validate_connectivity(grid, &rooms)?;
        }

        if let Some(last) = rooms.last() {
            self.place_stairs(entities, last.center(), depth);
        }

        info!(
            "Generated floor {}: {} rooms from {} attempts, {} entities on the floor",
            depth,
            rooms.len(),
            config.max_rooms,
            entities.floor_ids().len()
        );
        Ok(rooms)
    }

    fn carve_room(&self, grid: &mut TileGrid, room: &Rect) {
        for pos in room.interior_positions() {
            grid.carve(pos);
        }
    }

    /// Joins two room centers with an L-shaped tunnel, bend chosen at random.
    fn connect(&self, grid: &mut TileGrid, from: Position, to: Position, rng: &mut StdRng) {
        if rng.gen_bool(0.5) {
            grid.carve_h_tunnel(from.x, to.x, from.y);
            grid.carve_v_tunnel(from.y, to.y, to.x);
        } else {
            grid.carve_v_tunnel(from.y, to.y, from.x);
            grid.carve_h_tunnel(from.x, to.x, to.y);
        }
    }

    fn place_stairs(&self, entities: &mut EntityArena, position: Position, depth: u32) {
        let stairs = Entity::new("Stairs", '>', Color::WHITE, position).with_stairs(Stairs { floor: depth });
        entities.spawn(stairs);
        debug!("Stairs down placed at {:?}", position);
    }
}

impl Default for DungeonGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn generate(
        generator: &DungeonGenerator,
        config: &GenerationConfig,
    ) -> (TileGrid, EntityArena, EntityId, Vec<Rect>) {
        let mut rng = utils::create_rng(config);
        let mut grid = TileGrid::new(config.map_width, config.map_height);
        let mut entities = EntityArena::new();
        let player = entities.spawn(Entity::player(Position::new(0, 0)));
        let rooms = generator
            .make_map(config, &mut rng, &mut grid, &mut entities, player, 1)
            .unwrap();
        (grid, entities, player, rooms)
    }

    #[test]
    fn test_player_starts_in_first_room() {
        let config = GenerationConfig::new(12345);
        let (grid, entities, player, rooms) = generate(&DungeonGenerator::new(), &config);

        let position = entities.get(player).unwrap().position;
        assert_eq!(position, rooms[0].center());
        assert!(!grid.is_blocked(position));
    }

    #[test]
    fn test_rooms_never_intersect() {
        let config = GenerationConfig::new(777);
        let (_, _, _, rooms) = generate(&DungeonGenerator::empty(), &config);

        assert!(!rooms.is_empty());
        assert!(rooms.len() <= config.max_rooms as usize);
        for (i, a) in rooms.iter().enumerate() {
            for b in &rooms[i + 1..] {
                assert!(!a.intersects(b));
            }
        }
    }

    #[test]
    fn test_room_interiors_are_walkable() {
        let config = GenerationConfig::for_testing(3);
        let (grid, _, _, rooms) = generate(&DungeonGenerator::empty(), &config);
        for room in &rooms {
            assert!(room.interior_positions().iter().all(|&pos| !grid.is_blocked(pos)));
        }
    }

    #[test]
    fn test_stairs_in_last_room() {
        let config = GenerationConfig::for_testing(11);
        let (_, entities, _, rooms) = generate(&DungeonGenerator::empty(), &config);

        let stairs: Vec<_> = entities
            .floor_entities()
            .filter(|(_, e)| e.stairs.is_some())
            .collect();
        assert_eq!(stairs.len(), 1);
        assert_eq!(stairs[0].1.position, rooms.last().unwrap().center());
    }

    #[test]
    fn test_same_seed_same_floor() {
        let config = GenerationConfig::new(2024);
        let (grid_a, entities_a, _, _) = generate(&DungeonGenerator::new(), &config);
        let (grid_b, entities_b, _, _) = generate(&DungeonGenerator::new(), &config);
        assert_eq!(grid_a, grid_b);
        assert_eq!(entities_a, entities_b);
    }

    #[test]
    fn test_mismatched_grid_is_rejected() {
        let config = GenerationConfig::new(1);
        let mut rng = StdRng::seed_from_u64(1);
        let mut grid = TileGrid::new(20, 20);
        let mut entities = EntityArena::new();
        let player = entities.spawn(Entity::player(Position::new(0, 0)));

        let result = DungeonGenerator::new().make_map(&config, &mut rng, &mut grid, &mut entities, player, 1);
        assert!(matches!(result, Err(YargError::InvalidConfig(_))));
    }
}
