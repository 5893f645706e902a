//! # Monster AI
//!
//! One decision per monster per enemy turn. Basic monsters chase the player
//! along an A* path while they can see them and attack when adjacent;
//! confused monsters stumble in random directions until the effect wears off.

use crate::config::MAX_PATH_LENGTH;
use crate::game::{attack, Ai, EntityArena, EntityId, GameEvent, Position, Severity, TileGrid, VisibilityMap};
use log::trace;
use pathfinding::prelude::astar;
use rand::Rng;

/// Runs one turn for `monster` against `target`.
///
/// Returns the outcome events; movement is applied directly.
pub fn take_turn<R: Rng>(
    monster: EntityId,
    target: EntityId,
    grid: &TileGrid,
    entities: &mut EntityArena,
    visibility: &dyn VisibilityMap,
    rng: &mut R,
) -> Vec<GameEvent> {
    let Some(ai) = entities.get(monster).and_then(|e| e.ai.clone()) else {
        return Vec::new();
    };

    match ai {
        Ai::Basic => basic_turn(monster, target, grid, entities, visibility),
        Ai::Confused { previous, turns } => {
            confused_turn(monster, *previous, turns, grid, entities, rng)
        }
    }
}

fn basic_turn(
    monster: EntityId,
    target: EntityId,
    grid: &TileGrid,
    entities: &mut EntityArena,
    visibility: &dyn VisibilityMap,
) -> Vec<GameEvent> {
    let (Some(me), Some(them)) = (entities.get(monster), entities.get(target)) else {
        return Vec::new();
    };

    // Monsters only act while the player can see them
    if !visibility.is_visible(me.position) {
        return Vec::new();
    }

    let start = me.position;
    let goal = them.position;
    let target_alive = them.is_alive();

    if me.distance_to(them) >= 2.0 {
        let step = next_step(start, goal, grid, entities).unwrap_or_else(|| step_towards(start, goal));
        try_move(monster, step, grid, entities);
        Vec::new()
    } else if target_alive {
        attack(entities, monster, target)
    } else {
        Vec::new()
    }
}

fn confused_turn<R: Rng>(
    monster: EntityId,
    previous: Ai,
    turns: u32,
    grid: &TileGrid,
    entities: &mut EntityArena,
    rng: &mut R,
) -> Vec<GameEvent> {
    let Some(entity) = entities.get_mut(monster) else {
        return Vec::new();
    };

    if turns == 0 {
        let name = entity.name.clone();
        entity.ai = Some(previous);
        return vec![GameEvent::message(
            format!("The {} is no longer confused!", name),
            Severity::Warning,
        )];
    }

    entity.ai = Some(Ai::Confused {
        previous: Box::new(previous),
        turns: turns - 1,
    });
    let origin = entity.position;

    let delta = Position::new(rng.gen_range(-1..=1), rng.gen_range(-1..=1));
    if delta != Position::new(0, 0) {
        try_move(monster, origin + delta, grid, entities);
    }
    Vec::new()
}

/// First step of an A* path from `start` to `goal`.
///
/// Walls and blocking entities are impassable, except the goal cell itself.
/// Returns `None` when no path exists or the path is too long to be worth
/// following.
pub fn next_step(
    start: Position,
    goal: Position,
    grid: &TileGrid,
    entities: &EntityArena,
) -> Option<Position> {
    let (path, _cost) = astar(
        &start,
        |&pos| {
            pos.adjacent_positions()
                .into_iter()
                .filter(|&next| {
                    next == goal
                        || (!grid.is_blocked(next) && entities.blocking_entity_at(next).is_none())
                })
                .map(|next| (next, 1u32))
                .collect::<Vec<_>>()
        },
        |&pos| pos.chebyshev_distance(goal),
        |&pos| pos == goal,
    )?;

    if path.len() > MAX_PATH_LENGTH {
        trace!("Path from {:?} to {:?} too long ({})", start, goal, path.len());
        return None;
    }
    path.get(1).copied()
}

/// One step straight at `goal`, ignoring obstacles.
fn step_towards(start: Position, goal: Position) -> Position {
    let dx = (goal.x - start.x).signum();
    let dy = (goal.y - start.y).signum();
    start + Position::new(dx, dy)
}

fn try_move(monster: EntityId, destination: Position, grid: &TileGrid, entities: &mut EntityArena) {
    if grid.is_blocked(destination) || entities.blocking_entity_at(destination).is_some() {
        return;
    }
    if let Some(entity) = entities.get_mut(monster) {
        entity.position = destination;
    }
}
