//! # Autoplay Module
//!
//! A simple bot that plays the game through the same intents a human would
//! send. Used by the headless binary and by soak tests.

use crate::game::{ai, EntityId, GameSession, ItemEffect, Position, TurnState, VisibilityMap};
use crate::input::{Intent, LevelUpChoice, PointerAction};
use log::trace;
use pathfinding::prelude::bfs;
use std::collections::VecDeque;

/// One input produced by the bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotCommand {
    Intent(Intent),
    Pointer(PointerAction),
}

/// Greedy player bot.
///
/// Priorities, highest first: drink a potion when at half health or less,
/// fight the nearest visible monster (with scrolls when it is out of reach),
/// pick up loot underfoot, walk to seen loot, explore, then descend.
#[derive(Debug, Clone, Default)]
pub struct Autoplay {
    queued: VecDeque<Intent>,
}

impl Autoplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// The next input to send, or `None` once the game cannot continue.
    pub fn next_command(
        &mut self,
        session: &GameSession,
        visibility: &dyn VisibilityMap,
    ) -> Option<BotCommand> {
        let command = match session.states.current() {
            TurnState::PlayerDead | TurnState::EnemyTurn => return None,
            TurnState::LevelUp => {
                let level = session.character_sheet().map(|sheet| sheet.level).unwrap_or(0);
                let choice = LevelUpChoice::all()[level as usize % 3];
                BotCommand::Intent(Intent::LevelUp(choice))
            }
            TurnState::Targeting => match nearest_visible_monster(session, visibility) {
                Some((_, position)) => BotCommand::Pointer(PointerAction::LeftClick(position)),
                None => BotCommand::Pointer(PointerAction::RightClick),
            },
            TurnState::ShowInventory | TurnState::DropInventory => {
                BotCommand::Intent(self.queued.pop_front().unwrap_or(Intent::Exit))
            }
            TurnState::CharacterScreen => BotCommand::Intent(Intent::Exit),
            TurnState::PlayersTurn => BotCommand::Intent(self.decide(session, visibility)),
        };
        trace!("Autoplay chose {:?}", command);
        Some(command)
    }

    fn decide(&mut self, session: &GameSession, visibility: &dyn VisibilityMap) -> Intent {
        self.queued.clear();
        let Some(player) = session.player_entity() else {
            return Intent::Wait;
        };
        let here = player.position;

        if let Some(fighter) = player.fighter.as_ref() {
            if fighter.hp <= fighter.max_hp / 2 {
                if let Some(slot) = inventory_slot(session, ItemEffect::Heal) {
                    return self.use_slot(slot);
                }
            }
        }

        if let Some((_, target)) = nearest_visible_monster(session, visibility) {
            let distance = here.euclidean_distance(target);
            if distance < 2.0 {
                return step_intent(here, target);
            }
            if distance <= 5.0 {
                if let Some(slot) = inventory_slot(session, ItemEffect::Lightning) {
                    return self.use_slot(slot);
                }
            }
            if distance > 3.0 {
                if let Some(slot) = inventory_slot(session, ItemEffect::Fireball) {
                    return self.use_slot(slot);
                }
            }
            return match ai::next_step(here, target, &session.grid, &session.entities) {
                Some(step) => step_intent(here, step),
                None => Intent::Wait,
            };
        }

        let inventory_full = player
            .inventory
            .as_ref()
            .map(|inventory| inventory.is_full())
            .unwrap_or(true);
        if !inventory_full {
            if has_item_at(session, here) {
                return Intent::Pickup;
            }
            if let Some(step) = path_step(session, |pos| is_explored(session, pos) && has_item_at(session, pos)) {
                return step_intent(here, step);
            }
        }

        if let Some(step) = path_step(session, |pos| !is_explored(session, pos)) {
            return step_intent(here, step);
        }

        if has_stairs_at(session, here) {
            return Intent::TakeStairsDown;
        }
        if let Some(step) = path_step(session, |pos| has_stairs_at(session, pos)) {
            return step_intent(here, step);
        }

        Intent::Wait
    }

    fn use_slot(&mut self, slot: usize) -> Intent {
        self.queued.push_back(Intent::InventoryIndex(slot));
        Intent::ShowInventory
    }
}

fn step_intent(from: Position, to: Position) -> Intent {
    Intent::Move {
        dx: (to.x - from.x).signum(),
        dy: (to.y - from.y).signum(),
    }
}

fn nearest_visible_monster(
    session: &GameSession,
    visibility: &dyn VisibilityMap,
) -> Option<(EntityId, Position)> {
    let here = session.player_position();
    session
        .entities
        .floor_entities()
        .filter(|(id, entity)| {
            *id != session.player
                && entity.has_ai()
                && entity.is_alive()
                && visibility.is_visible(entity.position)
        })
        .min_by_key(|(_, entity)| entity.position.chebyshev_distance(here))
        .map(|(id, entity)| (id, entity.position))
}

fn inventory_slot(session: &GameSession, effect: ItemEffect) -> Option<usize> {
    let inventory = session.player_entity()?.inventory.as_ref()?;
    inventory.items.iter().position(|&id| {
        session
            .entities
            .get(id)
            .and_then(|entity| entity.item.as_ref())
            .map(|item| item.effect == Some(effect))
            .unwrap_or(false)
    })
}

fn is_explored(session: &GameSession, pos: Position) -> bool {
    session.grid.get_tile(pos).map(|tile| tile.explored).unwrap_or(false)
}

fn has_item_at(session: &GameSession, pos: Position) -> bool {
    session
        .entities
        .entities_at(pos)
        .into_iter()
        .any(|id| session.entities.get(id).map(|e| e.is_item()).unwrap_or(false))
}

fn has_stairs_at(session: &GameSession, pos: Position) -> bool {
    session
        .entities
        .entities_at(pos)
        .into_iter()
        .any(|id| session.entities.get(id).map(|e| e.stairs.is_some()).unwrap_or(false))
}

/// First step of the shortest walk to the nearest cell satisfying `goal`.
fn path_step(session: &GameSession, goal: impl Fn(Position) -> bool) -> Option<Position> {
    let start = session.player_position();
    let path = bfs(
        &start,
        |&pos| {
            pos.adjacent_positions()
                .into_iter()
                .filter(|&next| {
                    !session.grid.is_blocked(next) && session.entities.blocking_entity_at(next).is_none()
                })
                .collect::<Vec<_>>()
        },
        |&pos| pos != start && goal(pos),
    )?;
    path.get(1).copied()
}
