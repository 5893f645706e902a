//! # Action Resolution
//!
//! Turns one decoded player intent into mutations of the session plus a batch
//! of outcome events for the reducer. Melee combat lives here as well, since
//! monsters attack through the same rules.

use crate::game::{
    EffectContext, EffectParams, Entity, EntityArena, EntityId, GameEvent, GameSession, Position,
    Severity, VisibilityMap,
};
use crate::input::{LevelUpChoice, PointerAction};
use crate::{YargError, YargResult};
use log::debug;

/// Result of resolving one action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Outcome events, in emission order
    pub events: Vec<GameEvent>,
    /// Whether the action itself ends the player's turn
    pub took_turn: bool,
    /// Whether the player moved and visibility must be recomputed
    pub fov_recompute: bool,
}

impl Resolution {
    /// Events that do not end the turn by themselves.
    pub fn events(events: Vec<GameEvent>) -> Self {
        Self {
            events,
            ..Self::default()
        }
    }

    /// Events from an action that ends the turn.
    pub fn turn(events: Vec<GameEvent>) -> Self {
        Self {
            events,
            took_turn: true,
            fov_recompute: false,
        }
    }
}

/// Subtracts `amount` hit points from `target`.
///
/// On death the batch gains a `Died` event followed by the experience the
/// victim was worth, credited to `source`.
pub fn apply_damage(
    entities: &mut EntityArena,
    target: EntityId,
    amount: i32,
    source: EntityId,
) -> Vec<GameEvent> {
    let Some(fighter) = entities.get_mut(target).and_then(|e| e.fighter.as_mut()) else {
        return Vec::new();
    };

    fighter.hp -= amount;
    if fighter.hp > 0 {
        return Vec::new();
    }

    vec![
        GameEvent::Died { entity: target },
        GameEvent::ExperienceGained {
            recipient: source,
            amount: fighter.xp,
        },
    ]
}

/// Melee attack from `attacker` on `target`.
///
/// Damage is `attacker.power - target.defense`, never below zero.
pub fn attack(entities: &mut EntityArena, attacker: EntityId, target: EntityId) -> Vec<GameEvent> {
    let (Some(attacking), Some(defending)) = (entities.get(attacker), entities.get(target)) else {
        return Vec::new();
    };
    let (Some(attacker_stats), Some(target_stats)) =
        (attacking.fighter.as_ref(), defending.fighter.as_ref())
    else {
        return Vec::new();
    };

    let damage = attacker_stats.damage_against(target_stats);
    let attacker_name = capitalize(&attacking.name);
    let target_name = defending.name.clone();

    if damage == 0 {
        return vec![GameEvent::message(
            format!("{} attacks {} but does no damage.", attacker_name, target_name),
            Severity::Info,
        )];
    }

    let mut events = vec![GameEvent::message(
        format!(
            "{} attacks {} for {} hit points.",
            attacker_name, target_name, damage
        ),
        Severity::Info,
    )];
    events.extend(apply_damage(entities, target, damage, attacker));
    events
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl GameSession {
    /// Moves `actor` by `delta`, or attacks whatever blocks the destination.
    ///
    /// Walking into a wall does nothing and does not use the turn.
    pub fn resolve_move(&mut self, actor: EntityId, delta: Position) -> YargResult<Resolution> {
        let origin = self
            .entities
            .get(actor)
            .ok_or(YargError::MissingEntity(actor))?
            .position;
        let destination = origin + delta;

        if self.grid.is_blocked(destination) {
            return Ok(Resolution::default());
        }

        if let Some(target) = self.entities.blocking_entity_at(destination) {
            return Ok(Resolution::turn(attack(&mut self.entities, actor, target)));
        }

        if let Some(entity) = self.entities.get_mut(actor) {
            entity.position = destination;
        }
        Ok(Resolution {
            events: Vec::new(),
            took_turn: true,
            fov_recompute: true,
        })
    }

    pub fn resolve_wait(&self) -> Resolution {
        Resolution::turn(vec![GameEvent::message("You wait a moment.", Severity::Info)])
    }

    /// Picks up the first item lying at the actor's feet.
    pub fn resolve_pickup(&mut self, actor: EntityId) -> YargResult<Resolution> {
        let position = self
            .entities
            .get(actor)
            .ok_or(YargError::MissingEntity(actor))?
            .position;

        let item = self.entities.entities_at(position).into_iter().find(|&id| {
            id != actor && self.entities.get(id).map(Entity::is_item).unwrap_or(false)
        });

        let Some(item) = item else {
            return Ok(Resolution::events(vec![GameEvent::message(
                "There is nothing here to pick up.",
                Severity::Warning,
            )]));
        };

        let name = self
            .entities
            .get(item)
            .map(|e| e.name.clone())
            .unwrap_or_default();

        match self.entities.get_mut(actor).and_then(|e| e.inventory.as_mut()) {
            Some(inventory) => Ok(Resolution::events(inventory.add_item(item, &name))),
            None => Ok(Resolution::events(vec![GameEvent::message(
                "You cannot carry anything.",
                Severity::Warning,
            )])),
        }
    }

    /// Uses `item` from `actor`'s inventory.
    ///
    /// `params` are the call-site parameters; they override the item's
    /// defaults. A targeting item used without a target only asks for one.
    pub fn resolve_use_item(
        &mut self,
        actor: EntityId,
        item: EntityId,
        params: EffectParams,
        visibility: &dyn VisibilityMap,
    ) -> YargResult<Resolution> {
        let entity = self.entities.get(item).ok_or(YargError::MissingEntity(item))?;
        let name = entity.name.clone();

        let usable = entity
            .item
            .as_ref()
            .and_then(|cap| cap.effect.map(|effect| (effect, cap.targeting, cap.params)));
        let Some((effect, targeting, defaults)) = usable else {
            return Ok(Resolution::events(vec![GameEvent::message(
                format!("The {} cannot be used.", name),
                Severity::Warning,
            )]));
        };

        if targeting && params.target.is_none() {
            return Ok(Resolution::events(vec![GameEvent::TargetingRequested {
                item,
            }]));
        }

        let merged = defaults.merge(&params);
        let mut ctx = EffectContext {
            entities: &mut self.entities,
            visibility,
            caster: actor,
            item,
        };
        let events = effect.apply(&mut ctx, &merged)?;

        let consumed = events
            .iter()
            .any(|event| matches!(event, GameEvent::ItemConsumed { .. }));
        if consumed {
            if let Some(inventory) = self.entities.get_mut(actor).and_then(|e| e.inventory.as_mut()) {
                inventory.remove_item(item);
            }
        }

        Ok(Resolution::events(events))
    }

    /// Drops `item` at `actor`'s feet.
    pub fn resolve_drop_item(&mut self, actor: EntityId, item: EntityId) -> YargResult<Resolution> {
        let holder = self
            .entities
            .get_mut(actor)
            .ok_or(YargError::MissingEntity(actor))?;
        let position = holder.position;

        let held = holder
            .inventory
            .as_mut()
            .map(|inventory| inventory.remove_item(item))
            .unwrap_or(false);
        if !held {
            return Ok(Resolution::default());
        }

        let dropped = self
            .entities
            .get_mut(item)
            .ok_or(YargError::MissingEntity(item))?;
        dropped.position = position;

        Ok(Resolution::events(vec![
            GameEvent::ItemDropped { item },
            GameEvent::message(format!("You dropped the {}.", dropped.name), Severity::Warning),
        ]))
    }

    /// Applies the chosen stat bonus and closes the level-up screen.
    pub fn resolve_level_up(&mut self, choice: LevelUpChoice) -> YargResult<Resolution> {
        let player = self.player;
        let fighter = self
            .entities
            .get_mut(player)
            .and_then(|e| e.fighter.as_mut())
            .ok_or(YargError::MissingEntity(player))?;

        match choice {
            LevelUpChoice::Constitution => {
                fighter.max_hp += 20;
                fighter.hp += 20;
            }
            LevelUpChoice::Strength => fighter.power += 1,
            LevelUpChoice::Agility => fighter.defense += 1,
        }
        debug!("Level-up bonus applied: {:?}", choice);

        self.states.pop_modal();
        Ok(Resolution::default())
    }

    /// Confirms or cancels target selection for the pending item.
    pub fn resolve_targeting(
        &mut self,
        pointer: PointerAction,
        visibility: &dyn VisibilityMap,
    ) -> YargResult<Resolution> {
        match (pointer, self.targeting_item) {
            (PointerAction::LeftClick(target), Some(item)) => {
                self.resolve_use_item(self.player, item, EffectParams::at(target), visibility)
            }
            _ => Ok(Resolution::events(vec![GameEvent::TargetingCancelled])),
        }
    }

    /// Descends when the player stands on a staircase.
    pub fn resolve_take_stairs(&mut self) -> YargResult<Resolution> {
        let position = self
            .entities
            .get(self.player)
            .ok_or(YargError::MissingEntity(self.player))?
            .position;

        let on_stairs = self
            .entities
            .floor_entities()
            .any(|(_, entity)| entity.stairs.is_some() && entity.position == position);

        if !on_stairs {
            return Ok(Resolution::events(vec![GameEvent::message(
                "There are no stairs here.",
                Severity::Warning,
            )]));
        }

        self.next_floor()?;
        Ok(Resolution {
            events: Vec::new(),
            took_turn: false,
            fov_recompute: true,
        })
    }

    /// The item in `actor`'s inventory slot `index`, if any.
    pub fn inventory_item(&self, actor: EntityId, index: usize) -> Option<EntityId> {
        self.entities
            .get(actor)
            .and_then(|e| e.inventory.as_ref())
            .and_then(|inventory| inventory.items.get(index).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Ai, Color, Fighter};
    use proptest::prelude::*;

    fn fighter_entity(name: &str, fighter: Fighter) -> Entity {
        Entity::new(name, 'x', Color::WHITE, Position::new(0, 0))
            .blocking()
            .with_fighter(fighter)
            .with_ai(Ai::Basic)
    }

    #[test]
    fn test_attack_kills_and_awards_xp() {
        let mut entities = EntityArena::new();
        let a = entities.spawn(fighter_entity("hero", Fighter::new(30, 0, 5, 0)));
        let b = entities.spawn(fighter_entity("Orc", Fighter::new(3, 2, 3, 35)));

        let events = attack(&mut entities, a, b);

        assert_eq!(
            events,
            vec![
                GameEvent::message("Hero attacks Orc for 3 hit points.", Severity::Info),
                GameEvent::Died { entity: b },
                GameEvent::ExperienceGained {
                    recipient: a,
                    amount: 35
                },
            ]
        );
        assert_eq!(entities.get(b).unwrap().fighter.as_ref().unwrap().hp, 0);
    }

    #[test]
    fn test_attack_without_damage() {
        let mut entities = EntityArena::new();
        let a = entities.spawn(fighter_entity("Orc", Fighter::new(10, 0, 1, 0)));
        let b = entities.spawn(fighter_entity("Troll", Fighter::new(16, 4, 4, 0)));

        let events = attack(&mut entities, a, b);
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], GameEvent::Message(m) if m.text.contains("no damage")));
        assert_eq!(entities.get(b).unwrap().fighter.as_ref().unwrap().hp, 16);
    }

    #[test]
    fn test_attack_needs_two_fighters() {
        let mut entities = EntityArena::new();
        let a = entities.spawn(fighter_entity("Orc", Fighter::new(10, 0, 3, 0)));
        let rock = entities.spawn(Entity::new("rock", '*', Color::LIGHT_GREY, Position::new(1, 0)));
        assert!(attack(&mut entities, a, rock).is_empty());
    }

    proptest! {
        #[test]
        fn test_attack_damage_is_power_minus_defense(power in -20i32..60, defense in -20i32..60) {
            let mut entities = EntityArena::new();
            let a = entities.spawn(fighter_entity("Orc", Fighter::new(10, 0, power, 0)));
            let b = entities.spawn(fighter_entity("Troll", Fighter::new(1000, defense, 4, 0)));

            let events = attack(&mut entities, a, b);

            let expected = (power - defense).max(0);
            let hp = entities.get(b).unwrap().fighter.as_ref().unwrap().hp;
            prop_assert_eq!(hp, 1000 - expected);
            prop_assert_eq!(events.len(), 1);
            prop_assert!(!events.iter().any(|e| matches!(e, GameEvent::Died { .. })), "unexpected Died event");
        }
    }

    #[test]
    fn test_damage_below_zero_hp_still_dies_once() {
        let mut entities = EntityArena::new();
        let victim = entities.spawn(fighter_entity("Orc", Fighter::new(5, 0, 3, 10)));
        let source = entities.spawn(fighter_entity("hero", Fighter::new(5, 0, 3, 0)));

        let events = apply_damage(&mut entities, victim, 2, source);
        assert!(events.is_empty());
        let events = apply_damage(&mut entities, victim, 20, source);
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("orc"), "Orc");
        assert_eq!(capitalize(""), "");
    }
}
