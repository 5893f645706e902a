//! # Item Effects
//!
//! What happens when an item is used. Each item carries default parameters;
//! the caller may override any of them (a targeted scroll gets its target this
//! way), with call-site values winning.

use crate::game::{
    apply_damage, Ai, EntityArena, EntityId, GameEvent, Position, Severity, VisibilityMap,
};
use crate::{YargError, YargResult};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// The behaviors an item can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemEffect {
    Heal,
    Lightning,
    Fireball,
    Confuse,
}

/// Named effect parameters. Unset fields fall through to the next layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectParams {
    pub amount: Option<i32>,
    pub damage: Option<i32>,
    pub max_range: Option<i32>,
    pub radius: Option<i32>,
    pub turns: Option<u32>,
    pub target: Option<Position>,
}

impl EffectParams {
    /// Parameters aimed at `target`.
    pub fn at(target: Position) -> Self {
        Self {
            target: Some(target),
            ..Self::default()
        }
    }

    /// Layers `overrides` on top of `self`; set fields in `overrides` win.
    ///
    /// # Examples
    ///
    /// ```
    /// use yarg::{EffectParams, Position};
    ///
    /// let defaults = EffectParams { damage: Some(25), radius: Some(3), ..Default::default() };
    /// let call_site = EffectParams { damage: Some(50), ..EffectParams::at(Position::new(4, 4)) };
    /// let merged = defaults.merge(&call_site);
    /// assert_eq!(merged.damage, Some(50));
    /// assert_eq!(merged.radius, Some(3));
    /// assert_eq!(merged.target, Some(Position::new(4, 4)));
    /// ```
    pub fn merge(&self, overrides: &EffectParams) -> EffectParams {
        EffectParams {
            amount: overrides.amount.or(self.amount),
            damage: overrides.damage.or(self.damage),
            max_range: overrides.max_range.or(self.max_range),
            radius: overrides.radius.or(self.radius),
            turns: overrides.turns.or(self.turns),
            target: overrides.target.or(self.target),
        }
    }
}

impl ItemEffect {
    /// Built-in parameters, used when neither the item nor the caller sets one.
    pub fn default_params(self) -> EffectParams {
        match self {
            ItemEffect::Heal => EffectParams {
                amount: Some(40),
                ..EffectParams::default()
            },
            ItemEffect::Lightning => EffectParams {
                damage: Some(40),
                max_range: Some(5),
                ..EffectParams::default()
            },
            ItemEffect::Fireball => EffectParams {
                damage: Some(25),
                radius: Some(3),
                ..EffectParams::default()
            },
            ItemEffect::Confuse => EffectParams {
                turns: Some(10),
                ..EffectParams::default()
            },
        }
    }

    /// Runs the effect for `caster`. A `ItemConsumed` event in the result means
    /// the item was used up.
    pub fn apply(self, ctx: &mut EffectContext<'_>, params: &EffectParams) -> YargResult<Vec<GameEvent>> {
        let params = self.default_params().merge(params);
        match self {
            ItemEffect::Heal => heal(ctx, params.amount.unwrap_or(0)),
            ItemEffect::Lightning => cast_lightning(
                ctx,
                params.damage.unwrap_or(0),
                params.max_range.unwrap_or(0),
            ),
            ItemEffect::Fireball => cast_fireball(
                ctx,
                params.damage.unwrap_or(0),
                params.radius.unwrap_or(0),
                params.target,
            ),
            ItemEffect::Confuse => cast_confuse(ctx, params.turns.unwrap_or(0), params.target),
        }
    }
}

/// Everything an effect may touch while it runs.
pub struct EffectContext<'a> {
    pub entities: &'a mut EntityArena,
    pub visibility: &'a dyn VisibilityMap,
    pub caster: EntityId,
    pub item: EntityId,
}

fn heal(ctx: &mut EffectContext<'_>, amount: i32) -> YargResult<Vec<GameEvent>> {
    let caster = ctx
        .entities
        .get_mut(ctx.caster)
        .ok_or(YargError::MissingEntity(ctx.caster))?;

    let Some(fighter) = caster.fighter.as_mut() else {
        return Ok(vec![GameEvent::message("Nothing happens.", Severity::Warning)]);
    };

    if fighter.hp >= fighter.max_hp {
        return Ok(vec![GameEvent::message(
            "You are already at full health",
            Severity::Warning,
        )]);
    }

    fighter.heal(amount);
    Ok(vec![
        GameEvent::ItemConsumed { item: ctx.item },
        GameEvent::message("Your wounds start to feel better!", Severity::Good),
    ])
}

fn cast_lightning(
    ctx: &mut EffectContext<'_>,
    damage: i32,
    max_range: i32,
) -> YargResult<Vec<GameEvent>> {
    let origin = ctx
        .entities
        .get(ctx.caster)
        .ok_or(YargError::MissingEntity(ctx.caster))?
        .position;

    let target = ctx
        .entities
        .floor_entities()
        .filter(|(id, entity)| {
            *id != ctx.caster && entity.is_fighter() && ctx.visibility.is_visible(entity.position)
        })
        .map(|(id, entity)| (id, entity.distance(origin), entity.name.clone()))
        .filter(|(_, distance, _)| *distance <= max_range as f64)
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));

    let Some((target, _, name)) = target else {
        return Ok(vec![GameEvent::message(
            "No enemy is close enough to strike.",
            Severity::Warning,
        )]);
    };

    let mut events = vec![
        GameEvent::ItemConsumed { item: ctx.item },
        GameEvent::message(
            format!(
                "A lightning bolt strikes the {} with a loud thunder! The damage is {}",
                name, damage
            ),
            Severity::Notice,
        ),
    ];
    events.extend(apply_damage(ctx.entities, target, damage, ctx.caster));
    Ok(events)
}

fn cast_fireball(
    ctx: &mut EffectContext<'_>,
    damage: i32,
    radius: i32,
    target: Option<Position>,
) -> YargResult<Vec<GameEvent>> {
    let Some(target) = target else {
        return Ok(vec![GameEvent::message(
            "The fireball needs a target.",
            Severity::Warning,
        )]);
    };

    if !ctx.visibility.is_visible(target) {
        return Ok(vec![GameEvent::message(
            "You cannot target a tile outside your field of view.",
            Severity::Warning,
        )]);
    }

    let mut events = vec![
        GameEvent::ItemConsumed { item: ctx.item },
        GameEvent::message(
            format!(
                "The fireball explodes, burning everything within {} tiles!",
                radius
            ),
            Severity::Notice,
        ),
    ];

    let burned: Vec<(EntityId, String)> = ctx
        .entities
        .floor_entities()
        .filter(|(_, entity)| entity.is_fighter() && entity.distance(target) <= radius as f64)
        .map(|(id, entity)| (id, entity.name.clone()))
        .collect();

    for (id, name) in burned {
        events.push(GameEvent::message(
            format!("The {} gets burned for {} hit points.", name, damage),
            Severity::Notice,
        ));
        events.extend(apply_damage(ctx.entities, id, damage, ctx.caster));
    }

    Ok(events)
}

fn cast_confuse(
    ctx: &mut EffectContext<'_>,
    turns: u32,
    target: Option<Position>,
) -> YargResult<Vec<GameEvent>> {
    let Some(target) = target else {
        return Ok(vec![GameEvent::message(
            "The scroll needs a target.",
            Severity::Warning,
        )]);
    };

    if !ctx.visibility.is_visible(target) {
        return Ok(vec![GameEvent::message(
            "You cannot target a tile outside your field of view.",
            Severity::Warning,
        )]);
    }

    let victim = ctx
        .entities
        .entities_at(target)
        .into_iter()
        .find(|&id| id != ctx.caster && ctx.entities.get(id).map(|e| e.has_ai()).unwrap_or(false));

    let Some(entity) = victim.and_then(|id| ctx.entities.get_mut(id)) else {
        return Ok(vec![GameEvent::message(
            "There is no targetable enemy at that location.",
            Severity::Warning,
        )]);
    };

    // Re-confusing keeps the original behavior to return to.
    let previous = match entity.ai.take() {
        Some(Ai::Confused { previous, .. }) => previous,
        Some(ai) => Box::new(ai),
        None => Box::new(Ai::Basic),
    };
    entity.ai = Some(Ai::Confused { previous, turns });

    Ok(vec![
        GameEvent::ItemConsumed { item: ctx.item },
        GameEvent::message(
            format!(
                "The eyes of the {} look vacant, as it starts to stumble around!",
                entity.name
            ),
            Severity::Good,
        ),
    ])
}
