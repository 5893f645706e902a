//! # Event Reducer
//!
//! Applies outcome events to the session. Player actions and monster turns
//! feed the same reducer, so death, loot and experience behave identically
//! whoever caused them.

use crate::game::{Color, EntityId, GameEvent, GameSession, Message, RenderOrder, Severity, TurnState};
use log::{debug, info};

const DEFAULT_TARGETING_PROMPT: &str = "Left-click a target tile, or right-click to cancel.";

impl GameSession {
    /// Reduces one batch of events, in order.
    ///
    /// A batch grants at most one level-up; experience from later events in
    /// the same batch is banked towards the next level.
    pub fn process_events(&mut self, events: Vec<GameEvent>) {
        let mut leveled = false;
        for event in events {
            self.process_event(event, &mut leveled);
        }
    }

    fn process_event(&mut self, event: GameEvent, leveled: &mut bool) {
        debug!("Reducing {:?}", event);
        self.statistics.update_from_event(&event, self.player);
        match event {
            GameEvent::Message(message) => self.log.add(message),
            GameEvent::Died { entity } if entity == self.player => self.kill_player(),
            GameEvent::Died { entity } => self.kill_monster(entity),
            GameEvent::ItemAdded { item } => {
                self.entities.lift(item);
                self.end_player_action();
            }
            GameEvent::ItemConsumed { item } => {
                self.entities.despawn(item);
                self.targeting_item = None;
                self.end_player_action();
            }
            GameEvent::ItemDropped { item } => {
                self.entities.place(item);
                self.end_player_action();
            }
            GameEvent::TargetingRequested { item } => self.start_targeting(item),
            GameEvent::TargetingCancelled => {
                if self.states.current() == TurnState::Targeting {
                    self.states.pop_modal();
                }
                self.targeting_item = None;
                self.log.add(Message::new("Targeting cancelled", Severity::Info));
            }
            GameEvent::ExperienceGained { recipient, amount } => {
                self.award_experience(recipient, amount, leveled)
            }
        }
    }

    /// Closes any open menu and hands the turn to the monsters.
    fn end_player_action(&mut self) {
        self.states.close_menus();
        self.states.set_base(TurnState::EnemyTurn);
    }

    fn start_targeting(&mut self, item: EntityId) {
        let prompt = self
            .entities
            .get(item)
            .and_then(|e| e.item.as_ref())
            .and_then(|cap| cap.targeting_message.clone())
            .unwrap_or_else(|| DEFAULT_TARGETING_PROMPT.to_string());

        self.states.close_menus();
        self.states.push_modal(TurnState::Targeting);
        self.targeting_item = Some(item);
        self.log.add(Message::new(prompt, Severity::Notice));
    }

    fn kill_player(&mut self) {
        if let Some(player) = self.entities.get_mut(self.player) {
            player.glyph = '%';
            player.color = Color::DARK_RED;
            player.blocks_movement = false;
            player.render_order = RenderOrder::Corpse;
        }
        self.states.enter_dead();
        self.targeting_item = None;
        info!("Player died on floor {} after {} turns", self.depth, self.turn_number);
        self.log.add(Message::new("You died!", Severity::Danger));
    }

    fn kill_monster(&mut self, entity: EntityId) {
        let Some(monster) = self.entities.get_mut(entity) else {
            return;
        };

        let message = format!("{} is dead!", monster.name);
        monster.name = format!("remains of {}", monster.name);
        monster.glyph = '%';
        monster.color = Color::DARK_RED;
        monster.blocks_movement = false;
        monster.render_order = RenderOrder::Corpse;
        monster.fighter = None;
        monster.ai = None;

        self.log.add(Message::new(message, Severity::Good));
    }

    fn award_experience(&mut self, recipient: EntityId, amount: u32, leveled: &mut bool) {
        let is_player = recipient == self.player;
        let Some(level) = self.entities.get_mut(recipient).and_then(|e| e.level.as_mut()) else {
            return;
        };

        let gained_level = if *leveled {
            level.current_xp += amount;
            false
        } else {
            level.add_xp(amount)
        };
        let new_level = level.current_level;

        if is_player && amount > 0 {
            self.log.add(Message::new(
                format!("You gain {} experience points.", amount),
                Severity::Info,
            ));
        }

        if gained_level {
            *leveled = true;
            self.log.add(Message::new(
                format!(
                    "Your battle skills grow stronger! You reached level {}!",
                    new_level
                ),
                Severity::Good,
            ));
            if !self.states.is_player_dead() {
                self.states.push_modal(TurnState::LevelUp);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::game::{
        Ai, Entity, EntityArena, EntityId, Fighter, GameEvent, GameSession, Position, Severity,
        TileGrid, TurnState,
    };
    use crate::generation::GenerationConfig;

    fn session_with_orc() -> (GameSession, EntityId) {
        let mut grid = TileGrid::new(10, 10);
        grid.carve_h_tunnel(1, 8, 5);
        let mut entities = EntityArena::new();
        let player = entities.spawn(Entity::player(Position::new(2, 5)));
        let orc = entities.spawn(
            Entity::new("Orc", 'o', crate::game::Color::DESATURATED_GREEN, Position::new(3, 5))
                .blocking()
                .with_fighter(Fighter::new(10, 0, 3, 35))
                .with_ai(Ai::Basic),
        );
        let session = GameSession::from_parts(grid, entities, player, GenerationConfig::for_testing(1));
        (session, orc)
    }

    #[test]
    fn test_monster_death_leaves_corpse() {
        let (mut session, orc) = session_with_orc();
        session.process_events(vec![GameEvent::Died { entity: orc }]);

        let corpse = session.entities.get(orc).unwrap();
        assert_eq!(corpse.name, "remains of Orc");
        assert_eq!(corpse.glyph, '%');
        assert!(!corpse.blocks_movement);
        assert!(corpse.fighter.is_none());
        assert!(corpse.ai.is_none());
        assert!(session.entities.is_on_floor(orc));
        assert_eq!(session.log.last().unwrap().text, "Orc is dead!");
    }

    #[test]
    fn test_player_death_is_terminal() {
        let (mut session, _) = session_with_orc();
        session.process_events(vec![GameEvent::Died {
            entity: session.player,
        }]);

        assert_eq!(session.states.current(), TurnState::PlayerDead);
        assert_eq!(session.entities.get(session.player).unwrap().glyph, '%');
        assert_eq!(session.log.last().unwrap().severity, Severity::Danger);

        // Later events cannot revive the turn cycle
        session.states.set_base(TurnState::PlayersTurn);
        assert!(session.states.is_player_dead());
    }

    #[test]
    fn test_single_level_up_per_batch() {
        let (mut session, _) = session_with_orc();
        let player = session.player;
        session.process_events(vec![
            GameEvent::ExperienceGained {
                recipient: player,
                amount: 400,
            },
            GameEvent::ExperienceGained {
                recipient: player,
                amount: 600,
            },
        ]);

        let level = session.entities.get(player).unwrap().level.clone().unwrap();
        assert_eq!(level.current_level, 2);
        assert_eq!(level.current_xp, 650);
        assert_eq!(session.states.current(), TurnState::LevelUp);
        assert_eq!(session.states.depth(), 2);
    }

    #[test]
    fn test_monsters_ignore_experience() {
        let (mut session, orc) = session_with_orc();
        let before = session.log.len();
        session.process_events(vec![GameEvent::ExperienceGained {
            recipient: orc,
            amount: 50,
        }]);
        assert_eq!(session.log.len(), before);
        assert_eq!(session.states.current(), TurnState::PlayersTurn);
    }
}
