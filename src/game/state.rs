//! # Game State Module
//!
//! The session that ties the simulation together: tile grid, entity arena,
//! message log and the turn state machine.
//!
//! The turn state machine is a stack. Its bottom entry is the base state
//! (player's turn, enemy turn, or dead); modal screens such as the inventory
//! or target selection are pushed on top and popped on exit, so leaving a
//! menu always returns to whatever was underneath.

use crate::game::{
    ai, Direction, Entity, EntityArena, EntityId, GameEvent, Message, MessageLog, Position,
    Resolution, Severity, TileGrid, VisibilityMap,
};
use crate::generation::{DungeonGenerator, GenerationConfig};
use crate::input::{Intent, PointerAction};
use crate::{YargError, YargResult};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Whose turn it is, or which screen is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnState {
    PlayersTurn,
    EnemyTurn,
    /// Terminal; only menus remain available
    PlayerDead,
    ShowInventory,
    DropInventory,
    Targeting,
    LevelUp,
    CharacterScreen,
}

impl TurnState {
    /// Whether this state is an overlay rather than a base state.
    pub fn is_modal(self) -> bool {
        !matches!(
            self,
            TurnState::PlayersTurn | TurnState::EnemyTurn | TurnState::PlayerDead
        )
    }

    /// Whether this is a menu closed by completing a player action.
    fn is_menu(self) -> bool {
        matches!(
            self,
            TurnState::ShowInventory
                | TurnState::DropInventory
                | TurnState::Targeting
                | TurnState::CharacterScreen
        )
    }
}

/// Base state plus a stack of modal overlays.
///
/// # Examples
///
/// ```
/// use yarg::{StateStack, TurnState};
///
/// let mut states = StateStack::new();
/// states.push_modal(TurnState::ShowInventory);
/// assert_eq!(states.previous(), Some(TurnState::PlayersTurn));
/// states.pop_modal();
/// assert_eq!(states.current(), TurnState::PlayersTurn);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateStack {
    stack: Vec<TurnState>,
}

impl Default for StateStack {
    fn default() -> Self {
        Self::new()
    }
}

impl StateStack {
    pub fn new() -> Self {
        Self {
            stack: vec![TurnState::PlayersTurn],
        }
    }

    /// The state that receives input.
    pub fn current(&self) -> TurnState {
        self.stack
            .last()
            .copied()
            .unwrap_or(TurnState::PlayersTurn)
    }

    /// The state underneath the current overlay.
    pub fn previous(&self) -> Option<TurnState> {
        let len = self.stack.len();
        (len >= 2).then(|| self.stack[len - 2])
    }

    pub fn base(&self) -> TurnState {
        self.stack.first().copied().unwrap_or(TurnState::PlayersTurn)
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn push_modal(&mut self, state: TurnState) {
        debug_assert!(state.is_modal(), "{:?} is not a modal state", state);
        debug!("Entering {:?} over {:?}", state, self.current());
        self.stack.push(state);
    }

    /// Leaves the current overlay. The base state is never popped.
    pub fn pop_modal(&mut self) -> Option<TurnState> {
        if self.stack.len() > 1 {
            self.stack.pop()
        } else {
            None
        }
    }

    /// Replaces the base state, keeping overlays. A dead player stays dead.
    pub fn set_base(&mut self, state: TurnState) {
        match self.stack.first_mut() {
            Some(base) if *base != TurnState::PlayerDead => *base = state,
            Some(_) => {}
            None => self.stack.push(state),
        }
    }

    /// Pops menu overlays from the top of the stack.
    pub fn close_menus(&mut self) {
        while self.stack.len() > 1 && self.current().is_menu() {
            self.stack.pop();
        }
    }

    /// Drops every overlay and makes death the base state.
    pub fn enter_dead(&mut self) {
        self.stack.clear();
        self.stack.push(TurnState::PlayerDead);
    }

    pub fn is_player_dead(&self) -> bool {
        self.base() == TurnState::PlayerDead
    }
}

/// Running totals for the end-of-game summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStatistics {
    /// Monsters killed by anyone
    pub enemies_defeated: u32,
    /// Items picked up by the player
    pub items_collected: u32,
    /// Items used up
    pub items_used: u32,
    /// Experience earned by the player
    pub experience_gained: u64,
    /// Deepest floor reached
    pub max_depth_reached: u32,
}

impl GameStatistics {
    pub fn new() -> Self {
        Self {
            max_depth_reached: 1,
            ..Self::default()
        }
    }

    /// Updates statistics based on a game event.
    pub fn update_from_event(&mut self, event: &GameEvent, player: EntityId) {
        match event {
            GameEvent::Died { entity } if *entity != player => self.enemies_defeated += 1,
            GameEvent::ItemAdded { .. } => self.items_collected += 1,
            GameEvent::ItemConsumed { .. } => self.items_used += 1,
            GameEvent::ExperienceGained { recipient, amount } if *recipient == player => {
                self.experience_gained += u64::from(*amount);
            }
            _ => {}
        }
    }
}

/// What a front end should do after an intent was handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TurnOutcome {
    /// The player moved or changed floors
    pub fov_recompute: bool,
    /// The player asked to leave the game
    pub exit: bool,
    pub fullscreen: bool,
}

/// Numbers shown on the character screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharacterSheet {
    pub level: u32,
    pub experience: u32,
    pub experience_to_level: u32,
    pub max_hp: i32,
    pub power: i32,
    pub defense: i32,
}

/// One running game.
#[derive(Debug, Clone)]
pub struct GameSession {
    /// Current floor
    pub grid: TileGrid,
    /// Every entity, on the floor or carried
    pub entities: EntityArena,
    pub player: EntityId,
    pub log: MessageLog,
    pub states: StateStack,
    /// Item waiting for a target while in [`TurnState::Targeting`]
    pub targeting_item: Option<EntityId>,
    /// Current floor number, starting at 1
    pub depth: u32,
    /// Completed enemy turns
    pub turn_number: u64,
    pub statistics: GameStatistics,
    pub config: GenerationConfig,
    rng: StdRng,
}

impl GameSession {
    /// Starts a new game on a freshly generated first floor.
    ///
    /// # Examples
    ///
    /// ```
    /// use yarg::{GameSession, GenerationConfig, TurnState};
    ///
    /// let session = GameSession::new(GenerationConfig::new(42)).unwrap();
    /// assert_eq!(session.depth, 1);
    /// assert_eq!(session.states.current(), TurnState::PlayersTurn);
    /// assert!(!session.grid.is_blocked(session.player_position()));
    /// ```
    pub fn new(config: GenerationConfig) -> YargResult<Self> {
        config.validate()?;

        let mut entities = EntityArena::new();
        let player = entities.spawn(Entity::player(Position::new(0, 0)));
        let mut session = Self::from_parts(
            TileGrid::new(config.map_width, config.map_height),
            entities,
            player,
            config,
        );

        DungeonGenerator::new().make_map(
            &session.config,
            &mut session.rng,
            &mut session.grid,
            &mut session.entities,
            session.player,
            session.depth,
        )?;

        session.log.add(Message::new(
            "Welcome, adventurer! Prepare to perish in the Tombs of the Ancient Kings.",
            Severity::Info,
        ));
        info!("New game started with seed {}", session.config.seed);
        Ok(session)
    }

    /// Assembles a session around an existing floor, in the player's turn.
    pub fn from_parts(
        grid: TileGrid,
        entities: EntityArena,
        player: EntityId,
        config: GenerationConfig,
    ) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self {
            grid,
            entities,
            player,
            log: MessageLog::new(),
            states: StateStack::new(),
            targeting_item: None,
            depth: 1,
            turn_number: 0,
            statistics: GameStatistics::new(),
            config,
            rng,
        }
    }

    pub fn player_entity(&self) -> Option<&Entity> {
        self.entities.get(self.player)
    }

    pub fn player_position(&self) -> Position {
        self.player_entity()
            .map(|player| player.position)
            .unwrap_or(Position::new(0, 0))
    }

    /// Feeds one decoded intent into the state machine.
    ///
    /// Intents that make no sense in the current state are ignored. When the
    /// player's action ends their turn, every monster acts before this
    /// returns.
    pub fn handle_intent(
        &mut self,
        intent: Intent,
        visibility: &dyn VisibilityMap,
    ) -> YargResult<TurnOutcome> {
        let mut outcome = TurnOutcome::default();
        let state = self.states.current();

        let resolution = match (state, intent) {
            (_, Intent::FullscreenToggle) => {
                outcome.fullscreen = true;
                return Ok(outcome);
            }
            (TurnState::PlayersTurn, Intent::Move { dx, dy }) => {
                // One tile per turn; a zero step is a wait
                match Direction::from_delta(Position::new(dx.signum(), dy.signum())) {
                    Some(direction) => self.resolve_move(self.player, direction.to_delta())?,
                    None => self.resolve_wait(),
                }
            }
            (TurnState::PlayersTurn, Intent::Wait) => self.resolve_wait(),
            (TurnState::PlayersTurn, Intent::Pickup) => self.resolve_pickup(self.player)?,
            (TurnState::PlayersTurn, Intent::TakeStairsDown) => self.resolve_take_stairs()?,
            (TurnState::PlayersTurn | TurnState::PlayerDead, Intent::ShowInventory) => {
                self.states.push_modal(TurnState::ShowInventory);
                Resolution::default()
            }
            (TurnState::PlayersTurn | TurnState::PlayerDead, Intent::DropInventory) => {
                self.states.push_modal(TurnState::DropInventory);
                Resolution::default()
            }
            (TurnState::PlayersTurn | TurnState::PlayerDead, Intent::ShowCharacterScreen) => {
                self.states.push_modal(TurnState::CharacterScreen);
                Resolution::default()
            }
            (TurnState::ShowInventory | TurnState::DropInventory, Intent::InventoryIndex(index)) => {
                self.resolve_inventory_choice(state, index, visibility)?
            }
            (TurnState::LevelUp, Intent::LevelUp(choice)) => self.resolve_level_up(choice)?,
            (TurnState::Targeting, Intent::Exit) => {
                Resolution::events(vec![GameEvent::TargetingCancelled])
            }
            (
                TurnState::ShowInventory | TurnState::DropInventory | TurnState::CharacterScreen,
                Intent::Exit,
            ) => {
                self.states.pop_modal();
                Resolution::default()
            }
            (TurnState::PlayersTurn | TurnState::PlayerDead, Intent::Exit) => {
                outcome.exit = true;
                return Ok(outcome);
            }
            (state, intent) => {
                debug!("Ignoring {:?} while in {:?}", intent, state);
                Resolution::default()
            }
        };

        self.finish_player_action(resolution, visibility, outcome)
    }

    /// Feeds one pointer action into the state machine.
    ///
    /// Only target selection listens to the pointer.
    pub fn handle_pointer(
        &mut self,
        pointer: PointerAction,
        visibility: &dyn VisibilityMap,
    ) -> YargResult<TurnOutcome> {
        if self.states.current() != TurnState::Targeting {
            debug!("Ignoring {:?} while in {:?}", pointer, self.states.current());
            return Ok(TurnOutcome::default());
        }

        let resolution = self.resolve_targeting(pointer, visibility)?;
        self.finish_player_action(resolution, visibility, TurnOutcome::default())
    }

    fn resolve_inventory_choice(
        &mut self,
        state: TurnState,
        index: usize,
        visibility: &dyn VisibilityMap,
    ) -> YargResult<Resolution> {
        if self.states.previous() == Some(TurnState::PlayerDead) {
            return Ok(Resolution::default());
        }
        let Some(item) = self.inventory_item(self.player, index) else {
            return Ok(Resolution::default());
        };

        match state {
            TurnState::ShowInventory => {
                self.resolve_use_item(self.player, item, Default::default(), visibility)
            }
            TurnState::DropInventory => self.resolve_drop_item(self.player, item),
            _ => Ok(Resolution::default()),
        }
    }

    fn finish_player_action(
        &mut self,
        resolution: Resolution,
        visibility: &dyn VisibilityMap,
        mut outcome: TurnOutcome,
    ) -> YargResult<TurnOutcome> {
        outcome.fov_recompute = resolution.fov_recompute;
        if resolution.took_turn {
            self.states.set_base(TurnState::EnemyTurn);
        }

        self.process_events(resolution.events);

        if self.states.current() == TurnState::EnemyTurn {
            self.run_enemy_turn(visibility);
        }
        Ok(outcome)
    }

    /// Lets every monster on the floor act once, in floor order.
    ///
    /// Stops as soon as the player dies; otherwise hands the turn back.
    pub fn run_enemy_turn(&mut self, visibility: &dyn VisibilityMap) {
        let actors: Vec<EntityId> = self
            .entities
            .floor_entities()
            .filter(|(id, entity)| *id != self.player && entity.has_ai())
            .map(|(id, _)| id)
            .collect();

        for monster in actors {
            // Killed or despawned earlier this turn
            if !self.entities.get(monster).map(Entity::has_ai).unwrap_or(false) {
                continue;
            }

            let events = ai::take_turn(
                monster,
                self.player,
                &self.grid,
                &mut self.entities,
                visibility,
                &mut self.rng,
            );
            self.process_events(events);

            if self.states.is_player_dead() {
                return;
            }
        }

        self.turn_number += 1;
        self.states.set_base(TurnState::PlayersTurn);
    }

    /// Replaces the floor with a newly generated, deeper one.
    ///
    /// Everything on the old floor except the player is discarded; carried
    /// items come along. The player recovers half their maximum hit points.
    /// If generation fails the session is left exactly as it was.
    pub fn next_floor(&mut self) -> YargResult<()> {
        self.config.validate()?;

        // Build the new floor aside; the current one stays intact on failure
        let mut entities = self.entities.clone();
        let left_behind: Vec<EntityId> = entities
            .floor_ids()
            .iter()
            .copied()
            .filter(|&id| id != self.player)
            .collect();
        for id in left_behind {
            entities.despawn(id);
        }

        let depth = self.depth + 1;
        let mut grid = TileGrid::new(self.config.map_width, self.config.map_height);
        DungeonGenerator::new().make_map(
            &self.config,
            &mut self.rng,
            &mut grid,
            &mut entities,
            self.player,
            depth,
        )?;

        self.grid = grid;
        self.entities = entities;
        self.depth = depth;
        self.statistics.max_depth_reached = self.statistics.max_depth_reached.max(depth);

        if let Some(fighter) = self
            .entities
            .get_mut(self.player)
            .and_then(|e| e.fighter.as_mut())
        {
            let amount = fighter.max_hp / 2;
            fighter.heal(amount);
        }

        info!("Descended to floor {}", self.depth);
        self.log.add(Message::new(
            "You take a moment to rest, and recover your strength.",
            Severity::Good,
        ));
        Ok(())
    }

    /// Names of the player's carried items, in slot order.
    pub fn inventory_names(&self) -> Vec<String> {
        self.player_entity()
            .and_then(|player| player.inventory.as_ref())
            .map(|inventory| {
                inventory
                    .items
                    .iter()
                    .filter_map(|&id| self.entities.get(id).map(|item| item.name.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn character_sheet(&self) -> Option<CharacterSheet> {
        let player = self.player_entity()?;
        let level = player.level.as_ref()?;
        let fighter = player.fighter.as_ref()?;
        Some(CharacterSheet {
            level: level.current_level,
            experience: level.current_xp,
            experience_to_level: level.experience_to_next_level(),
            max_hp: fighter.max_hp,
            power: fighter.power,
            defense: fighter.defense,
        })
    }

    /// Captures everything needed to resume this game.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            grid: self.grid.clone(),
            entities: self.entities.clone(),
            player: self.player,
            log: self.log.clone(),
            states: self.states.clone(),
            targeting_item: self.targeting_item,
            depth: self.depth,
            turn_number: self.turn_number,
            statistics: self.statistics.clone(),
            config: self.config.clone(),
        }
    }

    /// Resumes a game from a snapshot.
    ///
    /// The random stream is reseeded from the seed and progress counters, so a
    /// restored game is deterministic but does not replay the original stream.
    pub fn from_snapshot(snapshot: Snapshot) -> YargResult<Self> {
        snapshot.config.validate()?;
        if snapshot.entities.get(snapshot.player).is_none() {
            return Err(YargError::InvalidState(format!(
                "Snapshot player {} does not exist",
                snapshot.player
            )));
        }

        let seed = snapshot.config.seed
            ^ snapshot.turn_number.rotate_left(32)
            ^ u64::from(snapshot.depth);
        Ok(Self {
            grid: snapshot.grid,
            entities: snapshot.entities,
            player: snapshot.player,
            log: snapshot.log,
            states: snapshot.states,
            targeting_item: snapshot.targeting_item,
            depth: snapshot.depth,
            turn_number: snapshot.turn_number,
            statistics: snapshot.statistics,
            config: snapshot.config,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    /// Saves the game to JSON.
    pub fn save_to_json(&self) -> YargResult<String> {
        serde_json::to_string_pretty(&self.snapshot()).map_err(YargError::from)
    }

    /// Loads a game from JSON.
    pub fn load_from_json(json: &str) -> YargResult<Self> {
        let snapshot: Snapshot = serde_json::from_str(json)?;
        Self::from_snapshot(snapshot)
    }

    pub fn save_to_file(&self, path: &Path) -> YargResult<()> {
        std::fs::write(path, self.save_to_json()?)?;
        info!("Game saved to {}", path.display());
        Ok(())
    }

    /// Loads a game saved with [`GameSession::save_to_file`].
    ///
    /// A missing file is reported as [`YargError::SaveNotFound`].
    pub fn load_from_file(path: &Path) -> YargResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                YargError::SaveNotFound(path.to_path_buf())
            } else {
                YargError::Io(err)
            }
        })?;
        let session = Self::load_from_json(&json)?;
        info!("Game loaded from {}", path.display());
        Ok(session)
    }
}

/// Serializable image of a [`GameSession`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub grid: TileGrid,
    pub entities: EntityArena,
    pub player: EntityId,
    pub log: MessageLog,
    pub states: StateStack,
    pub targeting_item: Option<EntityId>,
    pub depth: u32,
    pub turn_number: u64,
    pub statistics: GameStatistics,
    pub config: GenerationConfig,
}
