//! # Game State Module
//!
//! The session core: one dungeon map, the room the player stands in, and the
//! fixed-tick update that drives both.
//!
//! [`GameState::tick`] is fully deterministic for a given seed and input
//! sequence and never touches the window, so the whole game can be driven
//! headlessly.

use crate::config::{SCREEN_HEIGHT, SCREEN_WIDTH, TRANSITION_DOWN, TRANSITION_LEFT, TRANSITION_RIGHT, TRANSITION_UP};
use crate::game::{
    Catalog, CombatResolver, DirectoryLevelSource, Direction, EnemyDirector, GameEvent, GameStatistics, GridPosition,
    ItemKind, LevelSource, Player, Room, RoomRequest, ROOT_ARCHETYPE,
};
use crate::generation::{utils::create_rng, Generator, GrowthMapGenerator, MapGrid, ProceduralLevelSource};
use crate::input::InputFrame;
use crate::settings::GameConfig;
use crate::{ReverieError, ReverieResult, Vector2};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use std::rc::Rc;

/// Where the player stands when a run starts.
pub fn spawn_point() -> Vector2 {
    Vector2::new(SCREEN_WIDTH / 2.0, SCREEN_HEIGHT / 2.0)
}

/// How far the player is moved when passing through a door on `side`, so
/// they arrive just inside the opposite door of the next room.
pub fn transition_offset(side: Direction) -> Vector2 {
    let (x, y) = match side {
        Direction::Up => TRANSITION_UP,
        Direction::Down => TRANSITION_DOWN,
        Direction::Left => TRANSITION_LEFT,
        Direction::Right => TRANSITION_RIGHT,
    };
    Vector2::new(x, y)
}

/// A run in progress.
pub struct GameState {
    catalog: Rc<Catalog>,
    pub config: GameConfig,
    pub map: MapGrid,
    /// Map cell of the current room
    pub level_position: GridPosition,
    pub room: Room,
    pub player: Player,
    /// Ticks simulated so far
    pub tick: u64,
    pub statistics: GameStatistics,
    pub game_over: bool,
    rng: StdRng,
    source: Box<dyn LevelSource>,
    fallback: ProceduralLevelSource,
    resolver: CombatResolver,
    director: EnemyDirector,
}

impl GameState {
    /// Starts a run: generates the map and enters its root room.
    pub fn new(config: GameConfig, catalog: Rc<Catalog>, source: Box<dyn LevelSource>) -> ReverieResult<Self> {
        config.validate()?;
        catalog.validate()?;
        let mut rng = create_rng(&config.generation);
        let map = GrowthMapGenerator::new(&catalog).generate(&config.generation, &mut rng)?;
        Self::start(config, catalog, source, map, rng)
    }

    /// Starts a run on an existing map.
    pub fn from_map(
        config: GameConfig,
        catalog: Rc<Catalog>,
        source: Box<dyn LevelSource>,
        map: MapGrid,
    ) -> ReverieResult<Self> {
        config.validate()?;
        let rng = create_rng(&config.generation);
        Self::start(config, catalog, source, map, rng)
    }

    /// Starts a run reading rooms from the configured level directory, or
    /// generating them when none is set.
    pub fn from_config(config: GameConfig, catalog: Rc<Catalog>) -> ReverieResult<Self> {
        let source: Box<dyn LevelSource> = match &config.levels_dir {
            Some(dir) => Box::new(DirectoryLevelSource::new(dir)),
            None => Box::new(ProceduralLevelSource::new(Rc::clone(&catalog), config.generation.clone())),
        };
        Self::new(config, catalog, source)
    }

    fn start(
        config: GameConfig,
        catalog: Rc<Catalog>,
        source: Box<dyn LevelSource>,
        map: MapGrid,
        mut rng: StdRng,
    ) -> ReverieResult<Self> {
        let root = map.root();
        if map.get(root).map_or(true, |cell| cell.is_blank()) {
            return Err(ReverieError::InvalidState("map has no root room".to_string()));
        }

        let fallback = ProceduralLevelSource::new(Rc::clone(&catalog), config.generation.clone());
        let player = Player::new(catalog.player, spawn_point());
        let resolver = CombatResolver::new(config.loot_nudge_radius, config.item_nudge_radius);
        let director = EnemyDirector::new(config.wander_radius_scale);

        let (room, _) = build_room(&map, root, &catalog, source.as_ref(), &fallback, &mut rng)?;
        let mut statistics = GameStatistics::new();
        statistics.rooms_explored = 1;

        let state = Self {
            catalog,
            config,
            map,
            level_position: root,
            room,
            player,
            tick: 0,
            statistics,
            game_over: false,
            rng,
            source,
            fallback,
            resolver,
            director,
        };

        info!(
            "Run started with seed {} from {} levels ({} rooms)",
            state.config.generation.seed,
            state.source.source_name(),
            state.map.rooms().count()
        );
        Ok(state)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Advances the simulation by one tick.
    ///
    /// Order within a tick: collision rules (which may move the player to
    /// another room), enemy AI on every `ai_interval`th tick, player movement
    /// and firing, then timers and animations.
    pub fn tick(&mut self, input: &InputFrame) -> ReverieResult<Vec<GameEvent>> {
        if self.game_over {
            return Ok(Vec::new());
        }

        let mut movement = input.movement;
        let money_value = self.catalog.item(ItemKind::Money)?.value;
        let mut events =
            self.resolver
                .resolve(&mut self.room, &mut self.player, &mut movement, money_value, &mut self.rng);

        let door = events.iter().find_map(|event| match event {
            GameEvent::DoorEntered { direction } => Some(*direction),
            _ => None,
        });

        match door {
            Some(direction) => events.extend(self.change_level(direction)?),
            None => {
                if self.tick % self.config.ai_interval == 0 {
                    self.director.update(&mut self.room, &self.player, &mut self.rng);
                }
                self.player.aim(input.aim);
                self.player.walk(movement);
                if input.firing {
                    if let Some(projectile) = self.player.fire(input.aim, &mut self.rng) {
                        self.room.projectiles.push(projectile);
                        events.push(GameEvent::ShotFired);
                    }
                }
            }
        }

        self.player.update();
        self.room.advance();

        if !self.player.is_alive() {
            info!("Player died after {} ticks", self.tick);
            self.game_over = true;
            events.push(GameEvent::GameOver);
        }

        for event in &events {
            self.statistics.update_from_event(event);
        }
        self.tick += 1;
        self.statistics.ticks_survived = self.tick;
        Ok(events)
    }

    /// Moves the player through the door on `side`.
    ///
    /// The current room is saved into its map cell, the player is shifted by
    /// the transition offset, and the next room is restored from its save or
    /// loaded fresh. A door that leads to no room is ignored.
    pub fn change_level(&mut self, side: Direction) -> ReverieResult<Option<GameEvent>> {
        let destination = self
            .level_position
            .step(side, self.map.size())
            .filter(|position| !self.map.cell(*position).is_blank());
        let Some(destination) = destination else {
            debug!("Door {:?} of {:?} leads nowhere", side, self.level_position);
            return Ok(None);
        };

        let snapshot = self.room.snapshot();
        self.map.cell_mut(self.level_position).saved_state = Some(snapshot);

        let (room, first_visit) = self.load_room(destination)?;
        self.room = room;
        self.level_position = destination;
        self.player.translate(transition_offset(side));

        info!("Entered room {:?} through the {:?} door", destination, side.opposite());
        Ok(Some(GameEvent::RoomEntered {
            position: destination,
            first_visit,
        }))
    }

    fn load_room(&mut self, position: GridPosition) -> ReverieResult<(Room, bool)> {
        build_room(
            &self.map,
            position,
            &self.catalog,
            self.source.as_ref(),
            &self.fallback,
            &mut self.rng,
        )
    }

    /// Whether the current room is the one the run started in.
    pub fn in_start_room(&self) -> bool {
        self.level_position == self.map.root()
    }

    /// Archetype of the current room.
    pub fn room_archetype(&self) -> &str {
        self.map
            .cell(self.level_position)
            .archetype
            .as_deref()
            .unwrap_or(ROOT_ARCHETYPE)
    }
}

/// Builds the room at `position`, preferring its saved state. Returns whether
/// this is the first visit.
///
/// A level file that is missing or malformed is replaced by a generated
/// layout for the same archetype.
fn build_room(
    map: &MapGrid,
    position: GridPosition,
    catalog: &Catalog,
    source: &dyn LevelSource,
    fallback: &ProceduralLevelSource,
    rng: &mut StdRng,
) -> ReverieResult<(Room, bool)> {
    let cell = map
        .get(position)
        .ok_or_else(|| ReverieError::InvalidState(format!("{:?} is outside the map", position)))?;

    if let Some(saved) = &cell.saved_state {
        debug!("Restoring saved room {:?}", position);
        return Ok((Room::from_snapshot(saved, catalog, rng)?, false));
    }

    let name = cell
        .archetype
        .as_deref()
        .ok_or_else(|| ReverieError::InvalidState(format!("no room at {:?}", position)))?;
    let request = RoomRequest {
        archetype: catalog.archetype(name)?,
        position,
        is_start: position == map.root(),
    };

    let snapshot = match source.load_level(&request, rng) {
        Ok(snapshot) => snapshot,
        Err(err @ (ReverieError::MalformedLevel { .. } | ReverieError::Io(_))) => {
            warn!(
                "Could not load level '{}' from {} source ({}); generating one",
                name,
                source.source_name(),
                err
            );
            fallback.load_level(&request, rng)?
        }
        Err(err) => return Err(err),
    };
    Ok((Room::from_snapshot(&snapshot, catalog, rng)?, true))
}
