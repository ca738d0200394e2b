//! # Scene Management System
//!
//! The top-level application state machine and the macroquad loop that runs
//! it:
//!
//! ```text
//! starting -> initialized -> main_menu <-> map_editing
//!                            main_menu <-> game_playing <-> game_over
//!                            (any of the last four) -> quitting
//! ```

use crate::game::{Catalog, GameState};
use crate::generation::{utils::random_seed, Generator, RoomLayoutGenerator};
use crate::input::InputHandler;
use crate::rendering::{describe_event, MacroquadDisplay, Menu, MenuItem};
use crate::settings::GameConfig;
use crate::{DirectoryLevelSource, LevelSnapshot, ReverieError, ReverieResult};
use log::{debug, info, warn};
use macroquad::prelude::*;
use std::rc::Rc;

/// Where the application is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppState {
    Starting,
    Initialized,
    MainMenu,
    MapEditing,
    GamePlaying,
    GameOver,
    Quitting,
}

impl AppState {
    /// Whether moving from `self` to `next` is allowed.
    ///
    /// # Examples
    ///
    /// ```
    /// use reverie::AppState;
    ///
    /// assert!(AppState::MainMenu.can_transition_to(AppState::GamePlaying));
    /// assert!(!AppState::Quitting.can_transition_to(AppState::MainMenu));
    /// ```
    pub fn can_transition_to(self, next: AppState) -> bool {
        use AppState::*;
        matches!(
            (self, next),
            (Starting, Initialized)
                | (Initialized, MainMenu)
                | (MainMenu, MapEditing | GamePlaying | Quitting)
                | (MapEditing, MainMenu | Quitting)
                | (GamePlaying, MainMenu | GameOver | Quitting)
                | (GameOver, GamePlaying | MainMenu | Quitting)
        )
    }
}

/// Guards [`AppState`] changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppStateMachine {
    state: AppState,
}

impl Default for AppStateMachine {
    fn default() -> Self {
        Self {
            state: AppState::Starting,
        }
    }
}

impl AppStateMachine {
    pub fn state(&self) -> AppState {
        self.state
    }

    /// Moves to `next`, failing on a transition the state graph does not have.
    pub fn transition(&mut self, next: AppState) -> ReverieResult<()> {
        if !self.state.can_transition_to(next) {
            return Err(ReverieError::InvalidState(format!(
                "cannot go from {:?} to {:?}",
                self.state, next
            )));
        }
        debug!("App state {:?} -> {:?}", self.state, next);
        self.state = next;
        Ok(())
    }
}

/// Converts frame time into a whole number of simulation ticks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedStep {
    tick_duration: f32,
    accumulator: f32,
    /// Upper bound on ticks per frame so a stall does not snowball
    pub max_ticks_per_frame: usize,
}

impl FixedStep {
    pub fn new(tick_duration: f32) -> Self {
        Self {
            tick_duration,
            accumulator: 0.0,
            max_ticks_per_frame: 5,
        }
    }

    /// Adds `frame_time` seconds and returns how many ticks are due.
    pub fn advance(&mut self, frame_time: f32) -> usize {
        if self.tick_duration <= 0.0 {
            return 0;
        }
        self.accumulator += frame_time.max(0.0);
        let due = (self.accumulator / self.tick_duration) as usize;
        self.accumulator -= due as f32 * self.tick_duration;
        if due > self.max_ticks_per_frame {
            self.accumulator = 0.0;
            return self.max_ticks_per_frame;
        }
        due
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}

/// The main scene manager that coordinates all game scenes
pub struct SceneManager {
    machine: AppStateMachine,
    config: GameConfig,
    catalog: Rc<Catalog>,
    game_state: Option<GameState>,
    display: MacroquadDisplay,
    input_handler: InputHandler,
    main_menu: Menu,
    game_over_menu: Menu,
    step: FixedStep,
    /// Archetype index and layout shown by the map maker
    preview: Option<(usize, LevelSnapshot)>,
    first_run: bool,
}

impl SceneManager {
    pub fn new(config: GameConfig, catalog: Rc<Catalog>, input_handler: InputHandler) -> Self {
        let step = FixedStep::new(config.tick_duration());
        Self {
            machine: AppStateMachine::default(),
            config,
            catalog,
            game_state: None,
            display: MacroquadDisplay::new(),
            input_handler,
            main_menu: Menu::main_menu(),
            game_over_menu: Menu::game_over(),
            step,
            preview: None,
            first_run: true,
        }
    }

    pub fn state(&self) -> AppState {
        self.machine.state()
    }

    /// Runs the main scene loop until the game exits
    pub async fn run(&mut self) -> ReverieResult<()> {
        loop {
            match self.machine.state() {
                AppState::Starting => self.machine.transition(AppState::Initialized)?,
                AppState::Initialized => {
                    info!("Reverie v{} ready", crate::VERSION);
                    self.machine.transition(AppState::MainMenu)?;
                }
                AppState::MainMenu => self.update_main_menu()?,
                AppState::MapEditing => self.update_map_editing()?,
                AppState::GamePlaying => self.update_playing(get_frame_time())?,
                AppState::GameOver => self.update_game_over()?,
                AppState::Quitting => break,
            }
            next_frame().await;
        }
        info!("Shutting down");
        Ok(())
    }

    fn update_main_menu(&mut self) -> ReverieResult<()> {
        self.main_menu.render(Some("WASD to move, mouse to shoot, Tab for the map"));
        let choice = self
            .input_handler
            .menu_command()
            .and_then(|command| self.main_menu.apply(command));
        match choice {
            Some(MenuItem::Start) => self.start_run()?,
            Some(MenuItem::MapMaker) => {
                self.preview = None;
                self.machine.transition(AppState::MapEditing)?;
            }
            Some(MenuItem::Quit) => self.machine.transition(AppState::Quitting)?,
            _ => {}
        }
        Ok(())
    }

    /// Read-only preview of each room archetype. Left/right cycle, Escape
    /// goes back.
    fn update_map_editing(&mut self) -> ReverieResult<()> {
        let count = self.catalog.rooms.len();
        if count == 0 || is_key_pressed(KeyCode::Escape) {
            return self.machine.transition(AppState::MainMenu);
        }

        let mut index = self.preview.as_ref().map_or(0, |(index, _)| *index);
        if is_key_pressed(KeyCode::Right) {
            index = (index + 1) % count;
        } else if is_key_pressed(KeyCode::Left) {
            index = (index + count - 1) % count;
        }
        if self.preview.as_ref().map(|(shown, _)| *shown) != Some(index) {
            self.preview = Some((index, self.preview_layout(index)?));
        }

        if let Some((_, snapshot)) = &self.preview {
            self.display.render_preview(snapshot, &self.catalog);
        }
        draw_text(&self.catalog.rooms[index].name, 20.0, screen_height() - 20.0, 28.0, WHITE);
        Ok(())
    }

    fn preview_layout(&self, index: usize) -> ReverieResult<LevelSnapshot> {
        let archetype = &self.catalog.rooms[index];
        if let Some(dir) = &self.config.levels_dir {
            let path = DirectoryLevelSource::new(dir).path_for(&archetype.name);
            match std::fs::read_to_string(&path) {
                Ok(text) => match LevelSnapshot::from_json(&archetype.name, &text) {
                    Ok(snapshot) => return Ok(snapshot),
                    Err(err) => warn!("{}", err),
                },
                Err(err) => debug!("No level file at {}: {}", path.display(), err),
            }
        }
        let mut rng = crate::generation::utils::create_rng(&self.config.generation);
        RoomLayoutGenerator::new(&self.catalog, archetype, false).generate(&self.config.generation, &mut rng)
    }

    fn start_run(&mut self) -> ReverieResult<()> {
        let mut config = self.config.clone();
        if !self.first_run {
            config.generation.seed = random_seed();
        }
        self.first_run = false;
        info!("Starting run with seed {}", config.generation.seed);

        self.game_state = Some(GameState::from_config(config, Rc::clone(&self.catalog))?);
        self.step.reset();
        self.display.messages.clear();
        self.machine.transition(AppState::GamePlaying)
    }

    fn update_playing(&mut self, frame_time: f32) -> ReverieResult<()> {
        let frame = self.input_handler.poll(self.display.scale);
        if frame.pause {
            self.game_state = None;
            return self.machine.transition(AppState::MainMenu);
        }

        let Some(game_state) = self.game_state.as_mut() else {
            return self.machine.transition(AppState::MainMenu);
        };

        for _ in 0..self.step.advance(frame_time) {
            let events = game_state.tick(&frame)?;
            for message in events.iter().filter_map(describe_event) {
                self.display.add_message(message);
            }
            if game_state.game_over {
                break;
            }
        }

        self.display.render_game(game_state, frame.show_map);
        if game_state.game_over {
            info!("Run over: {:?}", game_state.statistics);
            self.machine.transition(AppState::GameOver)?;
        }
        Ok(())
    }

    fn update_game_over(&mut self) -> ReverieResult<()> {
        let summary = self.game_state.as_ref().map(|state| {
            format!(
                "Rooms explored: {}   Enemies defeated: {}   Fragments earned: {}",
                state.statistics.rooms_explored, state.statistics.enemies_defeated, state.statistics.money_earned
            )
        });
        self.game_over_menu.render(summary.as_deref());

        let choice = self
            .input_handler
            .menu_command()
            .and_then(|command| self.game_over_menu.apply(command));
        match choice {
            Some(MenuItem::NewRun) => self.start_run()?,
            Some(MenuItem::MainMenu) => {
                self.game_state = None;
                self.machine.transition(AppState::MainMenu)?;
            }
            Some(MenuItem::Quit) => self.machine.transition(AppState::Quitting)?,
            _ => {}
        }
        Ok(())
    }
}
