//! # Reverie
//!
//! A real-time 2D roguelike shooter. The player walks through a branching
//! dungeon of rooms, shoots at whatever lives there, collects loot and spends it
//! in shops.
//!
//! ## Architecture Overview
//!
//! The crate is split into a headless simulation core and a thin macroquad host:
//!
//! - **Generation**: the growth-based dungeon map and procedural room layouts
//! - **Game**: entity model, enemy AI, collision/combat rules and the
//!   fixed-tick simulation ([`GameState`])
//! - **Utils**: grid pathfinding and small geometry helpers
//! - **Input / Rendering / Scenes**: macroquad glue (keyboard and mouse
//!   polling, draw calls, menus and the top-level state machine)
//!
//! Everything under `game`, `generation` and `utils` runs without a window,
//! which is how the test suite drives it.

pub mod game;
pub mod generation;
pub mod input;
pub mod rendering;
pub mod scenes;
pub mod settings;
pub mod utils;

pub use game::*;
pub use generation::*;
pub use input::*;
pub use rendering::*;
pub use settings::*;
pub use utils::*;

pub use game::{
    // From catalog
    BuffKind,
    Catalog,
    EnemyKind,
    ItemKind,
    MovementType,
    RoomArchetype,
    RoomKind,
    // From entities
    Buff,
    Enemy,
    Item,
    Player,
    Projectile,
    // From sprite
    AnimationState,
    Entity,
    Layer,
    // From state
    GameEvent,
    GameState,
    GameStatistics,
    // From level
    LevelSnapshot,
    LevelSource,
    Room,
};

pub use generation::{GenerationConfig, Generator, GrowthMapGenerator, MapCell, MapGrid};

pub use scenes::{AppState, SceneManager};

/// Core error type for the Reverie engine.
#[derive(thiserror::Error, Debug)]
pub enum ReverieError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Content tables are inconsistent (missing archetype, tile pattern or stat entry)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A level file did not match the level schema
    #[error("Malformed level '{name}': {source}")]
    MalformedLevel {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    /// Game state is invalid
    #[error("Invalid game state: {0}")]
    InvalidState(String),

    /// Generation failed
    #[error("Generation failed: {0}")]
    GenerationFailed(String),
}

/// Result type used throughout the Reverie codebase.
pub type ReverieResult<T> = Result<T, ReverieError>;

/// Version information for the game.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Game configuration constants.
pub mod config {
    /// Width of one background tile in pixels
    pub const TILE_WIDTH: f32 = 50.0;

    /// Height of one background tile in pixels
    pub const TILE_HEIGHT: f32 = 50.0;

    /// Number of tiles along the X axis of a room
    pub const TILES_X: usize = 32;

    /// Number of tiles along the Y axis of a room
    pub const TILES_Y: usize = 20;

    /// Room width in pixels
    pub const SCREEN_WIDTH: f32 = TILE_WIDTH * TILES_X as f32;

    /// Room height in pixels
    pub const SCREEN_HEIGHT: f32 = TILE_HEIGHT * TILES_Y as f32;

    /// Simulation ticks per second
    pub const TARGET_TPS: u32 = 60;

    /// Enemy AI runs once every this many ticks
    pub const AI_TICK_INTERVAL: u64 = 10;

    /// Side length of the square dungeon map grid
    pub const MAP_GRID_SIZE: usize = 40;

    /// Growth budget planted in the root cell
    pub const DEFAULT_INITIAL_GROWTH: u32 = 15;

    /// A door whose center is closer than this to a room edge leads out of the room
    pub const DOOR_EDGE_THRESHOLD: f32 = 50.0;

    /// Player offset applied when leaving through the top door
    pub const TRANSITION_UP: (f32, f32) = (0.0, 855.0);

    /// Player offset applied when leaving through the bottom door
    pub const TRANSITION_DOWN: (f32, f32) = (0.0, -855.0);

    /// Player offset applied when leaving through the left door
    pub const TRANSITION_LEFT: (f32, f32) = (1450.0, 0.0);

    /// Player offset applied when leaving through the right door
    pub const TRANSITION_RIGHT: (f32, f32) = (-1450.0, 0.0);
}
