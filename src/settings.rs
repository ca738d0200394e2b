//! # Settings
//!
//! Runtime configuration of a session, loadable from a JSON file. Every field
//! has a default, so a file only needs the values it changes.

use crate::config::{AI_TICK_INTERVAL, TARGET_TPS};
use crate::generation::GenerationConfig;
use crate::{ReverieError, ReverieResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Session configuration.
///
/// # Examples
///
/// ```
/// use reverie::GameConfig;
///
/// let config: GameConfig = serde_json::from_str(r#"{ "tick_rate": 30 }"#).unwrap();
/// assert_eq!(config.tick_rate, 30);
/// assert_eq!(config.ai_interval, 10);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub generation: GenerationConfig,
    /// Simulation ticks per second
    pub tick_rate: u32,
    /// Enemy AI runs on every `ai_interval`th tick
    pub ai_interval: u64,
    /// Wander radius as a multiple of enemy speed
    pub wander_radius_scale: f32,
    /// Scatter radius of coins dropped by enemies
    pub loot_nudge_radius: f32,
    /// Push radius between overlapping items
    pub item_nudge_radius: f32,
    /// Directory of hand-made `<archetype>.json` level files
    pub levels_dir: Option<PathBuf>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            generation: GenerationConfig::default(),
            tick_rate: TARGET_TPS,
            ai_interval: AI_TICK_INTERVAL,
            wander_radius_scale: 40.0,
            loot_nudge_radius: 30.0,
            item_nudge_radius: 15.0,
            levels_dir: None,
        }
    }
}

impl GameConfig {
    /// Reads and validates a configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> ReverieResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: GameConfig = serde_json::from_str(&text)?;
        config.validate()?;
        log::info!("Loaded game config from {}", path.as_ref().display());
        Ok(config)
    }

    pub fn validate(&self) -> ReverieResult<()> {
        self.generation.validate()?;
        if self.tick_rate == 0 {
            return Err(ReverieError::Configuration("tick rate must be positive".to_string()));
        }
        if self.ai_interval == 0 {
            return Err(ReverieError::Configuration("AI interval must be positive".to_string()));
        }
        if self.wander_radius_scale < 0.0 || self.loot_nudge_radius < 0.0 || self.item_nudge_radius < 0.0 {
            return Err(ReverieError::Configuration("radii must not be negative".to_string()));
        }
        Ok(())
    }

    /// Seconds per simulation tick.
    pub fn tick_duration(&self) -> f32 {
        1.0 / self.tick_rate.max(1) as f32
    }
}
