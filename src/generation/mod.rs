//! # Generation Module
//!
//! Procedural content generation: the dungeon map and the contents of rooms.
//!
//! The dungeon is grown from a single root room by repeatedly handing a
//! "growth" budget to neighbouring cells ([`GrowthMapGenerator`]). Rooms that
//! have no hand-made level file are laid out procedurally
//! ([`RoomLayoutGenerator`]), populated from the encounter and shop tables.

pub mod encounters;
pub mod items;
pub mod map;
pub mod rooms;

pub use encounters::*;
pub use items::*;
pub use map::*;
pub use rooms::*;

use crate::config::{DEFAULT_INITIAL_GROWTH, MAP_GRID_SIZE};
use crate::{ReverieError, ReverieResult};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

/// Configuration for procedural generation.
///
/// Controls the size of the dungeon map and the seed every random choice is
/// drawn from, so a run can be reproduced exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Random seed for reproducible generation
    pub seed: u64,
    /// Side length of the square map grid
    pub grid_size: usize,
    /// Growth budget planted in the root cell; roughly the number of rooms
    pub initial_growth: u32,
}

impl GenerationConfig {
    /// Creates the standard configuration with the given seed.
    ///
    /// # Examples
    ///
    /// ```
    /// use reverie::GenerationConfig;
    ///
    /// let config = GenerationConfig::new(7);
    /// assert_eq!(config.grid_size, 40);
    /// assert_eq!(config.initial_growth, 15);
    /// assert!(config.validate().is_ok());
    /// ```
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            grid_size: MAP_GRID_SIZE,
            initial_growth: DEFAULT_INITIAL_GROWTH,
        }
    }

    /// Creates a configuration for testing with a smaller map.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            seed,
            grid_size: 16,
            initial_growth: 8,
        }
    }

    /// Checks the configuration can produce a playable map.
    pub fn validate(&self) -> ReverieResult<()> {
        if self.grid_size < 3 {
            return Err(ReverieError::Configuration(format!(
                "map grid must be at least 3 cells wide, got {}",
                self.grid_size
            )));
        }
        if self.initial_growth < 2 {
            return Err(ReverieError::Configuration(format!(
                "initial growth must be at least 2 to leave room for a shop, got {}",
                self.initial_growth
            )));
        }
        Ok(())
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new(42)
    }
}

/// Trait for procedural generators.
///
/// All generation systems implement this trait, giving them a consistent
/// interface for generation, post-checks and logging.
pub trait Generator<T> {
    /// Generates content using the provided configuration and random number generator.
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> ReverieResult<T>;

    /// Validates that the generated content meets requirements.
    fn validate(&self, content: &T, config: &GenerationConfig) -> ReverieResult<()>;

    /// Gets the generator type name for logging and debugging.
    fn generator_type(&self) -> &'static str;
}

/// Utility functions for generation algorithms.
pub mod utils {
    use super::*;
    use rand::SeedableRng;

    /// Creates a seeded random number generator from the config.
    pub fn create_rng(config: &GenerationConfig) -> StdRng {
        StdRng::seed_from_u64(config.seed)
    }

    /// A fresh seed for runs started without one.
    pub fn random_seed() -> u64 {
        rand::random()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_generation_config_defaults() {
        let config = GenerationConfig::default();
        assert_eq!(config.seed, 42);
        assert!(config.validate().is_ok());
        assert!(GenerationConfig::for_testing(1).validate().is_ok());
    }

    #[test]
    fn test_generation_config_rejects_tiny_growth() {
        let config = GenerationConfig {
            initial_growth: 1,
            ..GenerationConfig::default()
        };
        assert!(matches!(config.validate(), Err(ReverieError::Configuration(_))));
    }

    #[test]
    fn test_rng_is_reproducible() {
        let config = GenerationConfig::new(99);
        let a: u64 = utils::create_rng(&config).gen();
        let b: u64 = utils::create_rng(&config).gen();
        assert_eq!(a, b);
    }
}
