//! # Item Generation
//!
//! Shop stock and the occasional pickup lying around a basic room.

use crate::config::{SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::game::{Catalog, ItemKind, LevelSnapshot, MarkerRecord, RANDOM_BUFF_INDEX};
use crate::generation::{door_positions, free_floor, GenerationConfig, Generator, DOOR_CLEARANCE};
use crate::{ReverieError, ReverieResult, Vector2};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

/// A row of buff pedestals across the middle of a shop.
///
/// Slots hold the `"random"` index, so the actual buffs are only decided when
/// the room is first built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShopStock {
    pub slots: usize,
    /// Horizontal distance between pedestals
    pub spacing: f32,
}

impl Default for ShopStock {
    fn default() -> Self {
        Self {
            slots: 3,
            spacing: 150.0,
        }
    }
}

impl Generator<Vec<MarkerRecord>> for ShopStock {
    fn generate(&self, config: &GenerationConfig, _rng: &mut StdRng) -> ReverieResult<Vec<MarkerRecord>> {
        let center = Vector2::new(SCREEN_WIDTH / 2.0, SCREEN_HEIGHT / 2.0);
        let first = center.x - self.spacing * (self.slots.saturating_sub(1)) as f32 / 2.0;
        let stock: Vec<MarkerRecord> = (0..self.slots)
            .map(|slot| MarkerRecord::new(RANDOM_BUFF_INDEX, Vector2::new(first + slot as f32 * self.spacing, center.y)))
            .collect();
        self.validate(&stock, config)?;
        Ok(stock)
    }

    fn validate(&self, stock: &Vec<MarkerRecord>, _config: &GenerationConfig) -> ReverieResult<()> {
        let inside = |p: &Vector2| p.x > 0.0 && p.x < SCREEN_WIDTH && p.y > 0.0 && p.y < SCREEN_HEIGHT;
        if stock.iter().any(|record| !inside(&record.position)) {
            return Err(ReverieError::GenerationFailed("shop pedestal outside the room".to_string()));
        }
        Ok(())
    }

    fn generator_type(&self) -> &'static str {
        "ShopStock"
    }
}

/// Places a heart in a basic room with a fixed chance.
pub struct LootScatter<'a> {
    catalog: &'a Catalog,
    layout: &'a LevelSnapshot,
    pub heart_chance: f64,
}

impl<'a> LootScatter<'a> {
    pub fn new(catalog: &'a Catalog, layout: &'a LevelSnapshot) -> Self {
        Self {
            catalog,
            layout,
            heart_chance: 0.2,
        }
    }
}

impl Generator<Vec<MarkerRecord>> for LootScatter<'_> {
    fn generate(&self, _config: &GenerationConfig, rng: &mut StdRng) -> ReverieResult<Vec<MarkerRecord>> {
        if !rng.gen_bool(self.heart_chance.clamp(0.0, 1.0)) {
            return Ok(Vec::new());
        }
        let doors = door_positions(self.layout, self.catalog);
        let floor = free_floor(self.layout, self.catalog, &doors, DOOR_CLEARANCE);
        Ok(floor
            .choose(rng)
            .map(|position| MarkerRecord::new(ItemKind::Heart.as_index(), *position))
            .into_iter()
            .collect())
    }

    fn validate(&self, _items: &Vec<MarkerRecord>, _config: &GenerationConfig) -> ReverieResult<()> {
        Ok(())
    }

    fn generator_type(&self) -> &'static str {
        "LootScatter"
    }
}
