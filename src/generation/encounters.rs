//! # Encounter Generation
//!
//! Rolls the enemies of a procedurally laid out room. Enemies spawn on free
//! floor tiles well away from the doors, so a player walking in is never
//! touched on the first tick.

use crate::game::{Catalog, EnemyKind, LevelSnapshot, PlacedRecord};
use crate::generation::{door_positions, free_floor, GenerationConfig, Generator, DOOR_CLEARANCE};
use crate::{ReverieError, ReverieResult};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

/// Smallest and largest encounter a basic room rolls.
pub const ENCOUNTER_SIZE: std::ops::RangeInclusive<usize> = 1..=4;

/// Picks enemy kinds and spawn points for one room layout.
pub struct EncounterGenerator<'a> {
    catalog: &'a Catalog,
    layout: &'a LevelSnapshot,
}

impl<'a> EncounterGenerator<'a> {
    pub fn new(catalog: &'a Catalog, layout: &'a LevelSnapshot) -> Self {
        Self { catalog, layout }
    }

    /// Enemy kinds the catalog has stats for.
    fn roster(&self) -> Vec<EnemyKind> {
        EnemyKind::ALL
            .iter()
            .copied()
            .filter(|kind| self.catalog.enemy(*kind).is_ok())
            .collect()
    }
}

impl Generator<Vec<PlacedRecord>> for EncounterGenerator<'_> {
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> ReverieResult<Vec<PlacedRecord>> {
        let roster = self.roster();
        let doors = door_positions(self.layout, self.catalog);
        let floor = free_floor(self.layout, self.catalog, &doors, DOOR_CLEARANCE);

        let count = rng.gen_range(ENCOUNTER_SIZE).min(floor.len());
        let spawns: Vec<_> = floor.choose_multiple(rng, count).copied().collect();
        let mut enemies = Vec::with_capacity(spawns.len());
        for position in spawns {
            let kind = roster
                .choose(rng)
                .ok_or_else(|| ReverieError::Configuration("catalog has no enemy stats".to_string()))?;
            enemies.push(PlacedRecord::new(kind.as_index(), position, 0));
        }

        self.validate(&enemies, config)?;
        Ok(enemies)
    }

    fn validate(&self, enemies: &Vec<PlacedRecord>, _config: &GenerationConfig) -> ReverieResult<()> {
        if enemies.len() > *ENCOUNTER_SIZE.end() {
            return Err(ReverieError::GenerationFailed(format!(
                "encounter of {} enemies is too large",
                enemies.len()
            )));
        }
        Ok(())
    }

    fn generator_type(&self) -> &'static str {
        "EncounterGenerator"
    }
}
