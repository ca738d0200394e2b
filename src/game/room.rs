//! # Room
//!
//! The live registry of everything in the current room, one collection per
//! layer, plus conversion to and from [`LevelSnapshot`].

use crate::game::{
    Buff, BuffKind, Catalog, Debris, Decoration, Enemy, EnemyKind, Entity, Item, ItemKind, Layer,
    LevelSnapshot, Lifecycle, MarkerRecord, Obstacle, PlacedRecord, Projectile, TileRecord, TileRole,
    RANDOM_BUFF_INDEX,
};
use crate::utils::{build_grid, WalkabilityGrid};
use crate::{Rect, ReverieResult};
use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// All entities of the room the player is in.
#[derive(Debug, Clone)]
pub struct Room {
    pub tiles: Vec<Vec<TileRecord>>,
    pub grid: WalkabilityGrid,
    pub walls: Vec<Obstacle>,
    pub doors: Vec<Obstacle>,
    pub shrubs: Vec<Decoration>,
    pub traps: Vec<Decoration>,
    pub debris: Vec<Debris>,
    pub enemies: Vec<Enemy>,
    pub projectiles: Vec<Projectile>,
    pub items: Vec<Item>,
    pub buffs: Vec<Buff>,
}

impl Room {
    /// Instantiates every entity a snapshot describes.
    ///
    /// Fails with a configuration error when the snapshot names content the
    /// catalog does not know.
    pub fn from_snapshot(snapshot: &LevelSnapshot, catalog: &Catalog, rng: &mut StdRng) -> ReverieResult<Self> {
        let grid = build_grid(&snapshot.background, catalog)?;
        let mut walls = Vec::new();
        let mut doors = Vec::new();

        for (row, tiles) in snapshot.background.iter().enumerate() {
            for (col, tile) in tiles.iter().enumerate() {
                let center = LevelSnapshot::tile_center(row, col);
                match catalog.tile(&tile.index)?.role {
                    TileRole::Floor => {}
                    TileRole::Wall => walls.push(Obstacle::new(Layer::Wall, &tile.index, center, tile.orientation)),
                    TileRole::Door => doors.push(Obstacle::new(Layer::Door, &tile.index, center, tile.orientation)),
                }
            }
        }

        let mut shrubs = Vec::new();
        let mut debris = Vec::new();
        for record in &snapshot.shrubs {
            match catalog.debris(&record.index) {
                Some(spec) => debris.push(Debris::new(&record.index, &spec.remains, record.position)),
                None => shrubs.push(Decoration::new(
                    Layer::Shrub,
                    &record.index,
                    record.position,
                    record.orientation,
                )),
            }
        }

        let traps = snapshot
            .traps
            .iter()
            .map(|record| Decoration::new(Layer::Trap, &record.index, record.position, record.orientation))
            .collect();

        let enemies = snapshot
            .enemies
            .iter()
            .map(|record| -> ReverieResult<Enemy> {
                let kind: EnemyKind = record.index.parse()?;
                let mut enemy = Enemy::new(kind, catalog.enemy(kind)?, record.position);
                enemy.sprite.orientation = record.orientation;
                Ok(enemy)
            })
            .collect::<ReverieResult<Vec<_>>>()?;

        let buffs = snapshot
            .buffs
            .iter()
            .map(|record| -> ReverieResult<Buff> {
                let kind = resolve_buff(&record.index, catalog, rng)?;
                Ok(Buff::new(kind, catalog.buff(kind)?.cost, record.position))
            })
            .collect::<ReverieResult<Vec<_>>>()?;

        let items = snapshot
            .items
            .iter()
            .map(|record| -> ReverieResult<Item> {
                let kind: ItemKind = record.index.parse()?;
                Ok(Item::new(kind, catalog.item(kind)?.value, record.position))
            })
            .collect::<ReverieResult<Vec<_>>>()?;

        debug!(
            "Room built: {} walls, {} doors, {} enemies, {} buffs, {} items",
            walls.len(),
            doors.len(),
            enemies.len(),
            buffs.len(),
            items.len()
        );

        Ok(Self {
            tiles: snapshot.background.clone(),
            grid,
            walls,
            doors,
            shrubs,
            traps,
            debris,
            enemies,
            projectiles: Vec::new(),
            items,
            buffs,
        })
    }

    /// Captures the room for later restoration. Projectiles and dying enemies
    /// are not kept; broken debris is saved as its remains.
    pub fn snapshot(&self) -> LevelSnapshot {
        fn placed(entity: &dyn Entity, index: &str) -> PlacedRecord {
            PlacedRecord::new(index, entity.position(), entity.sprite().orientation)
        }

        let shrubs = self
            .shrubs
            .iter()
            .map(|shrub| placed(shrub, &shrub.sprite.index))
            .chain(self.debris.iter().map(|debris| placed(debris, debris.saved_index())))
            .collect();

        LevelSnapshot {
            background: self.tiles.clone(),
            shrubs,
            enemies: self
                .active_enemies()
                .map(|enemy| placed(enemy, enemy.kind.as_index()))
                .collect(),
            traps: self.traps.iter().map(|trap| placed(trap, &trap.sprite.index)).collect(),
            buffs: self
                .buffs
                .iter()
                .map(|buff| MarkerRecord::new(buff.kind.as_index(), buff.position()))
                .collect(),
            items: self
                .items
                .iter()
                .map(|item| MarkerRecord::new(item.kind.as_index(), item.position()))
                .collect(),
        }
    }

    /// Enemies that are not playing their death animation.
    pub fn active_enemies(&self) -> impl Iterator<Item = &Enemy> {
        self.enemies.iter().filter(|enemy| enemy.is_active())
    }

    /// Walls whose bounds overlap `area`.
    pub fn walls_within(&self, area: &Rect) -> Vec<&Obstacle> {
        self.walls.iter().filter(|wall| wall.bounds().intersects(area)).collect()
    }

    /// Advances paths and animations of every entity and drops the ones
    /// whose lifetime ended.
    pub fn advance(&mut self) {
        self.enemies.retain_mut(|enemy| enemy.update() == Lifecycle::Alive);
        self.projectiles.retain_mut(|projectile| projectile.update() == Lifecycle::Alive);
        self.items.iter_mut().for_each(Item::update);
        self.debris.iter_mut().for_each(Debris::update);
    }
}

/// Resolves a buff index. `"random"` picks any purchasable buff.
fn resolve_buff(index: &str, catalog: &Catalog, rng: &mut StdRng) -> ReverieResult<BuffKind> {
    if index == RANDOM_BUFF_INDEX {
        let choices = catalog.purchasable_buffs();
        return choices
            .choose(rng)
            .copied()
            .ok_or_else(|| crate::ReverieError::Configuration("no buffs to stock a shop with".to_string()));
    }
    Ok(index.parse()?)
}
