//! # Game Events
//!
//! Things that happened during a tick. The collision resolver and the session
//! emit them; statistics and the host consume them.

use crate::game::{BuffKind, Direction, EnemyKind, EntityId, GridPosition, ItemKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A projectile struck an enemy
    EnemyHit { enemy: EntityId, damage: i32 },
    /// An enemy received a lethal hit and dropped `drops` coins
    EnemyKilled { enemy: EntityId, kind: EnemyKind, drops: usize },
    /// The player lost health
    PlayerDamaged { amount: i32, remaining: i32 },
    ItemCollected { kind: ItemKind, value: i32 },
    BuffPurchased { kind: BuffKind, cost: u32 },
    DebrisBroken { index: String },
    ShotFired,
    /// The player touched a door
    DoorEntered { direction: Direction },
    /// The player arrived in another room
    RoomEntered { position: GridPosition, first_visit: bool },
    GameOver,
}

/// Running totals for the current run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStatistics {
    pub enemies_defeated: u32,
    pub rooms_explored: u32,
    pub items_collected: u32,
    pub buffs_purchased: u32,
    pub money_earned: u64,
    pub damage_dealt: u64,
    pub damage_taken: u64,
    pub shots_fired: u64,
    pub debris_broken: u32,
    pub ticks_survived: u64,
}

impl GameStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates statistics from a game event.
    pub fn update_from_event(&mut self, event: &GameEvent) {
        match event {
            GameEvent::EnemyHit { damage, .. } => {
                self.damage_dealt += (*damage).max(0) as u64;
            }
            GameEvent::EnemyKilled { .. } => {
                self.enemies_defeated += 1;
            }
            GameEvent::PlayerDamaged { amount, .. } => {
                self.damage_taken += (*amount).max(0) as u64;
            }
            GameEvent::ItemCollected { kind, value } => {
                self.items_collected += 1;
                if *kind == ItemKind::Money {
                    self.money_earned += (*value).max(0) as u64;
                }
            }
            GameEvent::BuffPurchased { .. } => {
                self.buffs_purchased += 1;
            }
            GameEvent::DebrisBroken { .. } => {
                self.debris_broken += 1;
            }
            GameEvent::ShotFired => {
                self.shots_fired += 1;
            }
            GameEvent::RoomEntered { first_visit, .. } => {
                if *first_visit {
                    self.rooms_explored += 1;
                }
            }
            GameEvent::DoorEntered { .. } | GameEvent::GameOver => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::new_entity_id;

    #[test]
    fn test_statistics_accumulate() {
        let mut stats = GameStatistics::new();
        let enemy = new_entity_id();
        stats.update_from_event(&GameEvent::EnemyHit { enemy, damage: 2 });
        stats.update_from_event(&GameEvent::EnemyKilled {
            enemy,
            kind: EnemyKind::Gloom,
            drops: 1,
        });
        stats.update_from_event(&GameEvent::ItemCollected {
            kind: ItemKind::Money,
            value: 3,
        });
        stats.update_from_event(&GameEvent::ItemCollected {
            kind: ItemKind::Heart,
            value: 2,
        });
        stats.update_from_event(&GameEvent::RoomEntered {
            position: GridPosition::new(1, 1),
            first_visit: false,
        });

        assert_eq!(stats.damage_dealt, 2);
        assert_eq!(stats.enemies_defeated, 1);
        assert_eq!(stats.items_collected, 2);
        assert_eq!(stats.money_earned, 3);
        assert_eq!(stats.rooms_explored, 0);
    }
}
