//! # Enemy AI
//!
//! Runs on a throttled cadence (every `ai_interval` ticks). Wanderers pick a
//! random nearby target whenever their cooldown allows; chasers head for the
//! player while they can see them, overriding any wander target. Enemies
//! following a pathfound detour are left alone until it runs out.

use crate::game::{AnimationState, DirectedSprite, Enemy, Entity, Obstacle, Player, Room};
use crate::utils::line_points;
use crate::Vector2;
use log::trace;
use rand::Rng;

/// Only every `LINE_SAMPLE_STRIDE`th point of a sight line is tested against walls.
const LINE_SAMPLE_STRIDE: usize = 5;

/// Drives enemy movement decisions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyDirector {
    /// Wander radius as a multiple of the enemy's speed
    pub wander_radius_scale: f32,
}

impl Default for EnemyDirector {
    fn default() -> Self {
        Self {
            wander_radius_scale: 40.0,
        }
    }
}

impl EnemyDirector {
    pub fn new(wander_radius_scale: f32) -> Self {
        Self { wander_radius_scale }
    }

    /// Updates every active enemy's movement target.
    pub fn update<R: Rng>(&self, room: &mut Room, player: &Player, rng: &mut R) {
        let target = player.position();
        let Room { enemies, walls, .. } = room;

        for index in arrange_by_distance(enemies, target) {
            let enemy = &mut enemies[index];
            if !enemy.is_active() {
                continue;
            }

            let movement = enemy.stats.movement;
            if movement.wanders() && enemy.wander_cooldown == 0 && !enemy.currently_pathfinding {
                enemy.random_movement(enemy.stats.speed * self.wander_radius_scale, rng);
                enemy.wander_cooldown = enemy.stats.movement_cooldown;
                enemy.set_animation_state(AnimationState::Walking);
            }

            if movement.chases() && !enemy.currently_pathfinding && in_sight(enemy, target, walls) {
                trace!("{} at {:?} chases player", enemy.kind, enemy.position());
                enemy.direct_movement(target);
                enemy.set_animation_state(AnimationState::Walking);
            }
        }
    }
}

/// Indices of `enemies` ordered nearest-first relative to `target`.
pub fn arrange_by_distance(enemies: &[Enemy], target: Vector2) -> Vec<usize> {
    let mut order: Vec<usize> = (0..enemies.len()).collect();
    order.sort_by(|a, b| {
        let da = enemies[*a].position().distance_to(target);
        let db = enemies[*b].position().distance_to(target);
        da.total_cmp(&db)
    });
    order
}

/// Whether `enemy` can see `target`.
///
/// The discrete line between the two must be no longer than the enemy's aggro
/// distance, and none of its sampled points may fall inside a wall near the
/// enemy.
pub fn in_sight(enemy: &Enemy, target: Vector2, walls: &[Obstacle]) -> bool {
    let aggro = enemy.stats.aggro_distance;
    let line = line_points(enemy.position().to_pixel(), target.to_pixel());
    let (Some(first), Some(last)) = (line.first(), line.last()) else {
        return false;
    };
    let span = Vector2::new(first.0 as f32, first.1 as f32).distance_to(Vector2::new(last.0 as f32, last.1 as f32));
    if span > aggro {
        return false;
    }

    let area = enemy.bounds().inflate(2.0 * aggro, 2.0 * aggro);
    let nearby: Vec<&Obstacle> = walls.iter().filter(|wall| wall.bounds().intersects(&area)).collect();
    if nearby.is_empty() {
        return true;
    }

    line.iter()
        .skip(1)
        .step_by(LINE_SAMPLE_STRIDE)
        .all(|(x, y)| {
            let point = Vector2::new(*x as f32, *y as f32);
            !nearby.iter().any(|wall| wall.bounds().contains_point(point))
        })
}
