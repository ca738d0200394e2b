//! # Collision and Combat
//!
//! The per-tick rule table. Rules run in a fixed order and each one sees the
//! effects of the rules before it:
//!
//! 1. wall × projectile: the projectile explodes
//! 2. player × wall: movement toward the wall is cancelled
//! 3. enemy × projectile: damage, knockback, death and loot
//! 4. enemy × wall: chasers detour with A*, wanderers back out
//! 5. player × enemy: contact damage
//! 6. enemy × enemy: the farther enemy waits a tick
//! 7. player × door: leave the room (stops resolution)
//! 8. item × item: overlapping pickups nudge apart
//! 9. player × item: pickups are collected
//! 10. player × buff: buffs are bought if affordable
//! 11. projectile × debris: debris breaks, the projectile explodes
//! 12. player × debris: debris breaks
//!
//! Enemies playing their death animation take part in none of them.

use crate::game::{
    arrange_by_distance, collect_item, collide_circle, collide_mask, purchase_buff, DirectedSprite, Direction,
    Entity, GameEvent, MovementFlags, Player, Room,
};
use crate::utils::{find_path, to_waypoints};
use crate::Vector2;
use log::debug;
use rand::Rng;

/// Circle ratio used for door contact.
const DOOR_CONTACT_RATIO: f32 = 0.6;
/// Circle ratio used for item pickup; items are collected from a distance.
const PICKUP_RATIO: f32 = 2.0;

/// Applies the collision rules to a room.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CombatResolver {
    /// How far coins dropped by a dying enemy scatter
    pub loot_nudge_radius: f32,
    /// How far overlapping items push each other
    pub item_nudge_radius: f32,
}

impl Default for CombatResolver {
    fn default() -> Self {
        Self {
            loot_nudge_radius: 30.0,
            item_nudge_radius: 15.0,
        }
    }
}

impl CombatResolver {
    pub fn new(loot_nudge_radius: f32, item_nudge_radius: f32) -> Self {
        Self {
            loot_nudge_radius,
            item_nudge_radius,
        }
    }

    /// Runs all rules once.
    ///
    /// `movement` holds the directions the player wants to move this tick and
    /// may be narrowed. When the player touches a door the returned events
    /// end with [`GameEvent::DoorEntered`] and the remaining rules are skipped.
    pub fn resolve<R: Rng>(
        &self,
        room: &mut Room,
        player: &mut Player,
        movement: &mut MovementFlags,
        money_value: i32,
        rng: &mut R,
    ) -> Vec<GameEvent> {
        let mut events = Vec::new();

        self.wall_projectile(room);
        self.player_wall(room, player, movement);
        self.enemy_projectile(room, money_value, rng, &mut events);
        self.enemy_wall(room, player);
        self.player_enemy(room, player, &mut events);
        self.enemy_enemy(room, player);
        if let Some(direction) = self.player_door(room, player) {
            debug!("Player reached the {:?} door", direction);
            events.push(GameEvent::DoorEntered { direction });
            return events;
        }
        self.item_item(room, rng);
        self.player_item(room, player, &mut events);
        self.player_buff(room, player, &mut events);
        self.projectile_debris(room, &mut events);
        self.player_debris(room, player, &mut events);

        events
    }

    fn wall_projectile(&self, room: &mut Room) {
        let Room { walls, projectiles, .. } = room;
        for projectile in projectiles.iter_mut().filter(|projectile| projectile.is_flying()) {
            if walls.iter().any(|wall| collide_mask(wall, &*projectile)) {
                projectile.explode();
            }
        }
    }

    fn player_wall(&self, room: &Room, player: &Player, movement: &mut MovementFlags) {
        let body = player.bounds();
        let quarter = body.h / 4.0;
        let probes = [
            (Direction::Up, body.center()),
            (Direction::Down, body.mid_bottom()),
            (Direction::Left, body.mid_left() + Vector2::new(0.0, quarter)),
            (Direction::Right, body.mid_right() + Vector2::new(0.0, quarter)),
        ];

        for wall in room.walls.iter().filter(|wall| collide_mask(player, *wall)) {
            let area = wall.bounds();
            for (direction, probe) in probes {
                if area.contains_point(probe) {
                    movement.block(direction);
                }
            }
        }
    }

    fn enemy_projectile<R: Rng>(&self, room: &mut Room, money_value: i32, rng: &mut R, events: &mut Vec<GameEvent>) {
        let Room {
            enemies,
            projectiles,
            items,
            ..
        } = room;

        for enemy in enemies.iter_mut() {
            for projectile in projectiles.iter_mut() {
                if !enemy.is_active() {
                    break;
                }
                if !projectile.is_flying() || !collide_mask(&*enemy, &*projectile) {
                    continue;
                }

                projectile.explode();
                let damage = projectile.stats.damage;
                events.push(GameEvent::EnemyHit {
                    enemy: enemy.id(),
                    damage,
                });

                if enemy.take_hit(damage) {
                    let drops = enemy.kill(money_value, self.loot_nudge_radius, rng);
                    debug!("{} killed, dropping {} coins", enemy.kind, drops.len());
                    events.push(GameEvent::EnemyKilled {
                        enemy: enemy.id(),
                        kind: enemy.kind,
                        drops: drops.len(),
                    });
                    items.extend(drops);
                } else {
                    enemy.knock_back(projectile.position(), projectile.stats.knockback);
                }
            }
        }
    }

    fn enemy_wall(&self, room: &mut Room, player: &Player) {
        let Room { enemies, walls, grid, .. } = room;
        let target = player.position();

        for enemy in enemies.iter_mut() {
            if !enemy.is_active() || !enemy.follower.has_path() || enemy.currently_pathfinding {
                continue;
            }
            if !walls.iter().any(|wall| collide_mask(&*enemy, wall)) {
                continue;
            }

            if enemy.stats.movement.pathfinds_around_walls() {
                let route = find_path(enemy.position(), target, grid);
                debug!("{} detours around a wall ({} nodes)", enemy.kind, route.len());
                enemy.start_detour(to_waypoints(&route, enemy.stats.speed));
                if enemy.currently_pathfinding {
                    enemy.set_animation_state(crate::game::AnimationState::Walking);
                }
            } else {
                enemy.snap_back();
                enemy.wander_cooldown = 0;
            }
        }
    }

    fn player_enemy(&self, room: &Room, player: &mut Player, events: &mut Vec<GameEvent>) {
        for enemy in room.active_enemies() {
            if !collide_mask(&*player, enemy) {
                continue;
            }
            let amount = enemy.stats.collision_damage;
            if player.take_damage(amount) {
                events.push(GameEvent::PlayerDamaged {
                    amount,
                    remaining: player.health,
                });
            }
        }
    }

    fn enemy_enemy(&self, room: &mut Room, player: &Player) {
        let order = arrange_by_distance(&room.enemies, player.position());
        for (rank, &index) in order.iter().enumerate() {
            if !room.enemies[index].is_active() {
                continue;
            }
            for &other in &order[rank + 1..] {
                let blocked = room.enemies[other].is_active()
                    && collide_mask(&room.enemies[index], &room.enemies[other]);
                if blocked {
                    room.enemies[other].follower.pause();
                }
            }
        }
    }

    fn player_door(&self, room: &Room, player: &Player) -> Option<Direction> {
        room.doors
            .iter()
            .filter(|door| collide_circle(player, *door, DOOR_CONTACT_RATIO))
            .find_map(|door| door.exit_direction())
    }

    fn item_item<R: Rng>(&self, room: &mut Room, rng: &mut R) {
        let count = room.items.len();
        for first in 0..count {
            for second in 0..count {
                if first != second && collide_mask(&room.items[first], &room.items[second]) {
                    room.items[second].random_movement(self.item_nudge_radius, rng);
                }
            }
        }
    }

    fn player_item(&self, room: &mut Room, player: &mut Player, events: &mut Vec<GameEvent>) {
        room.items.retain(|item| {
            if !collide_circle(&*player, item, PICKUP_RATIO) {
                return true;
            }
            collect_item(player, item);
            events.push(GameEvent::ItemCollected {
                kind: item.kind,
                value: item.value,
            });
            false
        });
    }

    fn player_buff(&self, room: &mut Room, player: &mut Player, events: &mut Vec<GameEvent>) {
        room.buffs.retain(|buff| {
            if !collide_mask(&*player, buff) || !purchase_buff(player, buff) {
                return true;
            }
            debug!("Bought {} for {}", buff.kind, buff.cost);
            events.push(GameEvent::BuffPurchased {
                kind: buff.kind,
                cost: buff.cost,
            });
            false
        });
    }

    fn projectile_debris(&self, room: &mut Room, events: &mut Vec<GameEvent>) {
        let Room { projectiles, debris, .. } = room;
        for piece in debris.iter_mut() {
            let mut struck = false;
            for projectile in projectiles.iter_mut().filter(|projectile| collide_mask(&**projectile, &*piece)) {
                if piece.is_intact() {
                    projectile.explode();
                }
                struck = true;
            }
            if struck && piece.break_apart() {
                events.push(GameEvent::DebrisBroken {
                    index: piece.sprite.index.clone(),
                });
            }
        }
    }

    fn player_debris(&self, room: &mut Room, player: &Player, events: &mut Vec<GameEvent>) {
        for piece in room.debris.iter_mut() {
            if collide_mask(player, piece) && piece.break_apart() {
                events.push(GameEvent::DebrisBroken {
                    index: piece.sprite.index.clone(),
                });
            }
        }
    }
}
