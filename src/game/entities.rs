//! # Entities
//!
//! Concrete entity types living in a room. Each one wraps a [`Sprite`] and
//! adds the state its behavior needs; moving entities also carry a
//! [`PathFollower`].

use crate::config::{DOOR_EDGE_THRESHOLD, SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::game::{
    AnimationProgress, AnimationSpec, AnimationState, BuffKind, DirectedSprite, Direction, EnemyKind,
    EnemyStats, Entity, ItemKind, Layer, MaskShape, PathFollower, PathStep, PlayerStats, Sprite,
    Waypoint,
};
use crate::Vector2;
use rand::Rng;

/// Whether an entity survives the current tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Alive,
    Despawn,
}

macro_rules! impl_entity {
    ($($ty:ty),+ $(,)?) => {
        $(impl Entity for $ty {
            fn sprite(&self) -> &Sprite {
                &self.sprite
            }

            fn sprite_mut(&mut self) -> &mut Sprite {
                &mut self.sprite
            }
        })+
    };
}

macro_rules! impl_directed {
    ($($ty:ty => $speed:ident),+ $(,)?) => {
        $(impl DirectedSprite for $ty {
            fn follower(&self) -> &PathFollower {
                &self.follower
            }

            fn movement_parts(&mut self) -> (&mut Sprite, &mut PathFollower) {
                (&mut self.sprite, &mut self.follower)
            }

            fn speed(&self) -> f32 {
                self.$speed()
            }
        })+
    };
}

impl_entity!(Player, Weapon, Enemy, Projectile, Item, Buff, Debris, Obstacle, Decoration);
impl_directed!(
    Enemy => movement_speed,
    Projectile => flight_speed,
    Item => drift_speed,
);

/// Which movement keys are held this tick. Collision rules may veto a
/// direction before the player moves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MovementFlags {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl MovementFlags {
    pub fn is_moving(&self) -> bool {
        self.direction() != Vector2::zero()
    }

    /// Unnormalized heading implied by the held keys.
    pub fn direction(&self) -> Vector2 {
        let axis = |negative: bool, positive: bool| positive as i32 as f32 - negative as i32 as f32;
        Vector2::new(axis(self.left, self.right), axis(self.up, self.down))
    }

    /// Cancels movement toward `direction`.
    pub fn block(&mut self, direction: Direction) {
        match direction {
            Direction::Up => self.up = false,
            Direction::Right => self.right = false,
            Direction::Down => self.down = false,
            Direction::Left => self.left = false,
        }
    }
}

/// Vertical offset of the muzzle below the player's center.
const MUZZLE_OFFSET: f32 = 17.0;
/// Where the weapon is held relative to the player's center.
const GRIP_OFFSET: (f32, f32) = (14.0, 8.0);

/// The player's gun. Follows the player and plays a short recoil animation on
/// every shot.
#[derive(Debug, Clone, PartialEq)]
pub struct Weapon {
    pub sprite: Sprite,
    /// Aim angle in degrees
    pub angle: f32,
}

impl Weapon {
    pub fn new(holder: Vector2) -> Self {
        let mut weapon = Self {
            sprite: Sprite::new(
                Layer::Weapon,
                "wand",
                holder,
                (24.0, 10.0),
                MaskShape::Solid,
                AnimationSpec::WEAPON,
            ),
            angle: 0.0,
        };
        weapon.follow(holder, false);
        weapon
    }

    pub fn follow(&mut self, holder: Vector2, facing_left: bool) {
        let side = if facing_left { -1.0 } else { 1.0 };
        self.sprite.position = holder + Vector2::new(GRIP_OFFSET.0 * side, GRIP_OFFSET.1);
    }

    pub fn recoil(&mut self) {
        self.sprite.animation.set_state(AnimationState::Firing);
    }

    pub fn update(&mut self) {
        if let AnimationProgress::Completed(AnimationState::Firing) = self.sprite.animation.tick() {
            self.sprite.animation.set_state(AnimationState::Stopped);
        }
    }
}

/// The player character.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub sprite: Sprite,
    pub weapon: Weapon,
    /// Current stats, including purchased buffs
    pub stats: PlayerStats,
    /// Health in half hearts
    pub health: i32,
    pub money: u32,
    pub shot_cooldown_remaining: u32,
    pub invulnerable_remaining: u32,
    pub facing_left: bool,
}

impl Player {
    pub const SIZE: (f32, f32) = (36.0, 48.0);

    pub fn new(stats: PlayerStats, position: Vector2) -> Self {
        Self {
            sprite: Sprite::new(
                Layer::Player,
                "player",
                position,
                Self::SIZE,
                MaskShape::Ellipse,
                AnimationSpec::PLAYER,
            ),
            weapon: Weapon::new(position),
            stats,
            health: stats.max_health,
            money: 0,
            shot_cooldown_remaining: 0,
            invulnerable_remaining: 0,
            facing_left: false,
        }
    }

    /// Health in whole hearts.
    pub fn hearts(&self) -> f32 {
        self.health as f32 / 2.0
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable_remaining > 0
    }

    /// Applies damage unless the player is still invulnerable from the last
    /// hit. Returns whether damage was taken.
    pub fn take_damage(&mut self, amount: i32) -> bool {
        if self.is_invulnerable() || amount <= 0 {
            return false;
        }
        self.health -= amount;
        self.invulnerable_remaining = self.stats.invulnerable_cooldown;
        true
    }

    pub fn heal(&mut self, amount: i32) {
        self.health = (self.health + amount).min(self.stats.max_health);
    }

    /// Moves along the held directions at the player's speed.
    pub fn walk(&mut self, movement: MovementFlags) {
        let heading = movement.direction();
        if heading == Vector2::zero() {
            self.set_animation_state(AnimationState::Stopped);
            return;
        }
        self.sprite.position += heading.scale_to_length(self.stats.speed);
        self.set_animation_state(AnimationState::Walking);
        self.weapon.follow(self.sprite.position, self.facing_left);
    }

    /// Shifts the player (and the held weapon) by `offset`.
    pub fn translate(&mut self, offset: Vector2) {
        self.sprite.position += offset;
        self.weapon.follow(self.sprite.position, self.facing_left);
    }

    /// Turns toward the cursor.
    pub fn aim(&mut self, target: Vector2) {
        self.facing_left = target.x < self.sprite.position.x;
        self.weapon.follow(self.sprite.position, self.facing_left);
        self.weapon.angle = crate::angle_to(self.muzzle(), target);
    }

    /// Where projectiles leave from.
    pub fn muzzle(&self) -> Vector2 {
        self.sprite.position + Vector2::new(0.0, MUZZLE_OFFSET)
    }

    pub fn can_fire(&self) -> bool {
        self.shot_cooldown_remaining == 0
    }

    /// Fires toward `target` if the weapon is ready.
    pub fn fire<R: Rng>(&mut self, target: Vector2, rng: &mut R) -> Option<Projectile> {
        if !self.can_fire() {
            return None;
        }
        self.shot_cooldown_remaining = self.stats.cooldown;
        self.weapon.recoil();

        let spread = self.stats.accuracy.max(0.0);
        let deviation = if spread > 0.0 { rng.gen_range(-spread..=spread) } else { 0.0 };
        let origin = self.muzzle();
        let angle = crate::angle_to(origin, target) + deviation;
        Some(Projectile::new(
            origin,
            angle,
            ProjectileStats {
                damage: self.stats.damage,
                range: self.stats.range,
                speed: self.stats.shot_speed,
                knockback: self.stats.knockback,
            },
        ))
    }

    /// Counts down shot and invulnerability timers and advances animations.
    pub fn update(&mut self) {
        self.shot_cooldown_remaining = self.shot_cooldown_remaining.saturating_sub(1);
        self.invulnerable_remaining = self.invulnerable_remaining.saturating_sub(1);
        self.sprite.animation.tick();
        self.weapon.update();
    }
}

/// A hostile creature.
#[derive(Debug, Clone, PartialEq)]
pub struct Enemy {
    pub sprite: Sprite,
    pub kind: EnemyKind,
    pub stats: EnemyStats,
    pub health: i32,
    pub follower: PathFollower,
    /// Ticks until the next wander target may be picked
    pub wander_cooldown: u32,
    /// Set while following a pathfound detour around walls
    pub currently_pathfinding: bool,
    /// Position before the last step, used to back out of walls
    pub previous_position: Vector2,
    /// Destination of the current detour
    pub final_position: Option<Vector2>,
}

impl Enemy {
    pub fn new(kind: EnemyKind, stats: &EnemyStats, position: Vector2) -> Self {
        Self {
            sprite: Sprite::new(
                Layer::Enemy,
                kind.as_index(),
                position,
                stats.size,
                MaskShape::Ellipse,
                AnimationSpec::ENEMY,
            ),
            kind,
            stats: *stats,
            health: stats.health,
            follower: PathFollower::new(),
            wander_cooldown: 0,
            currently_pathfinding: false,
            previous_position: position,
            final_position: None,
        }
    }

    fn movement_speed(&self) -> f32 {
        self.stats.speed
    }

    /// Dying enemies no longer take part in any collision.
    pub fn is_active(&self) -> bool {
        self.animation_state() != AnimationState::Dying
    }

    /// Subtracts `damage`; returns true when this hit is lethal.
    pub fn take_hit(&mut self, damage: i32) -> bool {
        if !self.is_active() {
            return false;
        }
        self.health -= damage;
        self.health <= 0
    }

    /// Pushes the enemy `distance` pixels away from `source`, dropping its
    /// current path.
    pub fn knock_back(&mut self, source: Vector2, distance: f32) {
        if !self.is_active() || distance <= 0.0 {
            return;
        }
        let push = (self.sprite.position - source).scale_to_length(distance);
        self.sprite.position += push;
        self.follower.clear();
        self.currently_pathfinding = false;
        self.final_position = None;
    }

    /// Starts the death animation and rolls the money it drops: between zero
    /// and the enemy's value, each nudged a short random distance.
    pub fn kill<R: Rng>(&mut self, money: i32, nudge_radius: f32, rng: &mut R) -> Vec<Item> {
        self.follower.clear();
        self.currently_pathfinding = false;
        self.final_position = None;
        self.set_animation_state(AnimationState::Dying);

        let drops = rng.gen_range(0..=self.stats.value);
        (0..drops)
            .map(|_| {
                let mut coin = Item::new(ItemKind::Money, money, self.sprite.position);
                coin.random_movement(nudge_radius, rng);
                coin
            })
            .collect()
    }

    /// Backs out of a wall to the last good position and stops.
    pub fn snap_back(&mut self) {
        self.sprite.position = self.previous_position;
        self.stop_moving();
    }

    /// Follows a pathfound detour.
    pub fn start_detour(&mut self, waypoints: Vec<Waypoint>) {
        self.final_position = waypoints.last().map(|waypoint| waypoint.position);
        self.currently_pathfinding = !waypoints.is_empty();
        self.follower.set_path(waypoints);
        if !self.currently_pathfinding {
            self.set_animation_state(AnimationState::Stopped);
        }
    }

    pub fn update(&mut self) -> Lifecycle {
        if !self.is_active() {
            return match self.sprite.animation.tick() {
                AnimationProgress::Completed(AnimationState::Dying) => Lifecycle::Despawn,
                _ => Lifecycle::Alive,
            };
        }

        self.wander_cooldown = self.wander_cooldown.saturating_sub(1);
        self.previous_position = self.sprite.position;
        if self.follow_path() == PathStep::Exhausted {
            self.currently_pathfinding = false;
            self.final_position = None;
        }
        self.sprite.animation.tick();
        Lifecycle::Alive
    }
}

/// Damage and flight parameters a projectile is fired with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectileStats {
    pub damage: i32,
    pub range: f32,
    pub speed: f32,
    pub knockback: f32,
}

/// A shot fired by the player.
#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    pub sprite: Sprite,
    pub follower: PathFollower,
    pub stats: ProjectileStats,
    /// Flight heading in degrees
    pub angle: f32,
}

impl Projectile {
    pub const SIZE: (f32, f32) = (12.0, 12.0);

    /// Creates a projectile at `origin` flying along `angle` for up to
    /// `stats.range` pixels.
    pub fn new(origin: Vector2, angle: f32, stats: ProjectileStats) -> Self {
        let mut sprite = Sprite::new(
            Layer::Projectile,
            "spark",
            origin,
            Self::SIZE,
            MaskShape::Ellipse,
            AnimationSpec::PROJECTILE,
        );
        sprite.orientation = angle.round() as i32;

        let heading = Vector2::from_angle(angle);
        let steps = if stats.speed > 0.0 {
            (stats.range / stats.speed).floor() as usize
        } else {
            0
        };
        let mut follower = PathFollower::new();
        follower.set_path(
            (1..=steps)
                .map(|step| Waypoint::new(origin + heading * (stats.speed * step as f32), 0))
                .collect(),
        );

        Self {
            sprite,
            follower,
            stats,
            angle,
        }
    }

    fn flight_speed(&self) -> f32 {
        self.stats.speed
    }

    /// Still travelling and able to hit things.
    pub fn is_flying(&self) -> bool {
        self.animation_state() != AnimationState::Exploding
    }

    /// Stops the projectile and starts its explosion.
    pub fn explode(&mut self) {
        if self.is_flying() {
            self.follower.clear();
            self.set_animation_state(AnimationState::Exploding);
        }
    }

    pub fn update(&mut self) -> Lifecycle {
        if self.is_flying() {
            if let PathStep::Exhausted | PathStep::Idle = self.follow_path() {
                self.explode();
            }
        }
        match self.sprite.animation.tick() {
            AnimationProgress::Completed(AnimationState::Exploding) => Lifecycle::Despawn,
            _ => Lifecycle::Alive,
        }
    }
}

/// A pickup.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub sprite: Sprite,
    pub kind: ItemKind,
    pub value: i32,
    pub follower: PathFollower,
}

impl Item {
    pub const SIZE: (f32, f32) = (20.0, 20.0);
    const DRIFT_SPEED: f32 = 2.0;

    pub fn new(kind: ItemKind, value: i32, position: Vector2) -> Self {
        Self {
            sprite: Sprite::new(
                Layer::Item,
                kind.as_index(),
                position,
                Self::SIZE,
                MaskShape::Ellipse,
                AnimationSpec::STATIC,
            ),
            kind,
            value,
            follower: PathFollower::new(),
        }
    }

    fn drift_speed(&self) -> f32 {
        Self::DRIFT_SPEED
    }

    pub fn update(&mut self) {
        self.follow_path();
        self.sprite.animation.tick();
    }
}

/// A shop offer: a permanent stat change bought with money.
#[derive(Debug, Clone, PartialEq)]
pub struct Buff {
    pub sprite: Sprite,
    pub kind: BuffKind,
    pub cost: u32,
}

impl Buff {
    pub const SIZE: (f32, f32) = (40.0, 40.0);

    pub fn new(kind: BuffKind, cost: u32, position: Vector2) -> Self {
        Self {
            sprite: Sprite::new(
                Layer::Buff,
                kind.as_index(),
                position,
                Self::SIZE,
                MaskShape::Solid,
                AnimationSpec::STATIC,
            ),
            kind,
            cost,
        }
    }

    /// Whether `player` has enough money.
    pub fn affordable_by(&self, player: &Player) -> bool {
        player.money >= self.cost
    }
}

/// A decoration that breaks when shot.
#[derive(Debug, Clone, PartialEq)]
pub struct Debris {
    pub sprite: Sprite,
    /// Index shown once broken
    pub remains: String,
}

impl Debris {
    pub const SIZE: (f32, f32) = (44.0, 44.0);

    pub fn new(index: impl Into<String>, remains: impl Into<String>, position: Vector2) -> Self {
        Self {
            sprite: Sprite::new(
                Layer::Debris,
                index,
                position,
                Self::SIZE,
                MaskShape::Solid,
                AnimationSpec::DEBRIS,
            ),
            remains: remains.into(),
        }
    }

    pub fn is_intact(&self) -> bool {
        self.animation_state() != AnimationState::Dying
    }

    /// Starts breaking; the debris no longer blocks and drops to the shrub
    /// layer. Returns false when it was already broken.
    pub fn break_apart(&mut self) -> bool {
        if !self.is_intact() {
            return false;
        }
        self.set_animation_state(AnimationState::Dying);
        self.sprite.layer = Layer::Shrub;
        true
    }

    /// Index to persist for this debris.
    pub fn saved_index(&self) -> &str {
        if self.is_intact() {
            &self.sprite.index
        } else {
            &self.remains
        }
    }

    pub fn update(&mut self) {
        self.sprite.animation.tick();
    }
}

/// Immovable wall or door tile.
#[derive(Debug, Clone, PartialEq)]
pub struct Obstacle {
    pub sprite: Sprite,
}

impl Obstacle {
    pub fn new(layer: Layer, index: impl Into<String>, position: Vector2, orientation: i32) -> Self {
        let size = (crate::config::TILE_WIDTH, crate::config::TILE_HEIGHT);
        Self {
            sprite: Sprite::new(layer, index, position, size, MaskShape::Solid, AnimationSpec::STATIC)
                .with_orientation(orientation),
        }
    }

    /// For a door, the room edge it leads through.
    pub fn exit_direction(&self) -> Option<Direction> {
        let center = self.sprite.position;
        if center.x < DOOR_EDGE_THRESHOLD {
            Some(Direction::Left)
        } else if center.x > SCREEN_WIDTH - DOOR_EDGE_THRESHOLD {
            Some(Direction::Right)
        } else if center.y < DOOR_EDGE_THRESHOLD {
            Some(Direction::Up)
        } else if center.y > SCREEN_HEIGHT - DOOR_EDGE_THRESHOLD {
            Some(Direction::Down)
        } else {
            None
        }
    }
}

/// Purely decorative shrub or trap.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoration {
    pub sprite: Sprite,
}

impl Decoration {
    pub fn new(layer: Layer, index: impl Into<String>, position: Vector2, orientation: i32) -> Self {
        let size = match layer {
            Layer::Trap => (crate::config::TILE_WIDTH, crate::config::TILE_HEIGHT),
            _ => (40.0, 40.0),
        };
        Self {
            sprite: Sprite::new(layer, index, position, size, MaskShape::Solid, AnimationSpec::STATIC)
                .with_orientation(orientation),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Catalog;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn gloom(position: Vector2) -> Enemy {
        let catalog = Catalog::builtin();
        Enemy::new(EnemyKind::Gloom, catalog.enemy(EnemyKind::Gloom).unwrap(), position)
    }

    #[test]
    fn test_movement_flags_direction() {
        let flags = MovementFlags {
            up: true,
            right: true,
            ..Default::default()
        };
        assert_eq!(flags.direction(), Vector2::new(1.0, -1.0));

        let mut opposed = MovementFlags {
            left: true,
            right: true,
            ..Default::default()
        };
        assert!(!opposed.is_moving());
        opposed.block(Direction::Left);
        assert!(opposed.is_moving());
    }

    #[test]
    fn test_player_walk_speed() {
        let mut player = Player::new(PlayerStats::default(), Vector2::new(100.0, 100.0));
        player.walk(MovementFlags {
            right: true,
            down: true,
            ..Default::default()
        });
        let moved = Vector2::new(100.0, 100.0).distance_to(player.position());
        assert!((moved - player.stats.speed).abs() < 1e-4);
        assert_eq!(player.animation_state(), AnimationState::Walking);
    }

    #[test]
    fn test_player_invulnerability_window() {
        let mut player = Player::new(PlayerStats::default(), Vector2::zero());
        assert!(player.take_damage(1));
        assert_eq!(player.health, 5);
        assert!(!player.take_damage(1));

        for _ in 0..player.stats.invulnerable_cooldown {
            player.update();
        }
        assert!(player.take_damage(1));
        assert_eq!(player.health, 4);
    }

    #[test]
    fn test_player_fire_respects_cooldown() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut player = Player::new(PlayerStats::default(), Vector2::new(400.0, 400.0));
        let shot = player.fire(Vector2::new(800.0, 417.0), &mut rng).unwrap();
        assert_eq!(shot.position(), player.muzzle());
        assert!(shot.angle.abs() <= player.stats.accuracy + 1e-3);
        assert!(player.fire(Vector2::new(800.0, 400.0), &mut rng).is_none());
        assert_eq!(player.weapon.sprite.animation.state(), AnimationState::Firing);
    }

    #[test]
    fn test_projectile_range() {
        let stats = ProjectileStats {
            damage: 1,
            range: 100.0,
            speed: 10.0,
            knockback: 0.0,
        };
        let mut shot = Projectile::new(Vector2::zero(), 0.0, stats);
        let mut ticks = 0;
        while shot.is_flying() {
            shot.update();
            ticks += 1;
            assert!(ticks < 100);
        }
        assert!((shot.position().x - 100.0).abs() < 1e-3);
        while shot.update() == Lifecycle::Alive {
            ticks += 1;
            assert!(ticks < 200);
        }
    }

    #[test]
    fn test_enemy_kill_drops_bounded_money() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..20 {
            let mut enemy = gloom(Vector2::new(300.0, 300.0));
            let drops = enemy.kill(1, 30.0, &mut rng);
            assert!(drops.len() as u32 <= enemy.stats.value);
            assert!(!enemy.is_active());
            for coin in drops {
                assert_eq!(coin.position(), Vector2::new(300.0, 300.0));
                if let Some(destination) = coin.follower.destination() {
                    assert!(destination.distance_to(Vector2::new(300.0, 300.0)) <= 30.0 + 1e-3);
                }
            }
        }
    }

    #[test]
    fn test_dying_enemy_ignores_hits() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut enemy = gloom(Vector2::zero());
        enemy.kill(1, 10.0, &mut rng);
        let health = enemy.health;
        assert!(!enemy.take_hit(10));
        assert_eq!(enemy.health, health);
    }

    #[test]
    fn test_enemy_despawns_after_death_animation() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut enemy = gloom(Vector2::zero());
        enemy.kill(1, 10.0, &mut rng);
        let mut ticks = 0;
        while enemy.update() == Lifecycle::Alive {
            ticks += 1;
            assert!(ticks < 1000);
        }
    }

    #[test]
    fn test_enemy_snap_back() {
        let mut enemy = gloom(Vector2::new(100.0, 100.0));
        enemy.direct_movement(Vector2::new(200.0, 100.0));
        enemy.update();
        assert_ne!(enemy.position(), Vector2::new(100.0, 100.0));
        enemy.snap_back();
        assert_eq!(enemy.position(), Vector2::new(100.0, 100.0));
        assert!(!enemy.follower.has_path());
    }

    #[test]
    fn test_debris_breaks_once() {
        let mut debris = Debris::new("crate", "crate_splinters", Vector2::zero());
        assert_eq!(debris.saved_index(), "crate");
        assert!(debris.break_apart());
        assert!(!debris.break_apart());
        assert_eq!(debris.layer(), Layer::Shrub);
        assert_eq!(debris.saved_index(), "crate_splinters");
    }

    #[test]
    fn test_door_exit_direction() {
        let door = |x: f32, y: f32| Obstacle::new(Layer::Door, "door", Vector2::new(x, y), 0);
        assert_eq!(door(25.0, 500.0).exit_direction(), Some(Direction::Left));
        assert_eq!(door(1575.0, 500.0).exit_direction(), Some(Direction::Right));
        assert_eq!(door(800.0, 25.0).exit_direction(), Some(Direction::Up));
        assert_eq!(door(800.0, 975.0).exit_direction(), Some(Direction::Down));
        assert_eq!(door(800.0, 500.0).exit_direction(), None);
    }
}
