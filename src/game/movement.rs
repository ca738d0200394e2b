//! # Waypoint Movement
//!
//! Moving entities carry an optional queue of per-tick waypoints. Each tick
//! they pop the next one; when the queue runs dry the path is dropped and the
//! entity stops.

use crate::game::{AnimationState, Entity, Sprite};
use crate::Vector2;
use rand::Rng;

/// One tick's worth of movement: where to be and how much to rotate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Waypoint {
    pub position: Vector2,
    /// Orientation change in degrees applied when the waypoint is reached
    pub rotation: i32,
}

impl Waypoint {
    pub const fn new(position: Vector2, rotation: i32) -> Self {
        Self { position, rotation }
    }
}

/// Outcome of [`PathFollower::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathStep {
    /// No path is active
    Idle,
    /// The path is paused for this tick
    Waiting,
    /// Moved onto the next waypoint
    Moved,
    /// The last waypoint had already been reached; the path is gone
    Exhausted,
}

/// The active path of a moving entity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathFollower {
    path: Option<Vec<Waypoint>>,
    cursor: usize,
    waiting: bool,
}

impl PathFollower {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the current path. An empty list clears it.
    pub fn set_path(&mut self, waypoints: Vec<Waypoint>) {
        self.path = (!waypoints.is_empty()).then_some(waypoints);
        self.cursor = 0;
    }

    pub fn clear(&mut self) {
        self.path = None;
        self.cursor = 0;
    }

    pub fn has_path(&self) -> bool {
        self.path.is_some()
    }

    /// Waypoints not yet reached.
    pub fn remaining(&self) -> usize {
        self.path.as_ref().map_or(0, |path| path.len() - self.cursor)
    }

    /// Where the path ends, if there is one.
    pub fn destination(&self) -> Option<Vector2> {
        self.path.as_ref().and_then(|path| path.last()).map(|waypoint| waypoint.position)
    }

    /// Skips the next tick's movement.
    pub fn pause(&mut self) {
        self.waiting = true;
    }

    /// Moves `sprite` onto the next waypoint.
    pub fn advance(&mut self, sprite: &mut Sprite) -> PathStep {
        let Some(path) = self.path.as_ref() else {
            return PathStep::Idle;
        };
        if self.waiting {
            self.waiting = false;
            return PathStep::Waiting;
        }

        match path.get(self.cursor) {
            Some(waypoint) => {
                sprite.position = waypoint.position;
                sprite.orientation = (sprite.orientation + waypoint.rotation).rem_euclid(360);
                self.cursor += 1;
                PathStep::Moved
            }
            None => {
                self.clear();
                PathStep::Exhausted
            }
        }
    }
}

/// Evenly spaced waypoints from `start` to `target`, `speed` pixels apart,
/// the last landing exactly on `target`.
///
/// # Examples
///
/// ```
/// use reverie::{straight_line, Vector2};
///
/// let line = straight_line(Vector2::new(0.0, 0.0), Vector2::new(10.0, 0.0), 3.0);
/// assert_eq!(line.len(), 4);
/// assert_eq!(line.last().unwrap().position, Vector2::new(10.0, 0.0));
/// ```
pub fn straight_line(start: Vector2, target: Vector2, speed: f32) -> Vec<Waypoint> {
    let distance = start.distance_to(target);
    if distance <= f32::EPSILON || speed <= 0.0 {
        return Vec::new();
    }

    let steps = (distance / speed).ceil() as usize;
    let delta = target - start;
    (1..=steps)
        .map(|step| {
            let position = if step == steps {
                target
            } else {
                start + delta * (step as f32 / steps as f32)
            };
            Waypoint::new(position, 0)
        })
        .collect()
}

/// Entities that move along waypoint paths.
pub trait DirectedSprite: Entity {
    fn follower(&self) -> &PathFollower;

    /// Split borrow of the sprite and its path.
    fn movement_parts(&mut self) -> (&mut Sprite, &mut PathFollower);

    /// Pixels per tick.
    fn speed(&self) -> f32;

    /// Steps along the active path. An exhausted path leaves the entity stopped.
    fn follow_path(&mut self) -> PathStep {
        let (sprite, follower) = self.movement_parts();
        let step = follower.advance(sprite);
        if step == PathStep::Exhausted {
            self.set_animation_state(AnimationState::Stopped);
        }
        step
    }

    /// Heads straight for `target` at the entity's speed.
    fn direct_movement(&mut self, target: Vector2) {
        let waypoints = straight_line(self.position(), target, self.speed());
        self.movement_parts().1.set_path(waypoints);
    }

    /// Heads for a random point up to `radius` pixels away.
    fn random_movement<R: Rng>(&mut self, radius: f32, rng: &mut R) {
        let angle = rng.gen_range(0.0..360.0);
        let distance = if radius > 0.0 { rng.gen_range(0.0..=radius) } else { 0.0 };
        let target = self.position() + Vector2::from_angle(angle) * distance;
        self.direct_movement(target);
    }

    fn stop_moving(&mut self) {
        self.movement_parts().1.clear();
        self.set_animation_state(AnimationState::Stopped);
    }
}
