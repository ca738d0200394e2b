//! # Sprites
//!
//! The shared visual/physical core of every entity: identity, layer, position,
//! size, collision mask and animation state.

use crate::game::{new_entity_id, EntityId, MaskShape, PixelMask};
use crate::{Rect, Vector2};
use serde::{Deserialize, Serialize};

/// Draw layers, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Layer {
    Background = 0,
    Wall = 20,
    Door = 30,
    Enemy = 40,
    Debris = 45,
    Shrub = 50,
    Trap = 60,
    Item = 65,
    Player = 70,
    Weapon = 75,
    Buff = 85,
    Projectile = 90,
}

/// What an entity's animation is currently showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnimationState {
    Stopped,
    Walking,
    Dying,
    Exploding,
    Firing,
}

impl AnimationState {
    /// Looping states restart after their last frame; the others play once.
    pub fn is_looping(self) -> bool {
        matches!(self, AnimationState::Stopped | AnimationState::Walking)
    }
}

/// Frame counts per animation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationSpec {
    pub stopped: usize,
    pub walking: usize,
    pub dying: usize,
    pub exploding: usize,
    pub firing: usize,
    pub ticks_per_frame: u32,
}

impl AnimationSpec {
    pub const STATIC: AnimationSpec = AnimationSpec::uniform(1, 1);
    pub const PLAYER: AnimationSpec = AnimationSpec {
        stopped: 2,
        walking: 4,
        dying: 1,
        exploding: 1,
        firing: 1,
        ticks_per_frame: 8,
    };
    pub const ENEMY: AnimationSpec = AnimationSpec {
        stopped: 2,
        walking: 4,
        dying: 6,
        exploding: 1,
        firing: 1,
        ticks_per_frame: 6,
    };
    pub const PROJECTILE: AnimationSpec = AnimationSpec {
        stopped: 1,
        walking: 1,
        dying: 1,
        exploding: 4,
        firing: 1,
        ticks_per_frame: 3,
    };
    pub const WEAPON: AnimationSpec = AnimationSpec {
        stopped: 1,
        walking: 1,
        dying: 1,
        exploding: 1,
        firing: 3,
        ticks_per_frame: 3,
    };
    pub const DEBRIS: AnimationSpec = AnimationSpec {
        stopped: 1,
        walking: 1,
        dying: 4,
        exploding: 1,
        firing: 1,
        ticks_per_frame: 5,
    };

    pub const fn uniform(frames: usize, ticks_per_frame: u32) -> Self {
        Self {
            stopped: frames,
            walking: frames,
            dying: frames,
            exploding: frames,
            firing: frames,
            ticks_per_frame,
        }
    }

    pub fn frames(&self, state: AnimationState) -> usize {
        let frames = match state {
            AnimationState::Stopped => self.stopped,
            AnimationState::Walking => self.walking,
            AnimationState::Dying => self.dying,
            AnimationState::Exploding => self.exploding,
            AnimationState::Firing => self.firing,
        };
        frames.max(1)
    }
}

/// Result of advancing an animation by one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationProgress {
    Running,
    /// A one-shot state just showed its last frame
    Completed(AnimationState),
}

/// Frame counter for a sprite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Animation {
    spec: AnimationSpec,
    state: AnimationState,
    frame: usize,
    elapsed: u32,
    finished: bool,
}

impl Animation {
    pub fn new(spec: AnimationSpec) -> Self {
        Self {
            spec,
            state: AnimationState::Stopped,
            frame: 0,
            elapsed: 0,
            finished: false,
        }
    }

    pub fn state(&self) -> AnimationState {
        self.state
    }

    pub fn frame(&self) -> usize {
        self.frame
    }

    /// Switches state, restarting at frame 0. Setting the current state again
    /// changes nothing.
    pub fn set_state(&mut self, state: AnimationState) {
        if state == self.state {
            return;
        }
        self.state = state;
        self.frame = 0;
        self.elapsed = 0;
        self.finished = false;
    }

    /// Advances one tick. A one-shot state reports completion exactly once
    /// and then holds its last frame.
    pub fn tick(&mut self) -> AnimationProgress {
        if self.finished {
            return AnimationProgress::Running;
        }

        self.elapsed += 1;
        if self.elapsed < self.spec.ticks_per_frame.max(1) {
            return AnimationProgress::Running;
        }
        self.elapsed = 0;

        let frames = self.spec.frames(self.state);
        if self.frame + 1 < frames {
            self.frame += 1;
            AnimationProgress::Running
        } else if self.state.is_looping() {
            self.frame = 0;
            AnimationProgress::Running
        } else {
            self.finished = true;
            AnimationProgress::Completed(self.state)
        }
    }
}

/// Visual and physical state shared by all entities.
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    pub id: EntityId,
    pub layer: Layer,
    /// Content index this sprite was loaded from
    pub index: String,
    /// Center of the sprite in room pixels
    pub position: Vector2,
    /// Rotation in degrees
    pub orientation: i32,
    pub width: f32,
    pub height: f32,
    pub mask: PixelMask,
    pub animation: Animation,
}

impl Sprite {
    pub fn new(
        layer: Layer,
        index: impl Into<String>,
        position: Vector2,
        size: (f32, f32),
        shape: MaskShape,
        animation: AnimationSpec,
    ) -> Self {
        let (width, height) = size;
        Self {
            id: new_entity_id(),
            layer,
            index: index.into(),
            position,
            orientation: 0,
            width,
            height,
            mask: PixelMask::new(shape, width.round() as usize, height.round() as usize),
            animation: Animation::new(animation),
        }
    }

    pub fn with_orientation(mut self, orientation: i32) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_center(self.position, self.width, self.height)
    }

    /// Pixel-accurate overlap test.
    pub fn collides_with(&self, other: &Sprite) -> bool {
        let a = self.bounds();
        let b = other.bounds();
        if !a.intersects(&b) {
            return false;
        }
        let offset = (
            (b.x - a.x).round() as i32,
            (b.y - a.y).round() as i32,
        );
        self.mask.overlaps(&other.mask, offset)
    }

    /// Circle overlap test. Each sprite is treated as a circle of
    /// `ratio × half its diagonal`; they collide when the distance between
    /// centers is at most the sum of the radii.
    pub fn collides_within_ratio(&self, other: &Sprite, ratio: f32) -> bool {
        let radius = |sprite: &Sprite| ratio * 0.5 * (sprite.width.powi(2) + sprite.height.powi(2)).sqrt();
        self.position.distance_to(other.position) <= radius(self) + radius(other)
    }
}

/// Anything that lives in a room.
pub trait Entity {
    fn sprite(&self) -> &Sprite;
    fn sprite_mut(&mut self) -> &mut Sprite;

    fn id(&self) -> EntityId {
        self.sprite().id
    }

    fn position(&self) -> Vector2 {
        self.sprite().position
    }

    fn bounds(&self) -> Rect {
        self.sprite().bounds()
    }

    fn layer(&self) -> Layer {
        self.sprite().layer
    }

    fn animation_state(&self) -> AnimationState {
        self.sprite().animation.state()
    }

    fn set_animation_state(&mut self, state: AnimationState) {
        self.sprite_mut().animation.set_state(state);
    }
}

/// Pixel-mask collision between two entities.
pub fn collide_mask<A: Entity + ?Sized, B: Entity + ?Sized>(a: &A, b: &B) -> bool {
    a.sprite().collides_with(b.sprite())
}

/// Scaled-circle collision between two entities.
pub fn collide_circle<A: Entity + ?Sized, B: Entity + ?Sized>(a: &A, b: &B, ratio: f32) -> bool {
    a.sprite().collides_within_ratio(b.sprite(), ratio)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(position: Vector2) -> Sprite {
        Sprite::new(
            Layer::Wall,
            "wall",
            position,
            (50.0, 50.0),
            MaskShape::Solid,
            AnimationSpec::STATIC,
        )
    }

    #[test]
    fn test_layer_order() {
        assert!(Layer::Background < Layer::Wall);
        assert!(Layer::Enemy < Layer::Player);
        assert!(Layer::Player < Layer::Projectile);
    }

    #[test]
    fn test_set_same_state_keeps_frame() {
        let mut animation = Animation::new(AnimationSpec::ENEMY);
        animation.set_state(AnimationState::Walking);
        for _ in 0..6 {
            animation.tick();
        }
        assert_eq!(animation.frame(), 1);
        animation.set_state(AnimationState::Walking);
        assert_eq!(animation.frame(), 1);
        animation.set_state(AnimationState::Stopped);
        assert_eq!(animation.frame(), 0);
    }

    #[test]
    fn test_one_shot_completes_once() {
        let mut animation = Animation::new(AnimationSpec::PROJECTILE);
        animation.set_state(AnimationState::Exploding);
        let completions = (0..100)
            .map(|_| animation.tick())
            .filter(|progress| *progress == AnimationProgress::Completed(AnimationState::Exploding))
            .count();
        assert_eq!(completions, 1);
        assert_eq!(animation.frame(), 3);
    }

    #[test]
    fn test_looping_state_never_completes() {
        let mut animation = Animation::new(AnimationSpec::PLAYER);
        animation.set_state(AnimationState::Walking);
        assert!((0..200).all(|_| animation.tick() == AnimationProgress::Running));
    }

    #[test]
    fn test_mask_collision() {
        let a = square(Vector2::new(100.0, 100.0));
        assert!(a.collides_with(&square(Vector2::new(140.0, 100.0))));
        assert!(!a.collides_with(&square(Vector2::new(150.0, 100.0))));
    }

    #[test]
    fn test_circle_ratio_collision() {
        let a = square(Vector2::new(0.0, 0.0));
        let b = square(Vector2::new(60.0, 0.0));
        // radius = ratio * 35.36
        assert!(a.collides_within_ratio(&b, 1.0));
        assert!(!a.collides_within_ratio(&b, 0.6));
    }
}
