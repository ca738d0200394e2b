//! # Input Frames
//!
//! The per-tick snapshot of player intent. The simulation only ever sees an
//! [`InputFrame`], which keeps it independent of the windowing backend.

use crate::game::MovementFlags;
use crate::Vector2;

/// Everything the player asked for during one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputFrame {
    /// Held movement keys
    pub movement: MovementFlags,
    /// Fire button held
    pub firing: bool,
    /// Cursor position in room pixels
    pub aim: Vector2,
    /// Map overlay key held
    pub show_map: bool,
    /// Leave play for the main menu
    pub pause: bool,
}

impl InputFrame {
    /// A frame with nothing pressed and the cursor at `aim`.
    pub fn idle(aim: Vector2) -> Self {
        Self {
            aim,
            ..Self::default()
        }
    }

    /// Holds the key for `direction`.
    pub fn moving(mut self, direction: crate::game::Direction) -> Self {
        use crate::game::Direction;
        match direction {
            Direction::Up => self.movement.up = true,
            Direction::Right => self.movement.right = true,
            Direction::Down => self.movement.down = true,
            Direction::Left => self.movement.left = true,
        }
        self
    }

    pub fn firing_at(mut self, target: Vector2) -> Self {
        self.firing = true;
        self.aim = target;
        self
    }
}

/// Menu navigation commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCommand {
    Previous,
    Next,
    Select,
    Back,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Direction;

    #[test]
    fn test_frame_builders() {
        let frame = InputFrame::idle(Vector2::new(3.0, 4.0))
            .moving(Direction::Left)
            .moving(Direction::Up);
        assert!(frame.movement.left && frame.movement.up);
        assert!(!frame.firing);
        assert_eq!(frame.movement.direction(), Vector2::new(-1.0, -1.0));

        let shot = frame.firing_at(Vector2::new(10.0, 0.0));
        assert!(shot.firing);
        assert_eq!(shot.aim, Vector2::new(10.0, 0.0));
    }
}
