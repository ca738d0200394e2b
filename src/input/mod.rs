//! # Input Module
//!
//! Polls the keyboard and mouse through macroquad and turns them into
//! [`InputFrame`]s and menu commands.

pub mod commands;

pub use commands::*;

use crate::game::MovementFlags;
use crate::Vector2;
use macroquad::prelude::*;

/// Input handler for processing player commands.
pub struct InputHandler {
    /// Arrow keys move as well as WASD
    pub arrow_keys_enabled: bool,
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl InputHandler {
    /// Creates a new input handler.
    ///
    /// # Examples
    ///
    /// ```
    /// use reverie::InputHandler;
    ///
    /// let input_handler = InputHandler::new();
    /// assert!(input_handler.arrow_keys_enabled);
    /// ```
    pub fn new() -> Self {
        Self {
            arrow_keys_enabled: true,
        }
    }

    fn held(&self, key: KeyCode, arrow: KeyCode) -> bool {
        is_key_down(key) || (self.arrow_keys_enabled && is_key_down(arrow))
    }

    /// Reads the current play input. `scale` is the ratio of window pixels
    /// to room pixels, used to map the cursor into the room.
    pub fn poll(&self, scale: f32) -> InputFrame {
        let movement = MovementFlags {
            up: self.held(KeyCode::W, KeyCode::Up),
            down: self.held(KeyCode::S, KeyCode::Down),
            left: self.held(KeyCode::A, KeyCode::Left),
            right: self.held(KeyCode::D, KeyCode::Right),
        };
        let (mouse_x, mouse_y) = mouse_position();
        let scale = if scale > 0.0 { scale } else { 1.0 };

        InputFrame {
            movement,
            firing: is_mouse_button_down(MouseButton::Left) || is_key_down(KeyCode::Space),
            aim: Vector2::new(mouse_x / scale, mouse_y / scale),
            show_map: is_key_down(KeyCode::Tab),
            pause: is_key_pressed(KeyCode::P),
        }
    }

    /// Reads a menu navigation key press, if any.
    pub fn menu_command(&self) -> Option<MenuCommand> {
        if is_key_pressed(KeyCode::Up) || is_key_pressed(KeyCode::W) {
            return Some(MenuCommand::Previous);
        }
        if is_key_pressed(KeyCode::Down) || is_key_pressed(KeyCode::S) {
            return Some(MenuCommand::Next);
        }
        if is_key_pressed(KeyCode::Enter) || is_key_pressed(KeyCode::Space) {
            return Some(MenuCommand::Select);
        }
        if is_key_pressed(KeyCode::Escape) {
            return Some(MenuCommand::Back);
        }
        None
    }
}
