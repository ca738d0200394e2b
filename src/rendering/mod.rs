//! # Rendering Module
//!
//! Draw calls for rooms, the HUD and menus, using macroquad shapes.

pub mod display;
pub mod ui;

pub use display::*;
pub use ui::*;
