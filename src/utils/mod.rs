//! # Utilities Module
//!
//! Utility functions for mathematics, pathfinding, and general game operations.

pub mod math;
pub mod pathfinding;

pub use math::*;
pub use self::pathfinding::*;
