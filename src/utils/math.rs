//! # Game Mathematics
//!
//! World-space vectors, axis-aligned rectangles and the discrete line walk used
//! for line-of-sight checks.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul, Sub};

/// A point or displacement in room pixel space.
///
/// Serialized as a two-element array `[x, y]`, which is how level files store
/// positions.
///
/// # Examples
///
/// ```
/// use reverie::Vector2;
///
/// let a = Vector2::new(0.0, 0.0);
/// let b = Vector2::new(3.0, 4.0);
/// assert_eq!(a.distance_to(b), 5.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f32; 2]", into = "[f32; 2]")]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

impl Vector2 {
    /// Creates a new vector.
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// The zero vector.
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0)
    }

    /// Unit vector pointing at `degrees`, measured clockwise from +X in screen space.
    pub fn from_angle(degrees: f32) -> Self {
        let radians = degrees.to_radians();
        Self::new(radians.cos(), radians.sin())
    }

    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    pub fn length_squared(self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    pub fn distance_to(self, other: Vector2) -> f32 {
        (other - self).length()
    }

    /// Returns the unit vector in the same direction, or zero for a zero vector.
    pub fn normalize_or_zero(self) -> Self {
        let length = self.length();
        if length <= f32::EPSILON {
            Self::zero()
        } else {
            Self::new(self.x / length, self.y / length)
        }
    }

    /// Rescales the vector to `length`, keeping its direction.
    pub fn scale_to_length(self, length: f32) -> Self {
        self.normalize_or_zero() * length
    }

    /// Heading of this vector in degrees, in the same convention as [`Vector2::from_angle`].
    pub fn angle(self) -> f32 {
        self.y.atan2(self.x).to_degrees()
    }

    /// Rounds both components to the nearest pixel.
    pub fn to_pixel(self) -> (i32, i32) {
        (self.x.round() as i32, self.y.round() as i32)
    }
}

impl From<[f32; 2]> for Vector2 {
    fn from(value: [f32; 2]) -> Self {
        Self::new(value[0], value[1])
    }
}

impl From<Vector2> for [f32; 2] {
    fn from(value: Vector2) -> Self {
        [value.x, value.y]
    }
}

impl From<(f32, f32)> for Vector2 {
    fn from(value: (f32, f32)) -> Self {
        Self::new(value.0, value.1)
    }
}

impl Add for Vector2 {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl AddAssign for Vector2 {
    fn add_assign(&mut self, other: Self) {
        self.x += other.x;
        self.y += other.y;
    }
}

impl Sub for Vector2 {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

impl Mul<f32> for Vector2 {
    type Output = Self;

    fn mul(self, scalar: f32) -> Self {
        Self::new(self.x * scalar, self.y * scalar)
    }
}

/// Axis-aligned rectangle in pixel space, `x`/`y` being the top-left corner.
///
/// Point containment is half-open: the right and bottom edges are outside.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Creates a rectangle of the given size centered on `center`.
    pub fn from_center(center: Vector2, w: f32, h: f32) -> Self {
        Self::new(center.x - w / 2.0, center.y - h / 2.0, w, h)
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> Vector2 {
        Vector2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    pub fn mid_bottom(&self) -> Vector2 {
        Vector2::new(self.x + self.w / 2.0, self.bottom())
    }

    pub fn mid_left(&self) -> Vector2 {
        Vector2::new(self.x, self.y + self.h / 2.0)
    }

    pub fn mid_right(&self) -> Vector2 {
        Vector2::new(self.right(), self.y + self.h / 2.0)
    }

    /// Checks whether `point` lies inside the rectangle.
    ///
    /// # Examples
    ///
    /// ```
    /// use reverie::{Rect, Vector2};
    ///
    /// let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
    /// assert!(rect.contains_point(Vector2::new(0.0, 9.5)));
    /// assert!(!rect.contains_point(Vector2::new(10.0, 5.0)));
    /// ```
    pub fn contains_point(&self, point: Vector2) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    /// Checks if this rectangle overlaps another one.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Grows the rectangle by `dw` horizontally and `dh` vertically, keeping its center.
    pub fn inflate(&self, dw: f32, dh: f32) -> Rect {
        Rect::new(self.x - dw / 2.0, self.y - dh / 2.0, self.w + dw, self.h + dh)
    }
}

/// Walks the discrete line between two pixels (Bresenham), endpoints included.
///
/// # Examples
///
/// ```
/// use reverie::line_points;
///
/// let line = line_points((0, 0), (3, 1));
/// assert_eq!(line.first(), Some(&(0, 0)));
/// assert_eq!(line.last(), Some(&(3, 1)));
/// assert_eq!(line.len(), 4);
/// ```
pub fn line_points(start: (i32, i32), end: (i32, i32)) -> Vec<(i32, i32)> {
    let (mut x0, mut y0) = start;
    let (x1, y1) = end;
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let step_x = if x0 < x1 { 1 } else { -1 };
    let step_y = if y0 < y1 { 1 } else { -1 };
    let mut error = dx + dy;

    let mut points = Vec::with_capacity((dx.max(-dy) + 1) as usize);
    loop {
        points.push((x0, y0));
        if x0 == x1 && y0 == y1 {
            break;
        }
        let doubled = 2 * error;
        if doubled >= dy {
            error += dy;
            x0 += step_x;
        }
        if doubled <= dx {
            error += dx;
            y0 += step_y;
        }
    }
    points
}

/// Heading in degrees from `origin` toward `target`.
pub fn angle_to(origin: Vector2, target: Vector2) -> f32 {
    (target - origin).angle()
}
