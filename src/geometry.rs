//! Geometry kernel.
//!
//! Pure functions over world-space points, angles and circles. Screen-space
//! conventions apply: x grows to the east, y grows to the south.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

/// A point in world space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle given by two corners (inclusive).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl Rect {
    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }
}

/// One of eight compass facings, used to pick a sprite frame.
///
/// The discriminant is the sector index produced by [`direction_from_angle`]:
/// sector 0 is east and sectors advance clockwise on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    East = 0,
    SouthEast = 1,
    South = 2,
    SouthWest = 3,
    West = 4,
    NorthWest = 5,
    North = 6,
    NorthEast = 7,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
        Direction::North,
        Direction::NorthEast,
    ];

    /// Sector index, also the sprite frame for this facing.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % 8]
    }
}

/// Angle of `p1` as seen from `p2`, in `(-π, π]`.
pub fn angle_between(p1: Point, p2: Point) -> f32 {
    (p1.y - p2.y).atan2(p1.x - p2.x)
}

/// Travel angle of a move from `from` towards `to`.
pub fn bearing(from: Point, to: Point) -> f32 {
    angle_between(to, from)
}

/// Maps any angle into `[0, 2π)`.
pub fn normalize_angle(radians: f32) -> f32 {
    let t = radians % TAU;
    let t = if t < 0.0 { TAU + t } else { t };
    // TAU + tiny negative can round up to TAU itself.
    if t >= TAU {
        0.0
    } else {
        t
    }
}

/// Buckets an angle into one of eight sectors.
///
/// Uses `f32::round`, so an angle exactly on a half-sector boundary rounds
/// away from zero into the next sector.
pub fn direction_from_angle(radians: f32) -> Direction {
    let normal = normalize_angle(radians) / TAU;
    Direction::from_index((normal * 8.0).round() as usize % 8)
}

pub fn distance(p1: Point, p2: Point) -> f32 {
    (p2.x - p1.x).hypot(p2.y - p1.y)
}

/// Point at `radius` from the centre. Sine drives x and cosine drives y.
pub fn point_on_circle(cx: f32, cy: f32, angle: f32, radius: f32) -> Point {
    Point::new(cx + angle.sin() * radius, cy + angle.cos() * radius)
}

/// Scatter point around a centre: uniform angle, uniform radius in
/// `[0, max_radius)`. Not area-uniform.
pub fn random_point_in_circle(rng: &mut impl Rng, cx: f32, cy: f32, max_radius: f32) -> Point {
    let angle = rng.gen_range(0.0..TAU);
    let radius = if max_radius > 0.0 {
        rng.gen_range(0.0..max_radius)
    } else {
        0.0
    };
    point_on_circle(cx, cy, angle, radius)
}

/// True when two circles touch or overlap.
pub fn circles_intersect(x1: f32, y1: f32, r1: f32, x2: f32, y2: f32, r2: f32) -> bool {
    (x1 - x2).hypot(y1 - y2) <= r1 + r2
}

pub fn point_in_circle(point: Point, cx: f32, cy: f32, radius: f32) -> bool {
    (point.x - cx).hypot(point.y - cy) <= radius
}

pub fn point_in_rect(point: Point, rect: &Rect) -> bool {
    point.x >= rect.x1 && point.y >= rect.y1 && point.x <= rect.x2 && point.y <= rect.y2
}

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
