//! 2D shapes and overlap tests.
//!
//! Rectangles are axis-aligned and stored by their top-left corner. All
//! tests are inclusive: touching edges count as overlapping.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A rectangle of the given size centred on `center`.
    #[must_use]
    pub fn from_center(center: Vec2, width: f32, height: f32) -> Self {
        Self::new(center.x - width / 2.0, center.y - height / 2.0, width, height)
    }

    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }

    /// The point of this rectangle closest to `point`.
    #[must_use]
    pub fn closest_point(&self, point: Vec2) -> Vec2 {
        Vec2::new(
            point.x.clamp(self.x, self.x + self.width),
            point.y.clamp(self.y, self.y + self.height),
        )
    }

    #[must_use]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x <= other.x + other.width
            && other.x <= self.x + self.width
            && self.y <= other.y + other.height
            && other.y <= self.y + self.height
    }
}

/// A circle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
}

impl Circle {
    #[must_use]
    pub const fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }

    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        self.center.distance_squared(point) <= self.radius * self.radius
    }

    #[must_use]
    pub fn intersects(&self, other: &Circle) -> bool {
        self.center.distance(other.center) <= self.radius + other.radius
    }

    #[must_use]
    pub fn intersects_rect(&self, rect: &Rect) -> bool {
        self.center.distance(rect.closest_point(self.center)) <= self.radius
    }
}

/// Either shape, for collision code that does not care which.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Rect(Rect),
    Circle(Circle),
}

impl Shape {
    #[must_use]
    pub fn intersects(&self, other: &Shape) -> bool {
        match (self, other) {
            (Shape::Rect(a), Shape::Rect(b)) => a.intersects(b),
            (Shape::Circle(a), Shape::Circle(b)) => a.intersects(b),
            (Shape::Rect(r), Shape::Circle(c)) | (Shape::Circle(c), Shape::Rect(r)) => {
                c.intersects_rect(r)
            }
        }
    }
}
