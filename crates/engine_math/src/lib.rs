//! # engine_math
//!
//! 2D math for the engine. Re-exports [`glam`]'s vector type and adds the
//! value types component properties are built from: [`Color`], [`Rect`],
//! [`Circle`] and the [`Shape`] overlap tests used by collision code.

pub mod color;
pub mod shape;

// Re-export glam types for convenience.
pub use glam::Vec2;

pub use color::Color;
pub use shape::{Circle, Rect, Shape};
