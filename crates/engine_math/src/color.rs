//! RGBA colors.

use serde::{Deserialize, Serialize};

/// An 8-bit-per-channel RGBA color, persisted as `{r, g, b, a}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    #[serde(default = "opaque")]
    pub a: u8,
}

fn opaque() -> u8 {
    255
}

impl Color {
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const RED: Self = Self::rgb(230, 41, 55);
    pub const GREEN: Self = Self::rgb(0, 228, 48);
    pub const BLUE: Self = Self::rgb(0, 121, 241);
    pub const YELLOW: Self = Self::rgb(253, 249, 0);

    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// The same color with alpha scaled by `factor` (clamped to `0..=1`).
    #[must_use]
    pub fn fade(self, factor: f32) -> Self {
        let alpha = (f32::from(self.a) * factor.clamp(0.0, 1.0)).round() as u8;
        Self { a: alpha, ..self }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}
