//! The renderer seam.
//!
//! Drawing lives outside the engine core. The frame loop hands the world to
//! a [`Renderer`] once per frame, after the lifecycle passes.

use engine_component::World;
use engine_defaults::Collider;
use tracing::trace;

pub trait Renderer: Send {
    fn render(&mut self, world: &World);
}

/// Draws nothing; counts frames and debug shapes.
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    frames: u64,
    debug_shapes: usize,
}

impl HeadlessRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Debug collider outlines that would have been drawn last frame.
    #[must_use]
    pub fn debug_shapes(&self) -> usize {
        self.debug_shapes
    }
}

impl Renderer for HeadlessRenderer {
    fn render(&mut self, world: &World) {
        self.frames += 1;
        self.debug_shapes = world
            .storage
            .entities_with::<Collider>()
            .into_iter()
            .filter_map(|e| {
                let collider = world.storage.get::<Collider>(e)?;
                (collider.draw_debug && collider.enabled)
                    .then(|| collider.world_shape(&world.storage, e))
                    .flatten()
            })
            .count();
        trace!(frame = self.frames, debug_shapes = self.debug_shapes, "frame rendered");
    }
}

#[cfg(test)]
mod tests {
    use engine_defaults::{Position, Scale, default_registry};

    use super::*;

    #[test]
    fn test_counts_debug_shapes() {
        let mut world = World::new(default_registry());
        for draw_debug in [true, false, true] {
            let e = world.spawn();
            world.add(e, Position::default()).unwrap();
            world.add(e, Scale::default()).unwrap();
            world
                .add(
                    e,
                    Collider {
                        draw_debug,
                        ..Collider::circle(4.0)
                    },
                )
                .unwrap();
        }

        let mut renderer = HeadlessRenderer::new();
        renderer.render(&world);
        renderer.render(&world);
        assert_eq!(renderer.frames(), 2);
        assert_eq!(renderer.debug_shapes(), 2);
    }
}
