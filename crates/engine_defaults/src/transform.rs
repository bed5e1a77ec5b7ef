//! Placement and motion kinds.

use engine_component::{
    Component, ComponentKind, HookContext, HookResult, PropertyDescriptor, PropertyType,
};
use engine_math::Vec2;

/// World-space position of an entity.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn vec(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

impl Component for Position {}

impl ComponentKind for Position {
    const NAME: &'static str = "Position";

    fn properties() -> Vec<PropertyDescriptor> {
        vec![
            PropertyDescriptor::field::<Self, f32>("x", PropertyType::Float, |c| &c.x, |c| &mut c.x),
            PropertyDescriptor::field::<Self, f32>("y", PropertyType::Float, |c| &c.y, |c| &mut c.y),
        ]
    }
}

/// Per-axis size multiplier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale {
    pub x: f32,
    pub y: f32,
}

impl Scale {
    #[must_use]
    pub fn vec(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

impl Default for Scale {
    fn default() -> Self {
        Self { x: 1.0, y: 1.0 }
    }
}

impl Component for Scale {}

impl ComponentKind for Scale {
    const NAME: &'static str = "Scale";

    fn properties() -> Vec<PropertyDescriptor> {
        vec![
            PropertyDescriptor::field::<Self, f32>("x", PropertyType::Float, |c| &c.x, |c| &mut c.x),
            PropertyDescriptor::field::<Self, f32>("y", PropertyType::Float, |c| &c.y, |c| &mut c.y),
        ]
    }
}

/// Units per second. Moves the entity's [`Position`] while playing, scaled
/// by its [`Speed`] when it has one.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Velocity {
    pub x: f32,
    pub y: f32,
}

impl Component for Velocity {
    fn on_play_update(&mut self, ctx: &mut HookContext<'_>) -> HookResult {
        let entity = ctx.entity();
        let dt = ctx.dt();
        let factor = ctx.get::<Speed>(entity).map_or(1.0, |s| s.value);
        if let Some(position) = ctx.get_mut::<Position>(entity) {
            position.x += self.x * factor * dt;
            position.y += self.y * factor * dt;
        }
        Ok(())
    }
}

impl ComponentKind for Velocity {
    const NAME: &'static str = "Velocity";

    fn properties() -> Vec<PropertyDescriptor> {
        vec![
            PropertyDescriptor::field::<Self, f32>("x", PropertyType::Float, |c| &c.x, |c| &mut c.x),
            PropertyDescriptor::field::<Self, f32>("y", PropertyType::Float, |c| &c.y, |c| &mut c.y),
        ]
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Speed {
    pub value: f32,
}

impl Component for Speed {}

impl ComponentKind for Speed {
    const NAME: &'static str = "Speed";

    fn properties() -> Vec<PropertyDescriptor> {
        vec![PropertyDescriptor::field::<Self, f32>(
            "value",
            PropertyType::Float,
            |c| &c.value,
            |c| &mut c.value,
        )]
    }
}

/// A free-form label.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tag {
    pub value: String,
}

impl Component for Tag {}

impl ComponentKind for Tag {
    const NAME: &'static str = "Tag";

    fn properties() -> Vec<PropertyDescriptor> {
        vec![PropertyDescriptor::field::<Self, String>(
            "value",
            PropertyType::String,
            |c| &c.value,
            |c| &mut c.value,
        )]
    }
}
