//! Collision shapes and trigger contacts.
//!
//! A collider is positioned by its entity's [`Position`] and sized by its
//! [`Scale`]. Rectangles are centred on the position. Each play frame an
//! enabled collider records every other enabled collider it overlaps.

use engine_component::{
    Component, ComponentKind, Entity, HookContext, HookResult, PropertyDescriptor, PropertyType,
    Storage,
};
use engine_math::{Circle, Color, Rect, Shape, Vec2};
use serde::{Deserialize, Serialize};

use crate::transform::{Position, Scale};

const SHAPE_NAMES: &[&str] = &["None", "Rectangle", "Circle"];

/// Geometry of a [`Collider`], persisted by name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColliderShape {
    #[default]
    None,
    Rectangle,
    Circle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Collider {
    pub shape: ColliderShape,
    pub is_trigger: bool,
    pub width: f32,
    pub height: f32,
    pub radius: f32,
    pub is_static: bool,
    pub draw_debug: bool,
    /// Outline thickness used by debug drawing.
    pub thickness: i32,
    pub color: Color,
    pub enabled: bool,
    /// Entities whose colliders overlapped this one during the last play frame.
    pub contacts: Vec<Entity>,
}

impl Default for Collider {
    fn default() -> Self {
        Self {
            shape: ColliderShape::None,
            is_trigger: false,
            width: 32.0,
            height: 32.0,
            radius: 16.0,
            is_static: false,
            draw_debug: false,
            thickness: 4,
            color: Color::GREEN,
            enabled: true,
            contacts: Vec::new(),
        }
    }
}

impl Collider {
    #[must_use]
    pub fn circle(radius: f32) -> Self {
        Self {
            shape: ColliderShape::Circle,
            radius,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn rectangle(width: f32, height: f32) -> Self {
        Self {
            shape: ColliderShape::Rectangle,
            width,
            height,
            ..Self::default()
        }
    }

    /// The collider's shape placed at `position` and scaled by `scale`.
    #[must_use]
    pub fn shape_at(&self, position: Vec2, scale: Vec2) -> Option<Shape> {
        match self.shape {
            ColliderShape::None => None,
            ColliderShape::Rectangle => Some(Shape::Rect(Rect::from_center(
                position,
                self.width * scale.x,
                self.height * scale.y,
            ))),
            ColliderShape::Circle => Some(Shape::Circle(Circle::new(
                position,
                self.radius * scale.x.max(scale.y),
            ))),
        }
    }

    /// The shape of this collider as attached to `entity`.
    ///
    /// A missing [`Position`] places it at the origin; a missing [`Scale`]
    /// leaves it unscaled.
    #[must_use]
    pub fn world_shape(&self, storage: &Storage, entity: Entity) -> Option<Shape> {
        let position = storage.get::<Position>(entity).map_or(Vec2::ZERO, Position::vec);
        let scale = storage.get::<Scale>(entity).map_or(Vec2::ONE, Scale::vec);
        self.shape_at(position, scale)
    }

    fn clamp_extents(&mut self) {
        self.width = self.width.max(0.0);
        self.height = self.height.max(0.0);
        self.radius = self.radius.max(0.0);
    }
}

impl Component for Collider {
    fn on_play_update(&mut self, ctx: &mut HookContext<'_>) -> HookResult {
        self.contacts.clear();
        if !self.enabled {
            return Ok(());
        }
        let entity = ctx.entity();
        let Some(own) = self.world_shape(ctx.storage(), entity) else {
            return Ok(());
        };

        for other in ctx.entities_with::<Collider>() {
            if other == entity {
                continue;
            }
            let Some(collider) = ctx.get::<Collider>(other).filter(|c| c.enabled) else {
                continue;
            };
            if collider
                .world_shape(ctx.storage(), other)
                .is_some_and(|shape| own.intersects(&shape))
            {
                self.contacts.push(other);
            }
        }
        Ok(())
    }
}

impl ComponentKind for Collider {
    const NAME: &'static str = "Collider";
    const REQUIRES: &'static [&'static str] = &["Scale"];

    fn properties() -> Vec<PropertyDescriptor> {
        vec![
            PropertyDescriptor::field::<Self, ColliderShape>(
                "shape",
                PropertyType::Enum(SHAPE_NAMES),
                |c| &c.shape,
                |c| &mut c.shape,
            ),
            PropertyDescriptor::field::<Self, bool>(
                "is_trigger",
                PropertyType::Bool,
                |c| &c.is_trigger,
                |c| &mut c.is_trigger,
            ),
            PropertyDescriptor::field::<Self, f32>("width", PropertyType::Float, |c| &c.width, |c| &mut c.width)
                .on_change::<Self>(Self::clamp_extents),
            PropertyDescriptor::field::<Self, f32>("height", PropertyType::Float, |c| &c.height, |c| &mut c.height)
                .on_change::<Self>(Self::clamp_extents),
            PropertyDescriptor::field::<Self, f32>("radius", PropertyType::Float, |c| &c.radius, |c| &mut c.radius)
                .on_change::<Self>(Self::clamp_extents),
            PropertyDescriptor::field::<Self, bool>(
                "static",
                PropertyType::Bool,
                |c| &c.is_static,
                |c| &mut c.is_static,
            ),
            PropertyDescriptor::field::<Self, bool>(
                "draw_debug",
                PropertyType::Bool,
                |c| &c.draw_debug,
                |c| &mut c.draw_debug,
            ),
            PropertyDescriptor::field::<Self, i32>(
                "thickness",
                PropertyType::Int,
                |c| &c.thickness,
                |c| &mut c.thickness,
            ),
            PropertyDescriptor::field::<Self, Color>("color", PropertyType::Color, |c| &c.color, |c| &mut c.color)
                .transient(),
            PropertyDescriptor::field::<Self, bool>(
                "enabled",
                PropertyType::Bool,
                |c| &c.enabled,
                |c| &mut c.enabled,
            )
            .transient(),
        ]
    }
}
