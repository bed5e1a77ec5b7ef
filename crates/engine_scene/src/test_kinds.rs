//! Small component kinds shared by the scene tests.

use engine_component::{
    Component, ComponentKind, HookContext, HookResult, PropertyDescriptor, PropertyType, Registry,
    World,
};

#[derive(Debug, Default, PartialEq)]
pub struct Mover {
    pub speed: f32,
    pub ticks: u32,
}

impl Component for Mover {
    fn on_update(&mut self, _ctx: &mut HookContext<'_>) -> HookResult {
        self.ticks += 1;
        Ok(())
    }
}

impl ComponentKind for Mover {
    const NAME: &'static str = "Mover";

    fn properties() -> Vec<PropertyDescriptor> {
        vec![
            PropertyDescriptor::field::<Self, f32>(
                "speed",
                PropertyType::Float,
                |c| &c.speed,
                |c| &mut c.speed,
            ),
            PropertyDescriptor::field::<Self, u32>(
                "ticks",
                PropertyType::Int,
                |c| &c.ticks,
                |c| &mut c.ticks,
            )
            .transient(),
        ]
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct Body {
    pub width: f32,
    pub height: f32,
    pub inited: bool,
}

impl Component for Body {
    fn on_init(&mut self, _ctx: &mut HookContext<'_>) -> HookResult {
        self.inited = true;
        Ok(())
    }
}

impl ComponentKind for Body {
    const NAME: &'static str = "Body";

    fn properties() -> Vec<PropertyDescriptor> {
        vec![
            PropertyDescriptor::field::<Self, f32>(
                "width",
                PropertyType::Float,
                |c| &c.width,
                |c| &mut c.width,
            ),
            PropertyDescriptor::field::<Self, f32>(
                "height",
                PropertyType::Float,
                |c| &c.height,
                |c| &mut c.height,
            ),
        ]
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct Trigger {
    pub radius: f32,
}

impl Component for Trigger {}

impl ComponentKind for Trigger {
    const NAME: &'static str = "Trigger";
    const REQUIRES: &'static [&'static str] = &["Body"];

    fn properties() -> Vec<PropertyDescriptor> {
        vec![PropertyDescriptor::field::<Self, f32>(
            "radius",
            PropertyType::Float,
            |c| &c.radius,
            |c| &mut c.radius,
        )]
    }
}

pub fn registry() -> Registry {
    let mut registry = Registry::new();
    registry
        .register::<Mover>()
        .register::<Body>()
        .register::<Trigger>();
    registry
}

pub fn world() -> World {
    World::new(registry())
}
