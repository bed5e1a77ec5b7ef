//! Per-player bookkeeping.

use engine_component::{
    Component, ComponentKind, HookContext, HookResult, PropertyDescriptor, PropertyType,
};
use engine_math::Color;
use rand::Rng;

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerInfo {
    pub index: i32,
    pub name: String,
    pub color: Color,
    /// Seconds spent inside zones, minus the decay applied while away.
    pub time_spent_zone: f32,
    /// Grace period outside every zone before `time_spent_zone` decays.
    pub max_time_outside: f32,
    /// Set by a zone during the previous frame's late update.
    pub in_zone: bool,
    pub since_in_zone: f32,
}

impl Default for PlayerInfo {
    fn default() -> Self {
        Self {
            index: 0,
            name: String::new(),
            color: Color::WHITE,
            time_spent_zone: 0.0,
            max_time_outside: 3.0,
            in_zone: false,
            since_in_zone: 0.0,
        }
    }
}

impl PlayerInfo {
    /// Credit `dt` seconds of zone time.
    pub fn credit_zone_time(&mut self, dt: f32) {
        self.time_spent_zone += dt;
        self.in_zone = true;
    }
}

fn random_color() -> Color {
    let mut rng = rand::thread_rng();
    Color::rgb(rng.gen_range(40..=255), rng.gen_range(40..=255), rng.gen_range(40..=255))
}

impl Component for PlayerInfo {
    fn on_post_init(&mut self, _ctx: &mut HookContext<'_>) -> HookResult {
        if self.color == Color::WHITE {
            self.color = random_color();
        }
        Ok(())
    }

    fn on_play_update(&mut self, ctx: &mut HookContext<'_>) -> HookResult {
        if self.in_zone {
            self.since_in_zone = 0.0;
        } else {
            self.since_in_zone += ctx.dt();
            if self.since_in_zone > self.max_time_outside {
                self.time_spent_zone = (self.time_spent_zone - ctx.dt()).max(0.0);
            }
        }
        self.in_zone = false;
        Ok(())
    }
}

impl ComponentKind for PlayerInfo {
    const NAME: &'static str = "PlayerInfo";

    fn properties() -> Vec<PropertyDescriptor> {
        vec![
            PropertyDescriptor::field::<Self, i32>("index", PropertyType::Int, |c| &c.index, |c| &mut c.index),
            PropertyDescriptor::field::<Self, String>(
                "name",
                PropertyType::String,
                |c| &c.name,
                |c| &mut c.name,
            ),
            PropertyDescriptor::field::<Self, Color>("color", PropertyType::Color, |c| &c.color, |c| &mut c.color),
            PropertyDescriptor::field::<Self, f32>(
                "time_spent_zone",
                PropertyType::Float,
                |c| &c.time_spent_zone,
                |c| &mut c.time_spent_zone,
            ),
            PropertyDescriptor::field::<Self, f32>(
                "max_time_outside",
                PropertyType::Float,
                |c| &c.max_time_outside,
                |c| &mut c.max_time_outside,
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use engine_component::{Hook, World};

    use super::*;
    use crate::default_registry;

    #[test]
    fn test_post_init_picks_color_once() {
        let mut world = World::new(default_registry());
        let e = world.spawn();
        let slot = world.add(e, PlayerInfo::default()).unwrap();
        world.run_hook(slot, Hook::PostInit, 0.0).unwrap().unwrap();
        let picked = world.storage.get::<PlayerInfo>(e).unwrap().color;
        assert_ne!(picked, Color::WHITE);

        world.run_hook(slot, Hook::PostInit, 0.0).unwrap().unwrap();
        assert_eq!(world.storage.get::<PlayerInfo>(e).unwrap().color, picked);
    }

    #[test]
    fn test_zone_time_decays_after_grace_period() {
        let mut world = World::new(default_registry());
        let e = world.spawn();
        let slot = world
            .add(
                e,
                PlayerInfo {
                    time_spent_zone: 5.0,
                    max_time_outside: 1.0,
                    ..PlayerInfo::default()
                },
            )
            .unwrap();

        world.run_hook(slot, Hook::PlayUpdate, 1.0).unwrap().unwrap();
        assert_eq!(world.storage.get::<PlayerInfo>(e).unwrap().time_spent_zone, 5.0);

        world.run_hook(slot, Hook::PlayUpdate, 1.0).unwrap().unwrap();
        assert_eq!(world.storage.get::<PlayerInfo>(e).unwrap().time_spent_zone, 4.0);

        world.storage.get_mut::<PlayerInfo>(e).unwrap().credit_zone_time(0.5);
        world.run_hook(slot, Hook::PlayUpdate, 1.0).unwrap().unwrap();
        let info = world.storage.get::<PlayerInfo>(e).unwrap();
        assert_eq!(info.time_spent_zone, 4.5);
        assert_eq!(info.since_in_zone, 0.0);
        assert!(!info.in_zone);
    }
}
