//! Scoring zones and the manager that spawns them.
//!
//! A zone is a growing circular trigger. While it lives it records the
//! players standing inside it and credits them once per frame in the late
//! update. It removes its own entity when its lifetime runs out.

use engine_component::{
    Component, ComponentKind, Entity, HookContext, HookResult, PropertyDescriptor, PropertyType,
};
use engine_math::Shape;
use rand::Rng;
use tracing::debug;

use crate::collider::Collider;
use crate::player::PlayerInfo;
use crate::transform::{Position, Scale};

#[derive(Debug, Clone, PartialEq)]
pub struct Zone {
    pub vanish_after_secs: f32,
    pub min_radius: f32,
    pub max_radius: f32,
    /// Radius gained per second.
    pub growth_rate: f32,
    pub since_spawn_secs: f32,
    pub players_inside: Vec<Entity>,
}

impl Default for Zone {
    fn default() -> Self {
        Self {
            vanish_after_secs: 10.0,
            min_radius: 20.0,
            max_radius: 120.0,
            growth_rate: 5.0,
            since_spawn_secs: 0.0,
            players_inside: Vec::new(),
        }
    }
}

impl Component for Zone {
    fn on_init(&mut self, ctx: &mut HookContext<'_>) -> HookResult {
        if let Some((_, manager)) = ctx.find_first::<ZoneManager>() {
            self.min_radius = manager.min_radius;
            self.max_radius = manager.max_radius;
            self.growth_rate = manager.growth_rate;
        }
        Ok(())
    }

    fn on_play_update(&mut self, ctx: &mut HookContext<'_>) -> HookResult {
        let entity = ctx.entity();
        let dt = ctx.dt();
        self.since_spawn_secs += dt;

        if self.since_spawn_secs >= self.vanish_after_secs {
            if let Some(collider) = ctx.get_mut::<Collider>(entity) {
                collider.enabled = false;
            }
            debug!(%entity, lived = self.since_spawn_secs, "zone vanished");
            ctx.remove_entity(entity);
            return Ok(());
        }

        let Some(collider) = ctx.get_mut::<Collider>(entity) else {
            return Ok(());
        };
        collider.radius = (collider.radius + self.growth_rate * dt).clamp(self.min_radius, self.max_radius);

        let Some(Shape::Circle(area)) = ctx
            .get::<Collider>(entity)
            .and_then(|c| c.world_shape(ctx.storage(), entity))
        else {
            return Ok(());
        };
        for player in ctx.entities_with::<PlayerInfo>() {
            let inside = ctx
                .get::<Position>(player)
                .is_some_and(|p| area.contains(p.vec()));
            if inside && !self.players_inside.contains(&player) {
                self.players_inside.push(player);
            }
        }
        Ok(())
    }

    fn on_play_late_update(&mut self, ctx: &mut HookContext<'_>) -> HookResult {
        let dt = ctx.dt();
        for player in std::mem::take(&mut self.players_inside) {
            if let Some(info) = ctx.get_mut::<PlayerInfo>(player) {
                info.credit_zone_time(dt);
            }
        }
        Ok(())
    }
}

impl ComponentKind for Zone {
    const NAME: &'static str = "Zone";
    const REQUIRES: &'static [&'static str] = &["Collider"];

    fn properties() -> Vec<PropertyDescriptor> {
        vec![
            PropertyDescriptor::field::<Self, f32>(
                "vanish_after_secs",
                PropertyType::Float,
                |c| &c.vanish_after_secs,
                |c| &mut c.vanish_after_secs,
            ),
            PropertyDescriptor::field::<Self, f32>(
                "since_spawn_secs",
                PropertyType::Float,
                |c| &c.since_spawn_secs,
                |c| &mut c.since_spawn_secs,
            )
            .transient(),
        ]
    }
}

/// Spawns a zone of random size, place and lifetime every `spawn_every_secs`
/// while playing.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneManager {
    pub spawn_every_secs: f32,
    pub min_radius: f32,
    pub max_radius: f32,
    pub growth_rate: f32,
    pub min_secs: f32,
    pub max_secs: f32,
    pub arena_width: f32,
    pub arena_height: f32,
    pub show_debug_visuals: bool,
    pub until_next_spawn: f32,
}

impl Default for ZoneManager {
    fn default() -> Self {
        Self {
            spawn_every_secs: 5.0,
            min_radius: 20.0,
            max_radius: 120.0,
            growth_rate: 5.0,
            min_secs: 5.0,
            max_secs: 15.0,
            arena_width: 1280.0,
            arena_height: 720.0,
            show_debug_visuals: true,
            until_next_spawn: 0.0,
        }
    }
}

fn random_between(rng: &mut impl Rng, low: f32, high: f32) -> f32 {
    if high > low { rng.gen_range(low..=high) } else { low }
}

impl ZoneManager {
    fn spawn_zone(&self, ctx: &mut HookContext<'_>) -> Result<Entity, engine_component::ComponentError> {
        let mut rng = rand::thread_rng();
        let radius = random_between(&mut rng, self.min_radius, self.max_radius);
        let x = random_between(&mut rng, radius, self.arena_width - radius);
        let y = random_between(&mut rng, radius, self.arena_height - radius);
        let lifetime = random_between(&mut rng, self.min_secs, self.max_secs);

        let zone = ctx.spawn();
        ctx.add(zone, Position::new(x, y))?;
        ctx.add(zone, Scale::default())?;
        ctx.add(
            zone,
            Collider {
                is_trigger: true,
                draw_debug: self.show_debug_visuals,
                ..Collider::circle(radius)
            },
        )?;
        ctx.add(
            zone,
            Zone {
                vanish_after_secs: lifetime,
                min_radius: self.min_radius,
                max_radius: self.max_radius,
                growth_rate: self.growth_rate,
                ..Zone::default()
            },
        )?;
        debug!(entity = %zone, x, y, radius, lifetime, "spawned zone");
        Ok(zone)
    }
}

impl Component for ZoneManager {
    fn on_play_start(&mut self, _ctx: &mut HookContext<'_>) -> HookResult {
        self.until_next_spawn = self.spawn_every_secs;
        Ok(())
    }

    fn on_play_update(&mut self, ctx: &mut HookContext<'_>) -> HookResult {
        self.until_next_spawn -= ctx.dt();
        if self.until_next_spawn > 0.0 {
            return Ok(());
        }
        self.until_next_spawn = self.spawn_every_secs;
        self.spawn_zone(ctx)?;
        Ok(())
    }
}

impl ComponentKind for ZoneManager {
    const NAME: &'static str = "ZoneManager";

    fn properties() -> Vec<PropertyDescriptor> {
        vec![
            PropertyDescriptor::field::<Self, f32>(
                "spawn_every_secs",
                PropertyType::Float,
                |c| &c.spawn_every_secs,
                |c| &mut c.spawn_every_secs,
            ),
            PropertyDescriptor::field::<Self, f32>(
                "min_radius",
                PropertyType::Float,
                |c| &c.min_radius,
                |c| &mut c.min_radius,
            ),
            PropertyDescriptor::field::<Self, f32>(
                "max_radius",
                PropertyType::Float,
                |c| &c.max_radius,
                |c| &mut c.max_radius,
            ),
            PropertyDescriptor::field::<Self, f32>(
                "growth_rate",
                PropertyType::Float,
                |c| &c.growth_rate,
                |c| &mut c.growth_rate,
            ),
            PropertyDescriptor::field::<Self, f32>("min_secs", PropertyType::Float, |c| &c.min_secs, |c| &mut c.min_secs),
            PropertyDescriptor::field::<Self, f32>("max_secs", PropertyType::Float, |c| &c.max_secs, |c| &mut c.max_secs),
            PropertyDescriptor::field::<Self, f32>(
                "arena_width",
                PropertyType::Float,
                |c| &c.arena_width,
                |c| &mut c.arena_width,
            ),
            PropertyDescriptor::field::<Self, f32>(
                "arena_height",
                PropertyType::Float,
                |c| &c.arena_height,
                |c| &mut c.arena_height,
            ),
            PropertyDescriptor::field::<Self, bool>(
                "show_debug_visuals",
                PropertyType::Bool,
                |c| &c.show_debug_visuals,
                |c| &mut c.show_debug_visuals,
            ),
            PropertyDescriptor::field::<Self, f32>(
                "until_next_spawn",
                PropertyType::Float,
                |c| &c.until_next_spawn,
                |c| &mut c.until_next_spawn,
            )
            .transient(),
        ]
    }
}
