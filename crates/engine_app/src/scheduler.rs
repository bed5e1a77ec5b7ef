//! Lifecycle scheduler.
//!
//! Each pass visits every live component, entities in ascending id order and
//! components in insertion order. The slot list is captured when the pass
//! starts, so components created during a pass are first visited by the
//! next one. A tombstoned component is skipped from the moment it is killed.
//!
//! A failing or panicking hook is logged and the pass moves on. Entity
//! removals requested by hooks are applied after each pass.

use engine_component::{Hook, HookFailure, World};
use tracing::{debug, error};

/// What a pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassReport {
    /// Hooks invoked.
    pub ran: usize,
    /// Hooks that returned an error or panicked.
    pub failed: usize,
    /// Entities removed by deferred commands after the pass.
    pub removed_entities: usize,
}

/// Drives the lifecycle passes and owns the global play-mode one-shot flags.
#[derive(Debug, Default)]
pub struct Scheduler {
    started: bool,
    late_started: bool,
}

impl Scheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn started(&self) -> bool {
        self.started
    }

    #[must_use]
    pub fn late_started(&self) -> bool {
        self.late_started
    }

    /// Arm the play-start passes again. Called on every play-mode entry
    /// and exit and on every scene load.
    pub fn reset_play_flags(&mut self) {
        self.started = false;
        self.late_started = false;
    }

    /// Run the passes of one frame. Play passes run only when `playing`.
    pub fn run_frame(&mut self, world: &mut World, playing: bool, dt: f32) {
        self.post_init_pass(world, dt);
        self.update_pass(world, dt);
        if playing {
            self.play_start_pass(world, dt);
            self.play_late_start_pass(world, dt);
            self.play_update_pass(world, dt);
            self.play_late_update_pass(world, dt);
        }
    }

    /// `on_post_init` for every component that has not had it yet.
    pub fn post_init_pass(&mut self, world: &mut World, dt: f32) -> PassReport {
        run_pass(world, Hook::PostInit, dt, |world, slot| {
            let Some(instance) = world.storage.slot_mut(slot) else {
                return false;
            };
            if instance.header.post_inited {
                return false;
            }
            instance.header.post_inited = true;
            true
        })
    }

    pub fn update_pass(&mut self, world: &mut World, dt: f32) -> PassReport {
        run_pass(world, Hook::Update, dt, |_, _| true)
    }

    /// `on_play_start` once per play-mode entry.
    pub fn play_start_pass(&mut self, world: &mut World, dt: f32) -> PassReport {
        if self.started {
            return PassReport::default();
        }
        self.started = true;
        run_pass(world, Hook::PlayStart, dt, |_, _| true)
    }

    /// `on_play_late_start` once per play-mode entry.
    pub fn play_late_start_pass(&mut self, world: &mut World, dt: f32) -> PassReport {
        if self.late_started {
            return PassReport::default();
        }
        self.late_started = true;
        run_pass(world, Hook::PlayLateStart, dt, |_, _| true)
    }

    pub fn play_update_pass(&mut self, world: &mut World, dt: f32) -> PassReport {
        run_pass(world, Hook::PlayUpdate, dt, |_, _| true)
    }

    pub fn play_late_update_pass(&mut self, world: &mut World, dt: f32) -> PassReport {
        run_pass(world, Hook::PlayLateUpdate, dt, |_, _| true)
    }
}

fn run_pass(
    world: &mut World,
    hook: Hook,
    dt: f32,
    mut admit: impl FnMut(&mut World, usize) -> bool,
) -> PassReport {
    let mut report = PassReport::default();
    for slot in world.storage.pass_order() {
        let Some((entity, kind)) = world
            .storage
            .slot(slot)
            .filter(|instance| !instance.is_dead())
            .map(|instance| (instance.entity(), instance.kind_name()))
        else {
            continue;
        };
        if !admit(world, slot) {
            continue;
        }
        let Some(outcome) = world.run_hook(slot, hook, dt) else {
            continue;
        };
        report.ran += 1;
        match outcome {
            Ok(()) => {}
            Err(HookFailure::Error(e)) => {
                report.failed += 1;
                error!(%entity, kind, hook = hook.name(), error = %e, "hook failed");
            }
            Err(HookFailure::Panic(message)) => {
                report.failed += 1;
                error!(%entity, kind, hook = hook.name(), message, "hook panicked");
            }
        }
    }
    report.removed_entities = world.apply_commands();
    if report.removed_entities > 0 {
        debug!(hook = hook.name(), removed = report.removed_entities, "applied deferred removals");
    }
    report
}

#[cfg(test)]
mod tests {
    use engine_component::{
        Component, ComponentError, ComponentKind, Entity, HookContext, HookResult, PropertyDescriptor,
        Registry,
    };

    use super::*;

    /// Counts every hook it sees.
    #[derive(Debug, Default)]
    struct Probe {
        post_init: u32,
        update: u32,
        play_start: u32,
        play_late_start: u32,
        play_update: u32,
        play_late_update: u32,
    }

    impl Component for Probe {
        fn on_post_init(&mut self, _ctx: &mut HookContext<'_>) -> HookResult {
            self.post_init += 1;
            Ok(())
        }

        fn on_update(&mut self, _ctx: &mut HookContext<'_>) -> HookResult {
            self.update += 1;
            Ok(())
        }

        fn on_play_start(&mut self, _ctx: &mut HookContext<'_>) -> HookResult {
            self.play_start += 1;
            Ok(())
        }

        fn on_play_late_start(&mut self, _ctx: &mut HookContext<'_>) -> HookResult {
            self.play_late_start += 1;
            Ok(())
        }

        fn on_play_update(&mut self, _ctx: &mut HookContext<'_>) -> HookResult {
            self.play_update += 1;
            Ok(())
        }

        fn on_play_late_update(&mut self, _ctx: &mut HookContext<'_>) -> HookResult {
            self.play_late_update += 1;
            Ok(())
        }
    }

    impl ComponentKind for Probe {
        const NAME: &'static str = "Probe";

        fn properties() -> Vec<PropertyDescriptor> {
            Vec::new()
        }
    }

    /// Fails on update, panics on play update.
    #[derive(Debug, Default)]
    struct Broken;

    impl Component for Broken {
        fn on_update(&mut self, _ctx: &mut HookContext<'_>) -> HookResult {
            Err(ComponentError::hook("Broken", "always fails"))
        }

        fn on_play_update(&mut self, _ctx: &mut HookContext<'_>) -> HookResult {
            panic!("broken on purpose");
        }
    }

    impl ComponentKind for Broken {
        const NAME: &'static str = "Broken";

        fn properties() -> Vec<PropertyDescriptor> {
            Vec::new()
        }
    }

    /// Kills a target entity's probe during update and removes another entity.
    #[derive(Debug, Default)]
    struct Killer {
        probe_on: Entity,
        doomed: Entity,
    }

    impl Component for Killer {
        fn on_update(&mut self, ctx: &mut HookContext<'_>) -> HookResult {
            ctx.remove_component::<Probe>(self.probe_on);
            ctx.remove_entity(self.doomed);
            Ok(())
        }
    }

    impl ComponentKind for Killer {
        const NAME: &'static str = "Killer";

        fn properties() -> Vec<PropertyDescriptor> {
            Vec::new()
        }
    }

    /// Adds a probe to a fresh entity on every update.
    #[derive(Debug, Default)]
    struct Spawner;

    impl Component for Spawner {
        fn on_update(&mut self, ctx: &mut HookContext<'_>) -> HookResult {
            let entity = ctx.spawn();
            ctx.add(entity, Probe::default())
        }
    }

    impl ComponentKind for Spawner {
        const NAME: &'static str = "Spawner";

        fn properties() -> Vec<PropertyDescriptor> {
            Vec::new()
        }
    }

    fn world() -> World {
        let mut registry = Registry::new();
        registry
            .register::<Probe>()
            .register::<Broken>()
            .register::<Killer>()
            .register::<Spawner>();
        World::new(registry)
    }

    fn probe(world: &World, entity: Entity) -> &Probe {
        world.storage.get::<Probe>(entity).unwrap()
    }

    #[test]
    fn test_post_init_runs_once_per_component() {
        let mut world = world();
        let e = world.spawn();
        world.add(e, Probe::default()).unwrap();
        let mut scheduler = Scheduler::new();

        for _ in 0..200 {
            scheduler.run_frame(&mut world, false, 0.016);
        }
        assert_eq!(probe(&world, e).post_init, 1);
        assert_eq!(probe(&world, e).update, 200);
        assert_eq!(probe(&world, e).play_update, 0);
    }

    #[test]
    fn test_play_start_once_per_entry() {
        let mut world = world();
        let e = world.spawn();
        world.add(e, Probe::default()).unwrap();
        let mut scheduler = Scheduler::new();

        for _ in 0..3 {
            scheduler.run_frame(&mut world, true, 0.016);
        }
        assert_eq!(probe(&world, e).play_start, 1);
        assert_eq!(probe(&world, e).play_late_start, 1);
        assert_eq!(probe(&world, e).play_update, 3);
        assert_eq!(probe(&world, e).play_late_update, 3);

        scheduler.reset_play_flags();
        scheduler.run_frame(&mut world, true, 0.016);
        assert_eq!(probe(&world, e).play_start, 2);
        assert_eq!(probe(&world, e).play_late_start, 2);
    }

    #[test]
    fn test_paused_frames_skip_play_passes_without_consuming_start() {
        let mut world = world();
        let e = world.spawn();
        world.add(e, Probe::default()).unwrap();
        let mut scheduler = Scheduler::new();

        scheduler.run_frame(&mut world, false, 0.016);
        assert!(!scheduler.started());
        scheduler.run_frame(&mut world, true, 0.016);
        assert!(scheduler.started() && scheduler.late_started());
        assert_eq!(probe(&world, e).play_start, 1);
    }

    #[test]
    fn test_failures_do_not_abort_pass() {
        let mut world = world();
        let a = world.spawn();
        world.add(a, Broken).unwrap();
        world.add(a, Probe::default()).unwrap();
        let b = world.spawn();
        world.add(b, Probe::default()).unwrap();
        let mut scheduler = Scheduler::new();

        let update = scheduler.update_pass(&mut world, 0.016);
        assert_eq!(update, PassReport { ran: 3, failed: 1, removed_entities: 0 });
        let play = scheduler.play_update_pass(&mut world, 0.016);
        assert_eq!(play.failed, 1);
        assert_eq!(probe(&world, a).play_update, 1);
        assert_eq!(probe(&world, b).play_update, 1);
        assert!(world.storage.has_kind(a, "Broken"));
    }

    #[test]
    fn test_tombstones_and_deferred_removal() {
        let mut world = world();
        let killer = world.spawn();
        let target = world.spawn();
        let doomed = world.spawn();
        world.add(target, Probe::default()).unwrap();
        world.add(doomed, Probe::default()).unwrap();
        world
            .add(killer, Killer { probe_on: target, doomed })
            .unwrap();
        let mut scheduler = Scheduler::new();

        let report = scheduler.update_pass(&mut world, 0.016);
        // The killer runs first; the target's probe is already dead when
        // its turn comes, the doomed entity still updates this pass.
        assert_eq!(report.ran, 2);
        assert_eq!(report.removed_entities, 1);
        assert!(!world.storage.contains_entity(doomed));
        assert!(world.storage.get::<Probe>(target).is_none());
        assert_eq!(world.storage.dead_count(), 1);

        scheduler.update_pass(&mut world, 0.016);
        assert_eq!(world.sweep_dead(), 1);
        assert_eq!(world.storage.dead_count(), 0);
    }

    #[test]
    fn test_components_added_mid_pass_wait_for_next_pass() {
        let mut world = world();
        let e = world.spawn();
        world.add(e, Spawner).unwrap();
        let mut scheduler = Scheduler::new();

        let report = scheduler.update_pass(&mut world, 0.016);
        assert_eq!(report.ran, 1);
        let spawned = world.storage.entities_with::<Probe>();
        assert_eq!(spawned.len(), 1);
        assert_eq!(probe(&world, spawned[0]).update, 0);

        scheduler.update_pass(&mut world, 0.016);
        assert_eq!(world.storage.entities_with::<Probe>().len(), 2);
        assert_eq!(probe(&world, spawned[0]).update, 1);
    }
}
