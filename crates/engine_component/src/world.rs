//! The [`World`] aggregate: storage, identity generator and registry.

use std::panic::{self, AssertUnwindSafe};

use tracing::debug;

use crate::component::{ComponentInstance, ComponentKind, Hook};
use crate::context::{Commands, HookContext, init_and_attach};
use crate::entity::{Entity, EntityAllocator};
use crate::error::ComponentError;
use crate::registry::Registry;
use crate::storage::Storage;

/// Why a single hook invocation failed.
#[derive(Debug, thiserror::Error)]
pub enum HookFailure {
    #[error(transparent)]
    Error(#[from] ComponentError),
    #[error("panicked: {0}")]
    Panic(String),
}

/// Entity storage plus everything needed to mutate it.
#[derive(Debug, Default)]
pub struct World {
    pub storage: Storage,
    pub allocator: EntityAllocator,
    pub registry: Registry,
    commands: Commands,
}

impl World {
    #[must_use]
    pub fn new(registry: Registry) -> Self {
        Self {
            storage: Storage::new(),
            allocator: EntityAllocator::new(),
            registry,
            commands: Commands::new(),
        }
    }

    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Allocate a fresh entity with an empty component list.
    pub fn spawn(&mut self) -> Entity {
        let entity = self.allocator.allocate();
        self.storage.ensure_entity(entity);
        entity
    }

    /// Run `on_init` on `instance` and append it to its entity.
    ///
    /// The instance is attached even when `on_init` fails.
    ///
    /// # Errors
    ///
    /// Returns the error reported by `on_init`.
    pub fn insert(&mut self, instance: ComponentInstance) -> Result<usize, ComponentError> {
        let (slot, result) = init_and_attach(
            &mut self.storage,
            &mut self.allocator,
            &mut self.commands,
            instance,
            0.0,
        );
        result.map(|()| slot)
    }

    /// Typed form of [`insert`](Self::insert).
    ///
    /// # Errors
    ///
    /// Returns the error reported by `on_init`.
    pub fn add<T: ComponentKind>(&mut self, entity: Entity, value: T) -> Result<usize, ComponentError> {
        self.insert(ComponentInstance::new(entity, value))
    }

    /// Construct a registered kind by name on `entity`.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::UnknownKind`] for unregistered names, or the
    /// error reported by `on_init`.
    pub fn add_by_name(&mut self, entity: Entity, kind: &str) -> Result<usize, ComponentError> {
        let instance = self.registry.create_for(kind, entity)?;
        self.insert(instance)
    }

    pub fn remove_entity(&mut self, entity: Entity) -> bool {
        self.storage.remove_entity(entity)
    }

    pub fn remove_component(&mut self, entity: Entity, kind: &str) -> usize {
        self.storage.remove_component(entity, kind)
    }

    pub fn sweep_dead(&mut self) -> usize {
        let swept = self.storage.sweep_dead();
        if swept > 0 {
            debug!(swept, "swept dead components");
        }
        swept
    }

    /// Drop every entity. The identity generator keeps counting so no id is
    /// handed out twice.
    pub fn clear(&mut self) {
        self.storage.clear();
        self.commands = Commands::new();
    }

    /// Run `hook` on the live component in `slot`.
    ///
    /// Returns `None` when the slot is empty or tombstoned. Errors and panics
    /// raised by the hook are caught and returned; the component is put back
    /// in its slot either way.
    pub fn run_hook(&mut self, slot: usize, hook: Hook, dt: f32) -> Option<Result<(), HookFailure>> {
        if self.storage.slot(slot).is_none_or(ComponentInstance::is_dead) {
            return None;
        }
        let mut instance = self.storage.take_slot(slot)?;
        let mut ctx = HookContext::new(
            instance.entity(),
            instance.kind(),
            dt,
            &mut self.storage,
            &mut self.allocator,
            &mut self.commands,
        );
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| instance.run_hook(hook, &mut ctx)));
        let remove_self = ctx.removes_self();
        if remove_self {
            instance.kill();
        }
        self.storage.restore_slot(slot, instance);

        Some(match outcome {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(HookFailure::Error(e)),
            Err(payload) => Err(HookFailure::Panic(panic_message(payload.as_ref()))),
        })
    }

    /// Apply structural changes queued by hooks.
    pub fn apply_commands(&mut self) -> usize {
        self.commands.apply(&mut self.storage)
    }

    #[must_use]
    pub fn pending_commands(&self) -> usize {
        self.commands.len()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{Component, HookResult};
    use crate::property::PropertyDescriptor;

    #[derive(Debug, Default)]
    struct Ticker {
        ticks: u32,
    }

    impl Component for Ticker {
        fn on_update(&mut self, _ctx: &mut HookContext<'_>) -> HookResult {
            self.ticks += 1;
            Ok(())
        }
    }

    impl ComponentKind for Ticker {
        const NAME: &'static str = "Ticker";

        fn properties() -> Vec<PropertyDescriptor> {
            Vec::new()
        }
    }

    #[derive(Debug, Default)]
    struct Faulty;

    impl Component for Faulty {
        fn on_update(&mut self, _ctx: &mut HookContext<'_>) -> HookResult {
            Err(ComponentError::hook("Faulty", "always fails"))
        }

        fn on_play_update(&mut self, _ctx: &mut HookContext<'_>) -> HookResult {
            panic!("boom");
        }
    }

    impl ComponentKind for Faulty {
        const NAME: &'static str = "Faulty";

        fn properties() -> Vec<PropertyDescriptor> {
            Vec::new()
        }
    }

    #[derive(Debug, Default)]
    struct Reaper;

    impl Component for Reaper {
        fn on_update(&mut self, ctx: &mut HookContext<'_>) -> HookResult {
            for victim in ctx.entities_with::<Ticker>() {
                ctx.remove_entity(victim);
            }
            let me = ctx.entity();
            ctx.remove_component::<Reaper>(me);
            Ok(())
        }
    }

    impl ComponentKind for Reaper {
        const NAME: &'static str = "Reaper";

        fn properties() -> Vec<PropertyDescriptor> {
            Vec::new()
        }
    }

    #[derive(Debug, Default)]
    struct SelfDestruct {
        runs: u32,
    }

    impl Component for SelfDestruct {
        fn on_update(&mut self, ctx: &mut HookContext<'_>) -> HookResult {
            self.runs += 1;
            let me = ctx.entity();
            ctx.remove_entity(me);
            Ok(())
        }
    }

    impl ComponentKind for SelfDestruct {
        const NAME: &'static str = "SelfDestruct";

        fn properties() -> Vec<PropertyDescriptor> {
            Vec::new()
        }
    }

    fn world() -> World {
        let mut registry = Registry::new();
        registry
            .register::<Ticker>()
            .register::<Faulty>()
            .register::<Reaper>()
            .register::<SelfDestruct>();
        World::new(registry)
    }

    #[test]
    fn test_add_by_name_and_unknown_kind() {
        let mut world = world();
        let e = world.spawn();
        world.add_by_name(e, "Ticker").unwrap();
        assert!(world.storage.has_kind(e, "Ticker"));
        assert!(matches!(
            world.add_by_name(e, "Ghost"),
            Err(ComponentError::UnknownKind(_))
        ));
    }

    #[test]
    fn test_run_hook_restores_component() {
        let mut world = world();
        let e = world.spawn();
        let slot = world.add(e, Ticker::default()).unwrap();
        assert!(world.run_hook(slot, Hook::Update, 0.016).unwrap().is_ok());
        assert!(world.run_hook(slot, Hook::Update, 0.016).unwrap().is_ok());
        assert_eq!(world.storage.get::<Ticker>(e).unwrap().ticks, 2);
    }

    #[test]
    fn test_run_hook_reports_errors_and_panics() {
        let mut world = world();
        let e = world.spawn();
        let slot = world.add(e, Faulty).unwrap();

        let err = world.run_hook(slot, Hook::Update, 0.0).unwrap().unwrap_err();
        assert!(matches!(err, HookFailure::Error(ComponentError::Hook { .. })));

        let err = world.run_hook(slot, Hook::PlayUpdate, 0.0).unwrap().unwrap_err();
        assert!(matches!(err, HookFailure::Panic(ref msg) if msg == "boom"));
        assert!(world.storage.has_kind(e, "Faulty"));
    }

    #[test]
    fn test_dead_slot_is_skipped() {
        let mut world = world();
        let e = world.spawn();
        let slot = world.add(e, Ticker::default()).unwrap();
        world.remove_component(e, "Ticker");
        assert!(world.run_hook(slot, Hook::Update, 0.0).is_none());
    }

    #[test]
    fn test_hook_commands_are_deferred() {
        let mut world = world();
        let victim = world.spawn();
        world.add(victim, Ticker::default()).unwrap();
        let reaper = world.spawn();
        let slot = world.add(reaper, Reaper).unwrap();

        world.run_hook(slot, Hook::Update, 0.0).unwrap().unwrap();
        assert!(world.storage.contains_entity(victim));
        assert_eq!(world.pending_commands(), 1);
        // The reaper tombstoned itself.
        assert!(!world.storage.has_kind(reaper, "Reaper"));

        assert_eq!(world.apply_commands(), 1);
        assert!(!world.storage.contains_entity(victim));
        assert_eq!(world.sweep_dead(), 1);
    }

    #[test]
    fn test_removing_own_entity_keeps_slot_until_pass_ends() {
        let mut world = world();
        let e = world.spawn();
        let slot = world.add(e, SelfDestruct::default()).unwrap();

        world.run_hook(slot, Hook::Update, 0.0).unwrap().unwrap();
        assert_eq!(world.storage.get::<SelfDestruct>(e).unwrap().runs, 1);
        assert_eq!(world.storage.slot(slot).map(ComponentInstance::entity), Some(e));

        assert_eq!(world.apply_commands(), 1);
        assert!(!world.storage.contains_entity(e));
        assert!(world.storage.slot(slot).is_none());
    }

    #[test]
    fn test_clear_keeps_counting_ids() {
        let mut world = world();
        let first = world.spawn();
        world.clear();
        let second = world.spawn();
        assert!(second.id() > first.id());
        assert_eq!(world.storage.entity_count(), 1);
    }
}
