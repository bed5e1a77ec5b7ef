//! The view of the world a lifecycle hook runs against.

use crate::component::{ComponentInstance, ComponentKind, ComponentTypeId, Hook, HookResult};
use crate::entity::{Entity, EntityAllocator};
use crate::storage::Storage;

/// A structural change requested from inside a hook and applied once the
/// running pass has finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    RemoveEntity(Entity),
}

/// Queue of deferred [`Command`]s, applied in request order.
#[derive(Debug, Default)]
pub struct Commands {
    queue: Vec<Command>,
}

impl Commands {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: Command) {
        self.queue.push(command);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Apply every queued command to `storage`, emptying the queue.
    ///
    /// Returns the number of commands that changed something.
    pub fn apply(&mut self, storage: &mut Storage) -> usize {
        let mut applied = 0;
        for command in self.queue.drain(..) {
            match command {
                Command::RemoveEntity(entity) => {
                    if storage.remove_entity(entity) {
                        applied += 1;
                    }
                }
            }
        }
        applied
    }
}

/// Passed to every lifecycle hook.
///
/// The component whose hook is running has been moved out of storage for the
/// duration of the call, so looking up its own kind on its own entity through
/// the context returns `None`.
///
/// Storage is only reachable read-only or through the methods below. Nothing
/// a hook does can release a slot while the pass is iterating: entity removal
/// is queued and components are only tombstoned.
pub struct HookContext<'a> {
    entity: Entity,
    kind: ComponentTypeId,
    dt: f32,
    storage: &'a mut Storage,
    allocator: &'a mut EntityAllocator,
    commands: &'a mut Commands,
    remove_self: bool,
}

impl<'a> HookContext<'a> {
    pub fn new(
        entity: Entity,
        kind: ComponentTypeId,
        dt: f32,
        storage: &'a mut Storage,
        allocator: &'a mut EntityAllocator,
        commands: &'a mut Commands,
    ) -> Self {
        Self {
            entity,
            kind,
            dt,
            storage,
            allocator,
            commands,
            remove_self: false,
        }
    }

    /// The entity owning the component whose hook is running.
    #[must_use]
    pub fn entity(&self) -> Entity {
        self.entity
    }

    /// Seconds elapsed since the previous frame.
    #[must_use]
    pub fn dt(&self) -> f32 {
        self.dt
    }

    #[must_use]
    pub fn storage(&self) -> &Storage {
        self.storage
    }

    #[must_use]
    pub fn get<T: ComponentKind>(&self, entity: Entity) -> Option<&T> {
        self.storage.get::<T>(entity)
    }

    pub fn get_mut<T: ComponentKind>(&mut self, entity: Entity) -> Option<&mut T> {
        self.storage.get_mut::<T>(entity)
    }

    #[must_use]
    pub fn has<T: ComponentKind>(&self, entity: Entity) -> bool {
        self.storage.get::<T>(entity).is_some()
    }

    #[must_use]
    pub fn find_first<T: ComponentKind>(&self) -> Option<(Entity, &T)> {
        self.storage.find_first::<T>()
    }

    #[must_use]
    pub fn entities_with<T: ComponentKind>(&self) -> Vec<Entity> {
        self.storage.entities_with::<T>()
    }

    /// Allocate a new, empty entity.
    pub fn spawn(&mut self) -> Entity {
        let entity = self.allocator.allocate();
        self.storage.ensure_entity(entity);
        entity
    }

    /// Create a component on `entity`, running its `on_init` hook first.
    ///
    /// The component is attached even when `on_init` fails; the error is
    /// returned to the caller.
    pub fn add<T: ComponentKind>(&mut self, entity: Entity, value: T) -> HookResult {
        let (_, result) = init_and_attach(
            self.storage,
            self.allocator,
            self.commands,
            ComponentInstance::new(entity, value),
            self.dt,
        );
        result
    }

    /// Tombstone every live `T` on `entity`, including the running component
    /// itself if it matches. Takes effect immediately.
    pub fn remove_component<T: ComponentKind>(&mut self, entity: Entity) -> usize {
        self.remove_component_named(entity, T::NAME)
    }

    pub fn remove_component_named(&mut self, entity: Entity, kind: &str) -> usize {
        let mut removed = self.storage.remove_component(entity, kind);
        if entity == self.entity && ComponentTypeId::from_name(kind) == self.kind && !self.remove_self {
            self.remove_self = true;
            removed += 1;
        }
        removed
    }

    /// Remove `entity` once the current pass completes.
    pub fn remove_entity(&mut self, entity: Entity) {
        self.commands.push(Command::RemoveEntity(entity));
    }

    /// Returns `true` if the running component tombstoned itself.
    #[must_use]
    pub fn removes_self(&self) -> bool {
        self.remove_self
    }
}

/// Run `on_init` on a fresh instance, then append it to its entity.
pub(crate) fn init_and_attach(
    storage: &mut Storage,
    allocator: &mut EntityAllocator,
    commands: &mut Commands,
    mut instance: ComponentInstance,
    dt: f32,
) -> (usize, HookResult) {
    let mut ctx = HookContext::new(
        instance.entity(),
        instance.kind(),
        dt,
        storage,
        allocator,
        commands,
    );
    let result = instance.run_hook(Hook::Init, &mut ctx);
    if ctx.removes_self() {
        instance.kill();
    }
    let slot = storage.attach(instance);
    (slot, result)
}
