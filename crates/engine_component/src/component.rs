//! Core [`Component`] trait, lifecycle hooks and the type-erased instance
//! wrapper stored in [`Storage`](crate::Storage).
//!
//! A component kind is a plain Rust struct implementing two traits:
//!
//! - [`Component`]: the lifecycle hooks. Every hook has a no-op default, so
//!   a kind only overrides the stages it cares about.
//! - [`ComponentKind`]: the static description: registered name, required
//!   co-components and the reflected property list.
//!
//! Instances are boxed behind [`ErasedComponent`], which is blanket-implemented
//! for every [`ComponentKind`] and acts as the per-kind dispatch table.
//!
//! ## Kind identity
//!
//! [`ComponentTypeId`] is derived from the kind's **string name** using the
//! FNV-1a 64-bit hash algorithm, so the same name always maps to the same id
//! regardless of registration order.

use std::any::Any;

use crate::context::HookContext;
use crate::entity::Entity;
use crate::error::ComponentError;
use crate::property::PropertyDescriptor;

/// Result type returned by every lifecycle hook.
pub type HookResult = Result<(), ComponentError>;

/// A unique identifier for a component kind, derived from its string name
/// using the FNV-1a 64-bit hash algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentTypeId(pub u64);

impl ComponentTypeId {
    /// FNV-1a 64-bit offset basis.
    const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;

    /// FNV-1a 64-bit prime.
    const FNV_PRIME: u64 = 0x0100_0000_01b3;

    /// Compute the [`ComponentTypeId`] from a kind name.
    ///
    /// # Algorithm (FNV-1a 64-bit)
    ///
    /// ```text
    /// hash = 0xcbf29ce484222325          (offset basis)
    /// for each byte in name.as_bytes():
    ///     hash = hash XOR byte
    ///     hash = hash * 0x00000100000001b3  (prime)
    /// return hash
    /// ```
    #[must_use]
    pub const fn from_name(name: &str) -> Self {
        let bytes = name.as_bytes();
        let mut hash = Self::FNV_OFFSET_BASIS;
        let mut i = 0;
        while i < bytes.len() {
            hash ^= bytes[i] as u64;
            hash = hash.wrapping_mul(Self::FNV_PRIME);
            i += 1;
        }
        Self(hash)
    }

    /// Compute the [`ComponentTypeId`] for a Rust component kind `T`.
    #[must_use]
    pub const fn of<T: ComponentKind>() -> Self {
        Self::from_name(T::NAME)
    }
}

/// The lifecycle stages a component can take part in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hook {
    /// Fires once, synchronously, when the component is created.
    Init,
    /// Fires once, on the first frame the component is seen alive.
    PostInit,
    /// Fires every frame.
    Update,
    /// Fires once per play session, before the first play update.
    PlayStart,
    /// Fires once per play session, right after [`Hook::PlayStart`].
    PlayLateStart,
    /// Fires every frame while play mode is running.
    PlayUpdate,
    /// Fires every frame while play mode is running, after [`Hook::PlayUpdate`].
    PlayLateUpdate,
}

impl Hook {
    /// Returns the hook's method-style name, used in log output.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Init => "on_init",
            Self::PostInit => "on_post_init",
            Self::Update => "on_update",
            Self::PlayStart => "on_play_start",
            Self::PlayLateStart => "on_play_late_start",
            Self::PlayUpdate => "on_play_update",
            Self::PlayLateUpdate => "on_play_late_update",
        }
    }
}

/// Lifecycle hooks of a component kind.
///
/// Every hook defaults to a no-op. Hooks receive a [`HookContext`] giving
/// access to the owning entity, the frame delta and the rest of the world.
///
/// # Examples
///
/// ```rust
/// use engine_component::{Component, ComponentKind, HookContext, HookResult, PropertyDescriptor, PropertyType};
///
/// #[derive(Debug, Default)]
/// struct Lifetime {
///     remaining: f32,
/// }
///
/// impl Component for Lifetime {
///     fn on_play_update(&mut self, ctx: &mut HookContext<'_>) -> HookResult {
///         self.remaining -= ctx.dt();
///         if self.remaining <= 0.0 {
///             let entity = ctx.entity();
///             ctx.remove_entity(entity);
///         }
///         Ok(())
///     }
/// }
///
/// impl ComponentKind for Lifetime {
///     const NAME: &'static str = "Lifetime";
///
///     fn properties() -> Vec<PropertyDescriptor> {
///         vec![PropertyDescriptor::field::<Self, f32>(
///             "remaining",
///             PropertyType::Float,
///             |c| &c.remaining,
///             |c| &mut c.remaining,
///         )]
///     }
/// }
/// ```
pub trait Component: Send + 'static {
    fn on_init(&mut self, _ctx: &mut HookContext<'_>) -> HookResult {
        Ok(())
    }

    fn on_post_init(&mut self, _ctx: &mut HookContext<'_>) -> HookResult {
        Ok(())
    }

    fn on_update(&mut self, _ctx: &mut HookContext<'_>) -> HookResult {
        Ok(())
    }

    fn on_play_start(&mut self, _ctx: &mut HookContext<'_>) -> HookResult {
        Ok(())
    }

    fn on_play_late_start(&mut self, _ctx: &mut HookContext<'_>) -> HookResult {
        Ok(())
    }

    fn on_play_update(&mut self, _ctx: &mut HookContext<'_>) -> HookResult {
        Ok(())
    }

    fn on_play_late_update(&mut self, _ctx: &mut HookContext<'_>) -> HookResult {
        Ok(())
    }
}

/// Static description of a component kind.
pub trait ComponentKind: Component + Default + Sized {
    /// The registered kind name, as it appears in scene documents.
    const NAME: &'static str;

    /// Kinds that must coexist on the same entity.
    const REQUIRES: &'static [&'static str] = &[];

    /// The reflected properties of this kind, in declaration order.
    fn properties() -> Vec<PropertyDescriptor>;
}

/// Object-safe view of a component, blanket-implemented for every
/// [`ComponentKind`].
pub trait ErasedComponent: Send {
    /// The registered kind name.
    fn kind_name(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Dispatch `hook` to the matching [`Component`] method.
    fn run_hook(&mut self, hook: Hook, ctx: &mut HookContext<'_>) -> HookResult;
}

impl<T: ComponentKind> ErasedComponent for T {
    fn kind_name(&self) -> &'static str {
        T::NAME
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn run_hook(&mut self, hook: Hook, ctx: &mut HookContext<'_>) -> HookResult {
        match hook {
            Hook::Init => self.on_init(ctx),
            Hook::PostInit => self.on_post_init(ctx),
            Hook::Update => self.on_update(ctx),
            Hook::PlayStart => self.on_play_start(ctx),
            Hook::PlayLateStart => self.on_play_late_start(ctx),
            Hook::PlayUpdate => self.on_play_update(ctx),
            Hook::PlayLateUpdate => self.on_play_late_update(ctx),
        }
    }
}

/// Per-instance bookkeeping kept next to every component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentHeader {
    /// The owning entity. A lookup key, not an ownership edge.
    pub entity: Entity,
    /// Tombstone: the component is scheduled for removal and skipped by every pass.
    pub is_dead: bool,
    /// Guards the one-shot post-init stage.
    pub post_inited: bool,
}

impl ComponentHeader {
    #[must_use]
    pub const fn new(entity: Entity) -> Self {
        Self {
            entity,
            is_dead: false,
            post_inited: false,
        }
    }
}

/// A type-erased component together with its header.
pub struct ComponentInstance {
    pub header: ComponentHeader,
    kind: ComponentTypeId,
    data: Box<dyn ErasedComponent>,
}

impl ComponentInstance {
    /// Wrap a concrete component value.
    #[must_use]
    pub fn new<T: ComponentKind>(entity: Entity, value: T) -> Self {
        Self {
            header: ComponentHeader::new(entity),
            kind: ComponentTypeId::of::<T>(),
            data: Box::new(value),
        }
    }

    /// Wrap an already boxed component (used by registry constructors).
    #[must_use]
    pub fn from_boxed(entity: Entity, data: Box<dyn ErasedComponent>) -> Self {
        Self {
            header: ComponentHeader::new(entity),
            kind: ComponentTypeId::from_name(data.kind_name()),
            data,
        }
    }

    #[must_use]
    pub fn kind(&self) -> ComponentTypeId {
        self.kind
    }

    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        self.data.kind_name()
    }

    #[must_use]
    pub fn entity(&self) -> Entity {
        self.header.entity
    }

    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.header.is_dead
    }

    /// Tombstone this component.
    pub fn kill(&mut self) {
        self.header.is_dead = true;
    }

    #[must_use]
    pub fn is<T: ComponentKind>(&self) -> bool {
        self.kind == ComponentTypeId::of::<T>()
    }

    #[must_use]
    pub fn downcast_ref<T: ComponentKind>(&self) -> Option<&T> {
        self.data.as_any().downcast_ref::<T>()
    }

    #[must_use]
    pub fn downcast_mut<T: ComponentKind>(&mut self) -> Option<&mut T> {
        self.data.as_any_mut().downcast_mut::<T>()
    }

    #[must_use]
    pub fn data(&self) -> &dyn ErasedComponent {
        self.data.as_ref()
    }

    pub fn data_mut(&mut self) -> &mut dyn ErasedComponent {
        self.data.as_mut()
    }

    /// Run one lifecycle hook on this instance.
    pub fn run_hook(&mut self, hook: Hook, ctx: &mut HookContext<'_>) -> HookResult {
        self.data.run_hook(hook, ctx)
    }
}

impl std::fmt::Debug for ComponentInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentInstance")
            .field("kind", &self.kind_name())
            .field("header", &self.header)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::PropertyType;

    #[derive(Debug, Default, PartialEq)]
    struct Health {
        current: f32,
        max: f32,
    }

    impl Component for Health {}

    impl ComponentKind for Health {
        const NAME: &'static str = "Health";

        fn properties() -> Vec<PropertyDescriptor> {
            vec![
                PropertyDescriptor::field::<Self, f32>(
                    "current",
                    PropertyType::Float,
                    |c| &c.current,
                    |c| &mut c.current,
                ),
                PropertyDescriptor::field::<Self, f32>(
                    "max",
                    PropertyType::Float,
                    |c| &c.max,
                    |c| &mut c.max,
                ),
            ]
        }
    }

    #[test]
    fn test_component_type_id_matches_from_name() {
        assert_eq!(
            ComponentTypeId::of::<Health>(),
            ComponentTypeId::from_name("Health")
        );
        assert_ne!(
            ComponentTypeId::from_name("Health"),
            ComponentTypeId::from_name("Velocity")
        );
    }

    #[test]
    fn test_fnv1a_known_vector() {
        assert_eq!(
            ComponentTypeId::from_name(""),
            ComponentTypeId(0xcbf2_9ce4_8422_2325)
        );
    }

    #[test]
    fn test_instance_header_defaults() {
        let inst = ComponentInstance::new(Entity(7), Health::default());
        assert_eq!(inst.entity(), Entity(7));
        assert!(!inst.is_dead());
        assert!(!inst.header.post_inited);
        assert_eq!(inst.kind_name(), "Health");
    }

    #[test]
    fn test_instance_downcast() {
        let mut inst = ComponentInstance::new(
            Entity(1),
            Health {
                current: 5.0,
                max: 10.0,
            },
        );
        assert!(inst.is::<Health>());
        inst.downcast_mut::<Health>().unwrap().current = 8.0;
        assert_eq!(inst.downcast_ref::<Health>().unwrap().current, 8.0);
    }

    #[test]
    fn test_from_boxed_derives_kind() {
        let inst = ComponentInstance::from_boxed(Entity(1), Box::new(Health::default()));
        assert_eq!(inst.kind(), ComponentTypeId::of::<Health>());
    }

    #[test]
    fn test_kill_sets_tombstone() {
        let mut inst = ComponentInstance::new(Entity(1), Health::default());
        inst.kill();
        assert!(inst.is_dead());
    }
}
