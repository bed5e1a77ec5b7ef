//! Entity storage.
//!
//! All component instances live in one slot arena (`Vec<Option<_>>` plus a
//! free list). Each entity maps to the ordered list of slots it owns, so
//! iteration over an entity's components follows insertion order.
//!
//! # Tombstones
//!
//! Removing a component only flips its `is_dead` flag. Dead components are
//! invisible to lookups and lifecycle passes but keep their slot until
//! [`Storage::sweep_dead`] runs. Removing an entity is immediate: its slots are
//! released without tombstoning.
//!
//! # Taken slots
//!
//! A lifecycle pass moves a component out of its slot while its hook runs
//! ([`Storage::take_slot`] / [`Storage::restore_slot`]) so the hook can borrow
//! the rest of the storage mutably. A taken slot reads as empty.

use std::collections::BTreeMap;

use crate::component::{ComponentInstance, ComponentKind, ComponentTypeId};
use crate::entity::Entity;

/// Slot arena of component instances indexed by entity.
#[derive(Debug, Default)]
pub struct Storage {
    slots: Vec<Option<ComponentInstance>>,
    free: Vec<usize>,
    entities: BTreeMap<Entity, Vec<usize>>,
}

impl Storage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ── Entities ────────────────────────────────────────────────────

    /// Make sure `entity` has a (possibly empty) component list.
    pub fn ensure_entity(&mut self, entity: Entity) {
        self.entities.entry(entity).or_default();
    }

    #[must_use]
    pub fn contains_entity(&self, entity: Entity) -> bool {
        self.entities.contains_key(&entity)
    }

    /// All entities, in ascending id order.
    #[must_use]
    pub fn entities(&self) -> Vec<Entity> {
        self.entities.keys().copied().collect()
    }

    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Drop an entity and all of its components immediately.
    ///
    /// Must not be called while a lifecycle pass is iterating the storage.
    /// Returns `false` if the entity did not exist.
    pub fn remove_entity(&mut self, entity: Entity) -> bool {
        let Some(slots) = self.entities.remove(&entity) else {
            return false;
        };
        for slot in slots {
            self.release(slot);
        }
        true
    }

    /// Drop every entity and component.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.entities.clear();
    }

    // ── Components ──────────────────────────────────────────────────

    /// Append `instance` to its owner's component list, creating the entity
    /// entry if needed. Returns the slot index.
    pub fn attach(&mut self, instance: ComponentInstance) -> usize {
        let entity = instance.entity();
        let slot = match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(instance);
                slot
            }
            None => {
                self.slots.push(Some(instance));
                self.slots.len() - 1
            }
        };
        self.entities.entry(entity).or_default().push(slot);
        slot
    }

    /// Slots owned by `entity`, in insertion order (including dead and taken ones).
    #[must_use]
    pub fn slots_of(&self, entity: Entity) -> &[usize] {
        self.entities.get(&entity).map_or(&[][..], Vec::as_slice)
    }

    /// Every slot in pass order: entities ascending, then insertion order.
    #[must_use]
    pub fn pass_order(&self) -> Vec<usize> {
        self.entities.values().flatten().copied().collect()
    }

    #[must_use]
    pub fn slot(&self, slot: usize) -> Option<&ComponentInstance> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    pub fn slot_mut(&mut self, slot: usize) -> Option<&mut ComponentInstance> {
        self.slots.get_mut(slot).and_then(Option::as_mut)
    }

    /// Move the instance out of `slot`. The slot stays reserved.
    pub fn take_slot(&mut self, slot: usize) -> Option<ComponentInstance> {
        self.slots.get_mut(slot).and_then(Option::take)
    }

    /// Put an instance taken with [`take_slot`](Self::take_slot) back.
    pub fn restore_slot(&mut self, slot: usize, instance: ComponentInstance) {
        if let Some(cell) = self.slots.get_mut(slot) {
            *cell = Some(instance);
        }
    }

    /// Components of `entity` in insertion order, dead ones included.
    pub fn components(&self, entity: Entity) -> impl Iterator<Item = &ComponentInstance> + '_ {
        self.slots_of(entity)
            .iter()
            .filter_map(|&slot| self.slot(slot))
    }

    /// Live components of `entity` in insertion order.
    pub fn live_components(&self, entity: Entity) -> impl Iterator<Item = &ComponentInstance> + '_ {
        self.components(entity).filter(|c| !c.is_dead())
    }

    /// Slot of the first live component of `kind` on `entity`.
    #[must_use]
    pub fn find_slot(&self, entity: Entity, kind: ComponentTypeId) -> Option<usize> {
        self.slots_of(entity).iter().copied().find(|&slot| {
            self.slot(slot)
                .is_some_and(|c| !c.is_dead() && c.kind() == kind)
        })
    }

    /// First live component named `kind` on `entity`.
    #[must_use]
    pub fn find_by_name(&self, entity: Entity, kind: &str) -> Option<&ComponentInstance> {
        let slot = self.find_slot(entity, ComponentTypeId::from_name(kind))?;
        self.slot(slot)
    }

    pub fn find_by_name_mut(&mut self, entity: Entity, kind: &str) -> Option<&mut ComponentInstance> {
        let slot = self.find_slot(entity, ComponentTypeId::from_name(kind))?;
        self.slot_mut(slot)
    }

    /// Returns `true` if `entity` carries a live component named `kind`.
    #[must_use]
    pub fn has_kind(&self, entity: Entity, kind: &str) -> bool {
        self.find_by_name(entity, kind).is_some()
    }

    /// Typed access to the first live `T` on `entity`.
    #[must_use]
    pub fn get<T: ComponentKind>(&self, entity: Entity) -> Option<&T> {
        let slot = self.find_slot(entity, ComponentTypeId::of::<T>())?;
        self.slot(slot)?.downcast_ref::<T>()
    }

    pub fn get_mut<T: ComponentKind>(&mut self, entity: Entity) -> Option<&mut T> {
        let slot = self.find_slot(entity, ComponentTypeId::of::<T>())?;
        self.slot_mut(slot)?.downcast_mut::<T>()
    }

    /// The first live `T` across all entities, with its owner.
    #[must_use]
    pub fn find_first<T: ComponentKind>(&self) -> Option<(Entity, &T)> {
        let kind = ComponentTypeId::of::<T>();
        self.entities.values().flatten().find_map(|&slot| {
            let c = self.slot(slot)?;
            if c.is_dead() || c.kind() != kind {
                return None;
            }
            Some((c.entity(), c.downcast_ref::<T>()?))
        })
    }

    /// Every entity with a live `T`.
    #[must_use]
    pub fn entities_with<T: ComponentKind>(&self) -> Vec<Entity> {
        self.entities
            .keys()
            .copied()
            .filter(|&e| self.find_slot(e, ComponentTypeId::of::<T>()).is_some())
            .collect()
    }

    /// Tombstone every live component named `kind` on `entity`.
    ///
    /// Returns the number of components marked dead.
    pub fn remove_component(&mut self, entity: Entity, kind: &str) -> usize {
        let kind = ComponentTypeId::from_name(kind);
        let slots = self.slots_of(entity).to_vec();
        let mut killed = 0;
        for slot in slots {
            if let Some(c) = self.slot_mut(slot)
                && !c.is_dead()
                && c.kind() == kind
            {
                c.kill();
                killed += 1;
            }
        }
        killed
    }

    /// Physically erase every tombstoned component. Entities keep their
    /// (possibly now empty) entry.
    ///
    /// Returns the number of components erased.
    pub fn sweep_dead(&mut self) -> usize {
        let mut dead = Vec::new();
        for slots in self.entities.values_mut() {
            slots.retain(|&slot| {
                let is_dead = self
                    .slots
                    .get(slot)
                    .and_then(Option::as_ref)
                    .is_some_and(ComponentInstance::is_dead);
                if is_dead {
                    dead.push(slot);
                }
                !is_dead
            });
        }
        let swept = dead.len();
        for slot in dead {
            self.release(slot);
        }
        swept
    }

    /// Number of live components across all entities.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.slots
            .iter()
            .flatten()
            .filter(|c| !c.is_dead())
            .count()
    }

    /// Number of tombstoned components awaiting a sweep.
    #[must_use]
    pub fn dead_count(&self) -> usize {
        self.slots.iter().flatten().filter(|c| c.is_dead()).count()
    }

    fn release(&mut self, slot: usize) {
        if let Some(cell) = self.slots.get_mut(slot) {
            *cell = None;
            self.free.push(slot);
        }
    }
}
