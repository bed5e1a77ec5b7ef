//! Entity ids and the identity generator.
//!
//! An [`Entity`] owns nothing. Storage maps it to the components attached to
//! it, and scene documents carry it verbatim so ids survive a save and load.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Process-unique 64-bit entity id. `0` means "no entity", and is also the
/// default.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Entity(pub u64);

impl Entity {
    /// Returned by lookups that found nothing. Never allocated.
    pub const INVALID: Entity = Entity(0);

    #[must_use]
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }

    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != Self::INVALID.0
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The identity generator.
///
/// Hands out ids counting up from 1 and never gives one back. Ids read from a
/// scene file go through [`reserve`](Self::reserve) so freshly spawned
/// entities cannot collide with loaded ones.
#[derive(Debug)]
pub struct EntityAllocator {
    next: u64,
}

impl EntityAllocator {
    #[must_use]
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// The next unused id.
    pub fn allocate(&mut self) -> Entity {
        let entity = Entity(self.next);
        self.next += 1;
        entity
    }

    /// Push the counter past `entity`. Ids below the counter are ignored.
    pub fn reserve(&mut self, entity: Entity) {
        self.next = self.next.max(entity.0.saturating_add(1));
    }

    /// What [`allocate`](Self::allocate) would return, without consuming it.
    #[must_use]
    pub fn peek(&self) -> Entity {
        Entity(self.next)
    }
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self::new()
    }
}
