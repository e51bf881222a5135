//! Entity handles and slot allocation.
//!
//! An [`Entity`] is nothing more than a dense index into the scene's
//! fixed-capacity component columns. Liveness is not tracked here: the
//! scene's tag word for the slot is the single source of truth.
//!
//! The [`EntityAllocator`] hands out recycled slots first (most recently
//! released first) and only then bumps the high-water mark.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::deque::Deque;
use crate::EcsError;

/// Default number of entity slots in a scene.
pub const DEFAULT_MAX_ENTITIES: usize = 2048;

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A dense entity index.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Entity(u32);

impl Entity {
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// The slot this entity occupies in every component column.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn to_raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// EntityAllocator
// ---------------------------------------------------------------------------

/// Free-list slot allocator with a hard capacity.
#[derive(Debug, Clone)]
pub struct EntityAllocator {
    capacity: usize,
    /// Next never-used slot. Doubles as the high-water mark.
    next_fresh: usize,
    /// Released slots; the front is reused first.
    recycled: Deque<Entity>,
}

impl EntityAllocator {
    /// Create an allocator for `capacity` slots.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero or does not fit in a `u32`.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "entity capacity must be positive");
        assert!(
            u32::try_from(capacity).is_ok(),
            "entity capacity {capacity} exceeds u32 range"
        );
        Self {
            capacity,
            next_fresh: 0,
            recycled: Deque::with_capacity(capacity.min(1024)),
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of slots ever handed out since the last reset.
    #[inline]
    pub fn high_water_mark(&self) -> usize {
        self.next_fresh
    }

    /// Number of released slots waiting to be reused.
    #[inline]
    pub fn recycled_len(&self) -> usize {
        self.recycled.len()
    }

    /// Allocate a slot, preferring the most recently released one.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::EntityCapacityExceeded`] when every slot is in use.
    pub fn allocate(&mut self) -> Result<Entity, EcsError> {
        if let Some(entity) = self.recycled.pop_front() {
            return Ok(entity);
        }

        if self.next_fresh >= self.capacity {
            warn!(capacity = self.capacity, "maximum amount of entities reached");
            return Err(EcsError::EntityCapacityExceeded {
                capacity: self.capacity,
            });
        }

        let entity = Entity::new(self.next_fresh as u32);
        self.next_fresh += 1;
        Ok(entity)
    }

    /// Return `entity`'s slot to the free-list.
    pub fn release(&mut self, entity: Entity) {
        self.recycled.push_front(entity);
    }

    /// Forget every allocation.
    pub fn reset(&mut self) {
        self.next_fresh = 0;
        self.recycled.clear();
    }
}
