//! Typed bump arena for per-tick transient payloads.
//!
//! Deferred callback commands carry their payload in the scene's [`Arena`]
//! rather than owning it, so a whole tick's worth of payloads is released by
//! a single [`flush`](Arena::flush) once the command queue has been applied.
//!
//! Handles remember the flush epoch they were issued in. Reading a handle
//! after the arena has been flushed yields `None` instead of another tick's
//! payload.

use crate::EcsError;

/// Default number of payloads the scene arena can hold per tick.
pub const DEFAULT_ARENA_CAPACITY: usize = 4096;

// ---------------------------------------------------------------------------
// ArenaHandle
// ---------------------------------------------------------------------------

/// A typed reference to a payload stored in an [`Arena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArenaHandle {
    index: u32,
    epoch: u32,
}

impl ArenaHandle {
    /// Position of the payload within its epoch.
    #[inline]
    pub fn index(self) -> usize {
        self.index as usize
    }
}

// ---------------------------------------------------------------------------
// Arena
// ---------------------------------------------------------------------------

/// A fixed-capacity bump allocator of `T` values.
#[derive(Debug)]
pub struct Arena<T> {
    values: Vec<T>,
    capacity: usize,
    epoch: u32,
}

impl<T> Arena<T> {
    /// Create an arena that accepts up to `capacity` values between flushes.
    pub fn new(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
            capacity,
            epoch: 0,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of values allocated since the last flush.
    #[inline]
    pub fn used(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.capacity - self.used()
    }

    /// Bump-allocate `value`.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::ArenaExhausted`] if the arena is full.
    pub fn alloc(&mut self, value: T) -> Result<ArenaHandle, EcsError> {
        if self.values.len() >= self.capacity {
            return Err(EcsError::ArenaExhausted {
                capacity: self.capacity,
            });
        }
        let index = self.values.len() as u32;
        self.values.push(value);
        Ok(ArenaHandle {
            index,
            epoch: self.epoch,
        })
    }

    /// The payload behind `handle`, or `None` if it was issued before the
    /// last flush.
    pub fn get(&self, handle: ArenaHandle) -> Option<&T> {
        if handle.epoch != self.epoch {
            return None;
        }
        self.values.get(handle.index())
    }

    /// Release every payload at once and invalidate outstanding handles.
    pub fn flush(&mut self) {
        self.values.clear();
        self.epoch = self.epoch.wrapping_add(1);
    }

    /// Move the current epoch's payloads out and start the next epoch empty.
    ///
    /// The returned arena still resolves this epoch's handles, while values
    /// allocated from `self` afterwards get handles that survive it. Dropping
    /// the returned arena is the flush.
    pub fn rotate(&mut self) -> Arena<T> {
        let next = Arena {
            values: Vec::with_capacity(self.capacity),
            capacity: self.capacity,
            epoch: self.epoch.wrapping_add(1),
        };
        std::mem::replace(self, next)
    }
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new(DEFAULT_ARENA_CAPACITY)
    }
}
