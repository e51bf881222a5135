//! Growable double-ended ring buffer.
//!
//! [`Deque`] keeps two independent cursors over a fixed ring of slots: `head`
//! is where the next [`push_front`](Deque::push_front) lands and `tail` is
//! where the next [`push_back`](Deque::push_back) lands. When a push finds the
//! ring full, the capacity doubles and the elements are laid out again in
//! front-to-back order.
//!
//! The scene uses it three ways: as a FIFO command queue (push back, iterate
//! from the front), as a LIFO recycled-slot list (push front, pop front), and
//! as a plain ordered bag for quadtree buckets and builder component lists.
//!
//! # Example
//!
//! ```
//! use ltl_ecs::deque::Deque;
//!
//! let mut deque = Deque::with_capacity(2);
//! deque.push_back(0);
//! deque.push_front(1);
//! deque.push_back(-1);
//!
//! assert_eq!(deque.iter().copied().collect::<Vec<_>>(), vec![1, 0, -1]);
//! assert!(deque.capacity() > 2);
//! ```

/// Capacity used by [`Deque::new`].
pub const DEFAULT_DEQUE_CAPACITY: usize = 16;

// ---------------------------------------------------------------------------
// Deque
// ---------------------------------------------------------------------------

/// A resizable circular double-ended queue.
///
/// `get(0)` is the front element and `get(len - 1)` the back element.
#[derive(Debug, Clone)]
pub struct Deque<T> {
    slots: Vec<Option<T>>,
    /// Slot written by the next `push_front`.
    head: usize,
    /// Slot written by the next `push_back`.
    tail: usize,
    len: usize,
}

impl<T> Deque<T> {
    /// Create an empty deque with [`DEFAULT_DEQUE_CAPACITY`] slots.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_DEQUE_CAPACITY)
    }

    /// Create an empty deque with room for `capacity` elements before the
    /// first resize.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "deque capacity must be at least 1");
        Self {
            slots: std::iter::repeat_with(|| None).take(capacity).collect(),
            head: capacity - 1,
            tail: 0,
            len: 0,
        }
    }

    /// Number of elements currently stored.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots in the ring. Only grows.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Insert `value` before the current front.
    pub fn push_front(&mut self, value: T) {
        self.reserve_one();
        let capacity = self.capacity();
        self.slots[self.head] = Some(value);
        self.head = (self.head + capacity - 1) % capacity;
        self.len += 1;
    }

    /// Insert `value` after the current back.
    pub fn push_back(&mut self, value: T) {
        self.reserve_one();
        let capacity = self.capacity();
        self.slots[self.tail] = Some(value);
        self.tail = (self.tail + 1) % capacity;
        self.len += 1;
    }

    /// Remove and return the front element.
    pub fn pop_front(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let capacity = self.capacity();
        self.head = (self.head + 1) % capacity;
        self.len -= 1;
        self.slots[self.head].take()
    }

    /// Remove and return the back element.
    pub fn pop_back(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let capacity = self.capacity();
        self.tail = (self.tail + capacity - 1) % capacity;
        self.len -= 1;
        self.slots[self.tail].take()
    }

    /// The element at logical position `index`, counted from the front.
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.len {
            return None;
        }
        self.slots[self.slot_of(index)].as_ref()
    }

    /// Mutable access to the element at logical position `index`.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        if index >= self.len {
            return None;
        }
        let slot = self.slot_of(index);
        self.slots[slot].as_mut()
    }

    pub fn front(&self) -> Option<&T> {
        self.get(0)
    }

    pub fn back(&self) -> Option<&T> {
        self.len.checked_sub(1).and_then(|last| self.get(last))
    }

    /// Drop every element and rewind both cursors. The capacity is retained.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
        self.head = self.capacity() - 1;
        self.tail = 0;
        self.len = 0;
    }

    /// Iterate from front to back.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        (0..self.len).filter_map(move |index| self.get(index))
    }

    #[inline]
    fn slot_of(&self, index: usize) -> usize {
        (self.head + 1 + index) % self.capacity()
    }

    /// Double the ring if it is full, laying elements out front to back.
    fn reserve_one(&mut self) {
        if self.len < self.capacity() {
            return;
        }

        let old_capacity = self.capacity();
        let new_capacity = old_capacity * 2;
        let mut slots: Vec<Option<T>> = Vec::with_capacity(new_capacity);
        for index in 0..self.len {
            let slot = (self.head + 1 + index) % old_capacity;
            slots.push(self.slots[slot].take());
        }
        slots.resize_with(new_capacity, || None);

        self.slots = slots;
        self.head = new_capacity - 1;
        self.tail = self.len;
    }
}

impl<T> Default for Deque<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<T> for Deque<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut deque = Deque::new();
        for value in iter {
            deque.push_back(value);
        }
        deque
    }
}

impl<T> Extend<T> for Deque<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.push_back(value);
        }
    }
}
