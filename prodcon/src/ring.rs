//! Circular slot storage shared by the bounded buffer.
//!
//! [`Ring`] is plain data: it has no synchronization of its own and is only
//! ever touched from inside [`crate::buffer::BoundedBuffer`]'s critical
//! section. Occupancy is tracked explicitly in `count` because `head == tail`
//! alone cannot tell a full ring from an empty one.

/// Fixed-capacity circular storage of `N` slots.
#[derive(Debug, Clone)]
pub struct Ring<T, const N: usize> {
    slots: [Option<T>; N],
    head: usize,
    tail: usize,
    count: usize,
}

impl<T, const N: usize> Ring<T, N> {
    /// Creates an empty ring with both cursors at slot 0.
    pub fn new() -> Self {
        Self {
            slots: std::array::from_fn(|_| None),
            head: 0,
            tail: 0,
            count: 0,
        }
    }

    /// Advances a cursor to the next slot index, wrapping to 0 at capacity.
    #[inline]
    pub const fn bump_cursor(cursor: usize) -> usize {
        let next = cursor + 1;
        if next == N { 0 } else { next }
    }

    /// Writes `item` at the tail.
    ///
    /// Returns the item back if every slot is occupied.
    pub fn push(&mut self, item: T) -> Result<(), T> {
        if self.is_full() {
            return Err(item);
        }
        debug_assert!(self.slots[self.tail].is_none(), "tail slot still holds unread data");

        self.slots[self.tail] = Some(item);
        self.tail = Self::bump_cursor(self.tail);
        self.count += 1;
        self.check_invariants();
        Ok(())
    }

    /// Takes the item at the head, leaving the slot empty.
    pub fn pop(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }

        let item = self.slots[self.head].take();
        debug_assert!(item.is_some(), "head slot empty while count > 0");
        self.head = Self::bump_cursor(self.head);
        self.count -= 1;
        self.check_invariants();
        item
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    pub const fn is_full(&self) -> bool {
        self.count == N
    }

    /// Index of the oldest occupied slot (next read position).
    #[inline]
    pub const fn head(&self) -> usize {
        self.head
    }

    /// Index of the next slot to be written.
    #[inline]
    pub const fn tail(&self) -> usize {
        self.tail
    }

    pub fn slots(&self) -> &[Option<T>; N] {
        &self.slots
    }

    fn check_invariants(&self) {
        debug_assert!(self.count <= N, "ring count {} exceeds capacity {N}", self.count);
        if self.count == 0 || self.count == N {
            debug_assert_eq!(self.head, self.tail);
        } else {
            debug_assert_eq!(self.count, (self.tail + N - self.head) % N);
        }
    }
}

impl<T, const N: usize> Default for Ring<T, N> {
    fn default() -> Self {
        Self::new()
    }
}
