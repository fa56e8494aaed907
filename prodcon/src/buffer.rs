//! Thread-safe bounded circular buffer.
//!
//! # Overview
//!
//! [`BoundedBuffer`] is the classic producer/consumer buffer built from two
//! counting permits and one mutual-exclusion lock:
//!
//! - `empty` counts free slots (starts at `N`)
//! - `filled` counts readable slots (starts at 0)
//! - the lock guards the [`Ring`] holding slots, head, tail and count
//!
//! Unlike the textbook form, both operations are fail-fast: when no permit is
//! available they return immediately instead of waiting. Callers retry on their
//! own schedule, which keeps worker threads responsive to shutdown.
//!
//! # Example
//!
//! ```
//! use prodcon::buffer::BoundedBuffer;
//!
//! let buffer = BoundedBuffer::<i32, 2>::new();
//!
//! assert!(buffer.try_insert(1).is_ok());
//! assert!(buffer.try_insert(2).is_ok());
//! assert_eq!(buffer.try_insert(3), Err(3));
//!
//! assert_eq!(buffer.try_remove(), Some(1));
//! ```

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::ring::Ring;
use crate::sync::Permit;

/// Slot count used by the simulation.
pub const BUFFER_SIZE: usize = 5;

/// Value type workers pass through the simulation buffer.
pub type BufferItem = i32;

/// The buffer every simulation worker shares.
pub type SimBuffer = BoundedBuffer<BufferItem, BUFFER_SIZE>;

/// Snapshot of a [`SimBuffer`].
pub type SimView = BufferView<BufferItem, BUFFER_SIZE>;

/// Copy of the buffer state taken inside the critical section.
///
/// Views are what the display collaborator renders; because they are captured
/// under the lock, head, tail, count and slots always agree with each other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferView<T, const N: usize> {
    /// Occupied slots.
    pub count: usize,
    /// Slot contents; `None` marks an empty slot.
    pub slots: [Option<T>; N],
    /// Next read position.
    pub head: usize,
    /// Next write position.
    pub tail: usize,
}

impl<T: Clone, const N: usize> BufferView<T, N> {
    fn capture(ring: &Ring<T, N>) -> Self {
        Self {
            count: ring.len(),
            slots: ring.slots().clone(),
            head: ring.head(),
            tail: ring.tail(),
        }
    }
}

struct CapacityCheck<const N: usize>;

impl<const N: usize> CapacityCheck<N> {
    /// Compile-time assertion that buffer capacity is non-zero.
    const OK: () = assert!(N > 0, "Buffer capacity must be greater than 0");
}

/// Fixed-capacity circular buffer shared by many producers and consumers.
///
/// At most one insert or remove mutates the ring at a time. The permits bound
/// admission so `count` can never exceed `N` or drop below zero regardless of
/// how many threads call in.
pub struct BoundedBuffer<T, const N: usize> {
    ring: Mutex<Ring<T, N>>,
    empty: Permit,
    filled: Permit,
}

impl<T, const N: usize> BoundedBuffer<T, N> {
    /// Creates an empty buffer.
    ///
    /// # Panics
    ///
    /// Fails to compile if `N == 0`.
    #[must_use]
    pub fn new() -> Self {
        let () = CapacityCheck::<N>::OK;

        Self {
            ring: Mutex::new(Ring::new()),
            empty: Permit::new(N),
            filled: Permit::new(0),
        }
    }

    /// Number of slots.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Attempts to insert `item` at the tail.
    ///
    /// # Errors
    ///
    /// Returns `Err(item)` immediately if the buffer is full.
    #[inline]
    pub fn try_insert(&self, item: T) -> Result<(), T> {
        self.insert_with(item, |_| ())
    }

    /// Attempts to remove the oldest item.
    ///
    /// Returns `None` immediately if the buffer is empty.
    #[inline]
    pub fn try_remove(&self) -> Option<T> {
        self.remove_with(|_| ()).map(|(item, ())| item)
    }

    /// Occupied slots at the moment of the call.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, Ring<T, N>> {
        // No caller code runs under the lock and every ring update completes
        // before it is released, so a poisoned ring is still consistent.
        self.ring.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Shared insert path; `observe` runs inside the critical section.
    fn insert_with<R>(&self, item: T, observe: impl FnOnce(&Ring<T, N>) -> R) -> Result<R, T> {
        if !self.empty.try_acquire() {
            return Err(item);
        }

        let observed = {
            let mut ring = self.lock();
            if let Err(item) = ring.push(item) {
                // Holding an empty-slot permit guarantees a free slot.
                debug_assert!(false, "empty permit held but ring is full");
                drop(ring);
                self.empty.release();
                return Err(item);
            }
            observe(&*ring)
        };

        self.filled.release();
        Ok(observed)
    }

    /// Shared remove path; `observe` runs inside the critical section.
    fn remove_with<R>(&self, observe: impl FnOnce(&Ring<T, N>) -> R) -> Option<(T, R)> {
        if !self.filled.try_acquire() {
            return None;
        }

        let taken = {
            let mut ring = self.lock();
            ring.pop().map(|item| (item, observe(&*ring)))
        };

        match taken {
            Some(taken) => {
                self.empty.release();
                Some(taken)
            }
            None => {
                debug_assert!(false, "filled permit held but ring is empty");
                self.filled.release();
                None
            }
        }
    }
}

impl<T: Clone, const N: usize> BoundedBuffer<T, N> {
    /// Like [`try_insert`](Self::try_insert), also returning the state right
    /// after the write.
    ///
    /// # Errors
    ///
    /// Returns `Err(item)` immediately if the buffer is full.
    pub fn try_insert_observed(&self, item: T) -> Result<BufferView<T, N>, T> {
        self.insert_with(item, BufferView::capture)
    }

    /// Like [`try_remove`](Self::try_remove), also returning the state right
    /// after the read.
    pub fn try_remove_observed(&self) -> Option<(T, BufferView<T, N>)> {
        self.remove_with(BufferView::capture)
    }

    /// Current state.
    #[must_use]
    pub fn view(&self) -> BufferView<T, N> {
        BufferView::capture(&self.lock())
    }
}

impl<T, const N: usize> Default for BoundedBuffer<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> std::fmt::Debug for BoundedBuffer<T, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ring = self.lock();
        f.debug_struct("BoundedBuffer")
            .field("capacity", &N)
            .field("count", &ring.len())
            .field("head", &ring.head())
            .field("tail", &ring.tail())
            .finish_non_exhaustive()
    }
}
