//! Counting permit with a fail-fast acquire.
//!
//! A [`Permit`] is a counting semaphore that never parks the caller:
//! [`Permit::try_acquire`] either takes one unit immediately or reports that
//! none is available. The buffer relies on this so a worker facing a full or
//! empty buffer returns to its loop and can observe shutdown.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Counting semaphore with non-blocking acquisition.
#[derive(Debug)]
pub struct Permit {
    available: AtomicUsize,
}

impl Permit {
    /// Creates a permit holding `initial` units.
    #[must_use]
    pub const fn new(initial: usize) -> Self {
        Self {
            available: AtomicUsize::new(initial),
        }
    }

    /// Takes one unit if any is available.
    ///
    /// Returns `false` without waiting when the count is zero.
    #[inline]
    pub fn try_acquire(&self) -> bool {
        let mut current = self.available.load(Ordering::Relaxed);
        loop {
            if current == 0 {
                return false;
            }
            // Acquire pairs with the Release in `release()` so the state the
            // releasing thread published is visible to the new holder.
            match self.available.compare_exchange_weak(
                current,
                current - 1,
                Ordering::Acquire,
                Ordering::Relaxed,
            ) {
                Ok(_) => return true,
                Err(actual) => current = actual,
            }
        }
    }

    /// Returns one unit.
    #[inline]
    pub fn release(&self) {
        self.available.fetch_add(1, Ordering::Release);
    }

    /// Units currently available. Racy; for diagnostics and tests only.
    #[inline]
    #[must_use]
    pub fn available(&self) -> usize {
        self.available.load(Ordering::Relaxed)
    }
}
