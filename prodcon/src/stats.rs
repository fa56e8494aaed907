//! Concurrent operation counters.
//!
//! Workers bump counters from many threads at once; the supervisor reads them
//! exactly once the join barrier has passed. Increments are relaxed atomics:
//! only the final totals matter, and the join provides the happens-before edge
//! for the read.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::identity::{WorkerId, WorkerKind};
use crate::trace::warn;

/// Success and capacity-event counters shared by all workers.
#[derive(Debug)]
pub struct StatsAggregator {
    produced: Box<[AtomicU64]>,
    consumed: Box<[AtomicU64]>,
    buffer_full: AtomicU64,
    buffer_empty: AtomicU64,
}

impl StatsAggregator {
    /// Creates zeroed counters for `producers` and `consumers` workers.
    #[must_use]
    pub fn new(producers: usize, consumers: usize) -> Self {
        Self {
            produced: (0..producers).map(|_| AtomicU64::new(0)).collect(),
            consumed: (0..consumers).map(|_| AtomicU64::new(0)).collect(),
            buffer_full: AtomicU64::new(0),
            buffer_empty: AtomicU64::new(0),
        }
    }

    /// Counts one successful insert or remove by `worker`.
    pub fn record_success(&self, worker: WorkerId) {
        let slots = match worker.kind() {
            WorkerKind::Producer => &self.produced,
            WorkerKind::Consumer => &self.consumed,
        };
        match slots.get(worker.seq()) {
            Some(counter) => {
                counter.fetch_add(1, Ordering::Relaxed);
            }
            None => {
                debug_assert!(false, "{worker} has no stats slot");
                warn!(%worker, "success recorded for unknown worker");
            }
        }
    }

    /// Counts one insert attempt rejected because the buffer was full.
    pub fn record_buffer_full(&self) {
        self.buffer_full.fetch_add(1, Ordering::Relaxed);
    }

    /// Counts one remove attempt rejected because the buffer was empty.
    pub fn record_buffer_empty(&self) {
        self.buffer_empty.fetch_add(1, Ordering::Relaxed);
    }

    /// Copies out every counter.
    ///
    /// Meant to be called after all workers have been joined; calling it while
    /// workers still run yields a valid but moving picture.
    #[must_use]
    pub fn snapshot(&self) -> StatsReport {
        let load = |counters: &[AtomicU64]| -> Vec<u64> {
            counters.iter().map(|c| c.load(Ordering::Relaxed)).collect()
        };
        StatsReport {
            produced: load(&self.produced),
            consumed: load(&self.consumed),
            buffer_full: self.buffer_full.load(Ordering::Relaxed),
            buffer_empty: self.buffer_empty.load(Ordering::Relaxed),
        }
    }
}

/// Plain-value copy of a [`StatsAggregator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsReport {
    /// Successful inserts per producer, indexed by sequence number.
    pub produced: Vec<u64>,
    /// Successful removes per consumer, indexed by sequence number.
    pub consumed: Vec<u64>,
    /// Insert attempts that found the buffer full.
    pub buffer_full: u64,
    /// Remove attempts that found the buffer empty.
    pub buffer_empty: u64,
}

impl StatsReport {
    #[must_use]
    pub fn total_produced(&self) -> u64 {
        self.produced.iter().sum()
    }

    #[must_use]
    pub fn total_consumed(&self) -> u64 {
        self.consumed.iter().sum()
    }
}
