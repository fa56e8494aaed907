//! Worker identities.
//!
//! Producers and consumers are numbered independently, each kind from zero,
//! in the order workers check in. One `fetch_add` per kind is the whole
//! critical section, so concurrently starting workers never share a number
//! and the numbers stay dense.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Role a worker plays against the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkerKind {
    Producer,
    Consumer,
}

impl WorkerKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Producer => "Producer",
            Self::Consumer => "Consumer",
        }
    }
}

impl fmt::Display for WorkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable (kind, sequence number) pair naming one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorkerId {
    kind: WorkerKind,
    seq: usize,
}

impl WorkerId {
    #[must_use]
    pub const fn new(kind: WorkerKind, seq: usize) -> Self {
        Self { kind, seq }
    }

    #[must_use]
    pub const fn kind(self) -> WorkerKind {
        self.kind
    }

    /// Position of this worker among workers of the same kind.
    #[must_use]
    pub const fn seq(self) -> usize {
        self.seq
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.seq)
    }
}

/// Hands out sequence numbers, one counter per kind.
#[derive(Debug, Default)]
pub struct IdentityAllocator {
    producers: AtomicUsize,
    consumers: AtomicUsize,
}

impl IdentityAllocator {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            producers: AtomicUsize::new(0),
            consumers: AtomicUsize::new(0),
        }
    }

    /// Assigns the next free identity of `kind`.
    pub fn next(&self, kind: WorkerKind) -> WorkerId {
        let counter = match kind {
            WorkerKind::Producer => &self.producers,
            WorkerKind::Consumer => &self.consumers,
        };
        // Uniqueness only needs the RMW to be atomic; no data hangs off it.
        WorkerId::new(kind, counter.fetch_add(1, Ordering::Relaxed))
    }

    /// Identities issued so far for `kind`.
    #[must_use]
    pub fn issued(&self, kind: WorkerKind) -> usize {
        match kind {
            WorkerKind::Producer => self.producers.load(Ordering::Relaxed),
            WorkerKind::Consumer => self.consumers.load(Ordering::Relaxed),
        }
    }
}
