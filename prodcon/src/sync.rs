//! Synchronization primitives used by the bounded buffer.
//!
//! The buffer admits work through counting permits and serializes slot
//! mutation behind a mutex; this module holds the permit half.

pub mod permit;

pub use permit::Permit;
