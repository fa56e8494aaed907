//! Bounded-buffer producer/consumer simulation.
//!
//! A fixed-capacity circular [`buffer::BoundedBuffer`] is shared by many
//! producer and consumer threads started by a [`supervisor::Supervisor`].
//! Producers insert random values, consumers remove them, both fail fast when
//! the buffer is full or empty, and every outcome is counted in a
//! [`stats::StatsAggregator`] that the supervisor reads after joining all
//! workers.

pub mod buffer;
pub mod config;
pub mod display;
pub mod identity;
pub mod report;
pub mod ring;
pub mod stats;
pub mod supervisor;
pub mod sync;
pub mod worker;

mod trace;

#[doc(inline)]
pub use trace::init_tracing;

pub use buffer::{BUFFER_SIZE, BoundedBuffer, BufferItem};
pub use config::{ConfigError, RunConfig};
pub use report::RunReport;
pub use supervisor::{Supervisor, SupervisorError};
