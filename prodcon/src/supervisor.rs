//! Worker supervisor: spawns the simulation, stops it, and collects results.
//!
//! # Lifecycle
//!
//! ```text
//! spawn(config) ──> validate ──> N producer threads + M consumer threads
//!                                   │ (each registers, then loops)
//! run(config)   ──> spawn ──> sleep(run_duration) ──> shutdown
//!
//! shutdown()    ──> raise flag ──> join all ──> RunReport
//! ```
//!
//! Shutdown is cooperative. Workers poll the flag once per cycle, so the real
//! stop time can exceed the configured duration by up to one pause plus one
//! buffer operation per worker. Nothing is interrupted mid-operation.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use prodcon::config::RunConfig;
//! use prodcon::display::NullSink;
//! use prodcon::supervisor::Supervisor;
//!
//! let config = RunConfig {
//!     run_duration: Duration::from_secs(2),
//!     max_sleep: Duration::from_millis(100),
//!     producers: 3,
//!     consumers: 2,
//!     verbose: false,
//! };
//!
//! let report = Supervisor::run(config, Arc::new(NullSink))?;
//! println!("{report}");
//! # Ok::<(), prodcon::supervisor::SupervisorError>(())
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use minstant::Instant;
use thiserror::Error;

use crate::buffer::SimBuffer;
use crate::config::{ConfigError, RunConfig};
use crate::display::EventSink;
use crate::identity::{IdentityAllocator, WorkerKind};
use crate::report::RunReport;
use crate::stats::StatsAggregator;
use crate::trace::{debug, info, warn};
use crate::worker::Worker;

/// Error starting a simulation.
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// The configuration was rejected; no worker was started.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    /// The OS refused a worker thread. Workers already running were stopped.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[source] std::io::Error),
}

/// State shared by every worker of one run.
pub struct SharedContext {
    pub config: RunConfig,
    pub buffer: SimBuffer,
    pub stats: StatsAggregator,
    pub identities: IdentityAllocator,
    shutdown: Arc<AtomicBool>,
}

impl SharedContext {
    #[must_use]
    pub fn new(config: RunConfig) -> Self {
        let stats = StatsAggregator::new(config.producers, config.consumers);
        Self {
            config,
            buffer: SimBuffer::new(),
            stats,
            identities: IdentityAllocator::new(),
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    #[inline]
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }

    pub fn signal_shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }
}

/// Handle to a running simulation.
///
/// Dropping the handle raises the shutdown flag but does not wait for the
/// workers. Use [`Supervisor::shutdown`] to join them and get the report.
pub struct Supervisor {
    ctx: Arc<SharedContext>,
    workers: Vec<JoinHandle<u64>>,
    started: Instant,
}

impl Supervisor {
    /// Validates `config` and starts every producer and consumer thread.
    ///
    /// # Errors
    ///
    /// Returns [`SupervisorError::Config`] before starting anything if the
    /// configuration is invalid, or [`SupervisorError::Spawn`] if a thread
    /// could not be created.
    pub fn spawn(config: RunConfig, sink: Arc<dyn EventSink>) -> Result<Self, SupervisorError> {
        config.validate()?;

        info!(
            run_ms = config.run_duration.as_millis() as u64,
            max_sleep_ms = config.max_sleep.as_millis() as u64,
            producers = config.producers,
            consumers = config.consumers,
            verbose = config.verbose,
            "simulation starting"
        );

        let roster = [
            (WorkerKind::Producer, config.producers),
            (WorkerKind::Consumer, config.consumers),
        ];
        let mut supervisor = Self {
            workers: Vec::with_capacity(config.producers + config.consumers),
            ctx: Arc::new(SharedContext::new(config)),
            started: Instant::now(),
        };

        for (kind, count) in roster {
            for _ in 0..count {
                let ctx = Arc::clone(&supervisor.ctx);
                let sink = Arc::clone(&sink);
                let spawned = thread::Builder::new()
                    .name(format!("prodcon-{}", kind.as_str().to_ascii_lowercase()))
                    .spawn(move || Worker::register(kind, ctx, sink).run());

                match spawned {
                    Ok(handle) => supervisor.workers.push(handle),
                    Err(e) => {
                        warn!(%kind, error = %e, "worker spawn failed, stopping simulation");
                        supervisor.stop();
                        return Err(SupervisorError::Spawn(e));
                    }
                }
            }
        }

        debug!(workers = supervisor.workers.len(), "all workers spawned");
        Ok(supervisor)
    }

    /// Runs a complete simulation: spawn, wait `run_duration`, shut down.
    ///
    /// # Errors
    ///
    /// See [`Supervisor::spawn`].
    pub fn run(config: RunConfig, sink: Arc<dyn EventSink>) -> Result<RunReport, SupervisorError> {
        let run_duration = config.run_duration;
        let supervisor = Self::spawn(config, sink)?;
        thread::sleep(run_duration);
        Ok(supervisor.shutdown())
    }

    /// Shared context of this run, e.g. for inspecting the buffer.
    #[must_use]
    pub fn context(&self) -> &Arc<SharedContext> {
        &self.ctx
    }

    /// Clone of the shutdown flag for external signal handling.
    #[must_use]
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.ctx.shutdown)
    }

    /// Raises the shutdown flag, waits for every worker, and reports.
    ///
    /// # Panics
    ///
    /// Re-raises the panic of a worker that panicked (an invariant violation
    /// inside the buffer), after all other workers have been joined.
    #[must_use]
    pub fn shutdown(mut self) -> RunReport {
        info!("simulation shutdown initiated");
        self.stop();

        let elapsed = self.started.elapsed();
        let stats = self.ctx.stats.snapshot();
        let remaining = self.ctx.buffer.len();

        info!(
            produced = stats.total_produced(),
            consumed = stats.total_consumed(),
            remaining,
            elapsed_ms = elapsed.as_millis() as u64,
            "simulation complete"
        );

        RunReport {
            config: self.ctx.config.clone(),
            capacity: self.ctx.buffer.capacity(),
            stats,
            remaining,
            elapsed,
        }
    }

    /// Raises the flag and joins every spawned worker.
    fn stop(&mut self) {
        self.ctx.signal_shutdown();

        let mut first_panic = None;
        for handle in self.workers.drain(..) {
            match handle.join() {
                Ok(cycles) => {
                    debug!(cycles, "worker joined");
                }
                Err(payload) => {
                    warn!("worker panicked");
                    first_panic.get_or_insert(payload);
                }
            }
        }
        if let Some(payload) = first_panic {
            std::panic::resume_unwind(payload);
        }
    }
}

impl Drop for Supervisor {
    fn drop(&mut self) {
        // Workers notice on their next cycle; nothing here blocks.
        self.ctx.signal_shutdown();
    }
}
