//! Producer and consumer worker loop.
//!
//! Each worker repeats the same cycle until the shutdown flag is raised:
//!
//! 1. pause for a uniformly random duration in `[0, max_sleep]`
//! 2. attempt one buffer operation (insert a random value, or remove one)
//! 3. record the outcome in the shared stats and, when verbose, the sink
//!
//! The flag is checked once per cycle, so a worker that is mid-pause finishes
//! the pause and its operation before it notices shutdown.

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::buffer::{BufferItem, SimView};
use crate::display::{EventSink, WorkerEvent, is_prime};
use crate::identity::{WorkerId, WorkerKind};
use crate::supervisor::SharedContext;
use crate::trace::{debug, trace};

/// Producers draw item values from `0..MAX_ITEM_VALUE`.
pub const MAX_ITEM_VALUE: BufferItem = 100;

/// Result of a single worker cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Inserted(BufferItem),
    Removed(BufferItem),
    BufferFull,
    BufferEmpty,
}

/// One producer or consumer bound to the shared context.
pub struct Worker {
    id: WorkerId,
    ctx: Arc<SharedContext>,
    sink: Arc<dyn EventSink>,
    rng: StdRng,
}

impl Worker {
    /// Checks in with the context, taking the next identity of `kind`.
    pub fn register(kind: WorkerKind, ctx: Arc<SharedContext>, sink: Arc<dyn EventSink>) -> Self {
        let id = ctx.identities.next(kind);
        Self {
            id,
            ctx,
            sink,
            rng: StdRng::seed_from_u64(rand::random()),
        }
    }

    #[must_use]
    pub const fn id(&self) -> WorkerId {
        self.id
    }

    /// Runs cycles until shutdown is observed. Returns the number of cycles.
    pub fn run(mut self) -> u64 {
        debug!(worker = %self.id, "worker started");
        let mut cycles = 0u64;
        while !self.ctx.is_shutdown() {
            self.pause();
            self.step();
            cycles += 1;
        }
        debug!(worker = %self.id, cycles, "worker exiting");
        cycles
    }

    /// Performs one buffer operation without pausing.
    pub fn step(&mut self) -> StepOutcome {
        match self.id.kind() {
            WorkerKind::Producer => self.produce(),
            WorkerKind::Consumer => self.consume(),
        }
    }

    fn produce(&mut self) -> StepOutcome {
        let item = self.rng.random_range(0..MAX_ITEM_VALUE);
        let inserted = if self.ctx.config.verbose {
            self.ctx.buffer.try_insert_observed(item).map(Some)
        } else {
            self.ctx.buffer.try_insert(item).map(|()| None)
        };

        match inserted {
            Ok(view) => {
                self.ctx.stats.record_success(self.id);
                trace!(worker = %self.id, item, "inserted");
                if let Some(view) = view {
                    self.emit(&WorkerEvent::Produced {
                        worker: self.id,
                        item,
                        view: &view,
                    });
                }
                StepOutcome::Inserted(item)
            }
            Err(_) => {
                self.ctx.stats.record_buffer_full();
                trace!(worker = %self.id, "buffer full");
                self.emit(&WorkerEvent::BufferFull { worker: self.id });
                StepOutcome::BufferFull
            }
        }
    }

    fn consume(&mut self) -> StepOutcome {
        let removed: Option<(BufferItem, Option<SimView>)> = if self.ctx.config.verbose {
            self.ctx
                .buffer
                .try_remove_observed()
                .map(|(item, view)| (item, Some(view)))
        } else {
            self.ctx.buffer.try_remove().map(|item| (item, None))
        };

        match removed {
            Some((item, view)) => {
                self.ctx.stats.record_success(self.id);
                trace!(worker = %self.id, item, "removed");
                if let Some(view) = view {
                    self.emit(&WorkerEvent::Consumed {
                        worker: self.id,
                        item,
                        prime: is_prime(item),
                        view: &view,
                    });
                }
                StepOutcome::Removed(item)
            }
            None => {
                self.ctx.stats.record_buffer_empty();
                trace!(worker = %self.id, "buffer empty");
                self.emit(&WorkerEvent::BufferEmpty { worker: self.id });
                StepOutcome::BufferEmpty
            }
        }
    }

    fn emit(&self, event: &WorkerEvent<'_>) {
        if self.ctx.config.verbose {
            self.sink.record(event);
        }
    }

    fn pause(&mut self) {
        let max = self.ctx.config.max_sleep;
        if max.is_zero() {
            std::thread::yield_now();
            return;
        }
        let bound = u64::try_from(max.as_nanos()).unwrap_or(u64::MAX);
        std::thread::sleep(Duration::from_nanos(self.rng.random_range(0..=bound)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::BUFFER_SIZE;
    use crate::config::RunConfig;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        lines: Mutex<Vec<String>>,
    }

    impl EventSink for Recorder {
        fn record(&self, event: &WorkerEvent<'_>) {
            self.lines
                .lock()
                .unwrap()
                .push(crate::display::render_event(event));
        }
    }

    fn context(verbose: bool) -> Arc<SharedContext> {
        Arc::new(SharedContext::new(RunConfig {
            run_duration: Duration::from_millis(50),
            max_sleep: Duration::ZERO,
            producers: 2,
            consumers: 2,
            verbose,
        }))
    }

    #[test]
    fn test_identities_follow_registration_order() {
        let ctx = context(false);
        let sink: Arc<dyn EventSink> = Arc::new(Recorder::default());

        let p0 = Worker::register(WorkerKind::Producer, Arc::clone(&ctx), Arc::clone(&sink));
        let c0 = Worker::register(WorkerKind::Consumer, Arc::clone(&ctx), Arc::clone(&sink));
        let p1 = Worker::register(WorkerKind::Producer, Arc::clone(&ctx), sink);

        assert_eq!(p0.id(), WorkerId::new(WorkerKind::Producer, 0));
        assert_eq!(c0.id(), WorkerId::new(WorkerKind::Consumer, 0));
        assert_eq!(p1.id(), WorkerId::new(WorkerKind::Producer, 1));
    }

    #[test]
    fn test_sixth_insert_counts_full_once_per_attempt() {
        let ctx = context(false);
        let mut producer =
            Worker::register(WorkerKind::Producer, Arc::clone(&ctx), Arc::new(Recorder::default()));

        for _ in 0..BUFFER_SIZE {
            assert!(matches!(producer.step(), StepOutcome::Inserted(v) if (0..MAX_ITEM_VALUE).contains(&v)));
        }
        assert_eq!(producer.step(), StepOutcome::BufferFull);
        assert_eq!(ctx.stats.snapshot().buffer_full, 1);
        assert_eq!(producer.step(), StepOutcome::BufferFull);

        let report = ctx.stats.snapshot();
        assert_eq!(report.buffer_full, 2);
        assert_eq!(report.produced, vec![BUFFER_SIZE as u64, 0]);
        assert_eq!(ctx.buffer.len(), BUFFER_SIZE);
    }

    #[test]
    fn test_consumer_on_empty_buffer() {
        let ctx = context(false);
        let mut consumer =
            Worker::register(WorkerKind::Consumer, Arc::clone(&ctx), Arc::new(Recorder::default()));

        assert_eq!(consumer.step(), StepOutcome::BufferEmpty);
        assert_eq!(consumer.step(), StepOutcome::BufferEmpty);

        let report = ctx.stats.snapshot();
        assert_eq!(report.buffer_empty, 2);
        assert_eq!(report.consumed, vec![0, 0]);
    }

    #[test]
    fn test_consumer_receives_produced_value() {
        let ctx = context(false);
        let sink: Arc<dyn EventSink> = Arc::new(Recorder::default());
        let mut producer = Worker::register(WorkerKind::Producer, Arc::clone(&ctx), Arc::clone(&sink));
        let mut consumer = Worker::register(WorkerKind::Consumer, Arc::clone(&ctx), sink);

        let StepOutcome::Inserted(item) = producer.step() else {
            panic!("empty buffer rejected an insert");
        };
        assert_eq!(consumer.step(), StepOutcome::Removed(item));

        let report = ctx.stats.snapshot();
        assert_eq!(report.total_produced(), 1);
        assert_eq!(report.total_consumed(), 1);
    }

    #[test]
    fn test_verbose_emits_every_event() {
        let ctx = context(true);
        let recorder = Arc::new(Recorder::default());
        let sink: Arc<dyn EventSink> = recorder.clone();
        let mut consumer = Worker::register(WorkerKind::Consumer, Arc::clone(&ctx), Arc::clone(&sink));
        let mut producer = Worker::register(WorkerKind::Producer, Arc::clone(&ctx), sink);

        consumer.step();
        producer.step();
        consumer.step();

        let lines = recorder.lines.lock().unwrap();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "All buffers empty. Consumer 0 waits.\n\n");
        assert!(lines[1].starts_with("Producer 0 writes "));
        assert!(lines[1].contains("(buffers occupied: 1)"));
        assert!(lines[2].starts_with("Consumer 0 reads "));
        assert!(lines[2].contains("(buffers occupied: 0)"));
    }

    #[test]
    fn test_quiet_mode_emits_nothing() {
        let ctx = context(false);
        let recorder = Arc::new(Recorder::default());
        let mut consumer = Worker::register(WorkerKind::Consumer, Arc::clone(&ctx), recorder.clone());

        consumer.step();
        assert!(recorder.lines.lock().unwrap().is_empty());
    }

    #[test]
    fn test_run_returns_after_shutdown() {
        let ctx = context(false);
        let worker = Worker::register(WorkerKind::Producer, Arc::clone(&ctx), Arc::new(Recorder::default()));

        let handle = std::thread::spawn(move || worker.run());
        std::thread::sleep(Duration::from_millis(20));
        ctx.signal_shutdown();

        let cycles = handle.join().unwrap();
        let report = ctx.stats.snapshot();
        assert_eq!(report.total_produced() + report.buffer_full, cycles);
    }
}
