//! End-to-end simulation runs through the public API.
//!
//! # Running with tracing
//!
//! ```bash
//! RUST_LOG=prodcon=trace cargo test --features tracing --test simulation -- --nocapture
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use prodcon::buffer::BUFFER_SIZE;
use prodcon::config::RunConfig;
use prodcon::display::{EventSink, NullSink, WorkerEvent, is_prime};
use prodcon::identity::WorkerKind;
use prodcon::supervisor::Supervisor;

static INIT_TRACING: Once = Once::new();

fn init_test_tracing() {
    INIT_TRACING.call_once(|| {
        prodcon::init_tracing();
    });
}

fn config(run: Duration, producers: usize, consumers: usize, verbose: bool) -> RunConfig {
    RunConfig {
        run_duration: run,
        max_sleep: Duration::ZERO,
        producers,
        consumers,
        verbose,
    }
}

/// Checks every event it sees and tallies them by kind.
#[derive(Default)]
struct CheckingSink {
    produced: AtomicU64,
    consumed: AtomicU64,
    full: AtomicU64,
    empty: AtomicU64,
    violations: Mutex<Vec<String>>,
}

impl CheckingSink {
    fn violation(&self, what: String) {
        self.violations.lock().unwrap().push(what);
    }
}

impl EventSink for CheckingSink {
    fn record(&self, event: &WorkerEvent<'_>) {
        match *event {
            WorkerEvent::Produced { item, view, .. } => {
                self.produced.fetch_add(1, Ordering::Relaxed);
                if !(1..=BUFFER_SIZE).contains(&view.count) {
                    self.violation(format!("count {} after insert", view.count));
                }
                let last_written = (view.tail + BUFFER_SIZE - 1) % BUFFER_SIZE;
                if view.slots[last_written] != Some(item) {
                    self.violation(format!("item {item} not behind tail {}", view.tail));
                }
            }
            WorkerEvent::Consumed {
                item, prime, view, ..
            } => {
                self.consumed.fetch_add(1, Ordering::Relaxed);
                if view.count >= BUFFER_SIZE {
                    self.violation(format!("count {} after remove", view.count));
                }
                if prime != is_prime(item) {
                    self.violation(format!("prime flag wrong for {item}"));
                }
            }
            WorkerEvent::BufferFull { worker } => {
                self.full.fetch_add(1, Ordering::Relaxed);
                if worker.kind() != WorkerKind::Producer {
                    self.violation(format!("{worker} reported a full buffer"));
                }
            }
            WorkerEvent::BufferEmpty { worker } => {
                self.empty.fetch_add(1, Ordering::Relaxed);
                if worker.kind() != WorkerKind::Consumer {
                    self.violation(format!("{worker} reported an empty buffer"));
                }
            }
        }

        let occupied = match *event {
            WorkerEvent::Produced { view, .. } | WorkerEvent::Consumed { view, .. } => {
                Some(view.slots.iter().flatten().count() == view.count)
            }
            _ => None,
        };
        if occupied == Some(false) {
            self.violation("slot contents disagree with count".to_owned());
        }
    }
}

#[test]
fn three_producers_two_consumers_conserve_items() {
    init_test_tracing();

    let report =
        Supervisor::run(config(Duration::from_secs(2), 3, 2, false), Arc::new(NullSink)).unwrap();

    let stats = &report.stats;
    assert_eq!(report.capacity, 5);
    assert_eq!(stats.produced.len(), 3);
    assert_eq!(stats.consumed.len(), 2);
    assert_eq!(stats.produced.iter().sum::<u64>(), stats.total_produced());
    assert_eq!(stats.consumed.iter().sum::<u64>(), stats.total_consumed());
    assert_eq!(
        stats.total_produced() - stats.total_consumed(),
        report.remaining as u64
    );
    assert!(report.is_balanced());
    assert!(report.remaining <= BUFFER_SIZE);
    assert!(report.elapsed >= Duration::from_secs(2));
}

#[test]
fn report_is_stable_after_shutdown() {
    init_test_tracing();

    let supervisor =
        Supervisor::spawn(config(Duration::from_millis(200), 2, 2, false), Arc::new(NullSink))
            .unwrap();
    let ctx = Arc::clone(supervisor.context());
    std::thread::sleep(Duration::from_millis(200));
    let report = supervisor.shutdown();

    let first = ctx.stats.snapshot();
    std::thread::sleep(Duration::from_millis(20));
    let second = ctx.stats.snapshot();

    assert_eq!(first, second);
    assert_eq!(first, report.stats);
    assert_eq!(ctx.buffer.len(), report.remaining);
}

#[test]
fn verbose_events_match_counters() {
    init_test_tracing();

    let sink = Arc::new(CheckingSink::default());
    let report = Supervisor::run(
        config(Duration::from_millis(300), 4, 3, true),
        Arc::clone(&sink) as Arc<dyn EventSink>,
    )
    .unwrap();

    let violations = sink.violations.lock().unwrap();
    assert!(violations.is_empty(), "{violations:?}");

    let stats = &report.stats;
    assert_eq!(sink.produced.load(Ordering::Relaxed), stats.total_produced());
    assert_eq!(sink.consumed.load(Ordering::Relaxed), stats.total_consumed());
    assert_eq!(sink.full.load(Ordering::Relaxed), stats.buffer_full);
    assert_eq!(sink.empty.load(Ordering::Relaxed), stats.buffer_empty);
    assert!(report.is_balanced());
}

#[test]
fn workers_with_random_pauses_stop_within_one_cycle() {
    init_test_tracing();

    let config = RunConfig {
        run_duration: Duration::from_millis(100),
        max_sleep: Duration::from_millis(50),
        producers: 2,
        consumers: 2,
        verbose: false,
    };
    let report = Supervisor::run(config, Arc::new(NullSink)).unwrap();

    // Overshoot is at most one pause plus one operation; leave room for CI.
    assert!(report.elapsed >= Duration::from_millis(100));
    assert!(report.elapsed < Duration::from_secs(2), "took {:?}", report.elapsed);
    assert!(report.is_balanced());
}

#[test]
fn max_worker_counts_run() {
    init_test_tracing();

    let report =
        Supervisor::run(config(Duration::from_millis(100), 25, 25, false), Arc::new(NullSink))
            .unwrap();

    assert_eq!(report.stats.produced.len(), 25);
    assert_eq!(report.stats.consumed.len(), 25);
    assert!(report.is_balanced());
}
