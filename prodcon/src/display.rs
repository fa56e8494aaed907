//! Display collaborator for worker events.
//!
//! Workers report what they did through an [`EventSink`]; the core never
//! formats output itself. [`ConsoleSink`] renders the line-oriented snapshot
//! format below, one event per block:
//!
//! ```text
//! Producer 2 writes 41
//! (buffers occupied: 3)
//! buffers:	   41	   -1	   17	    8	    5
//! 			  ----    ----    ----    ----    ----
//! 			   R               W
//! ```
//!
//! Empty slots print as `-1`. The ruler marks the read (`R`, head) and write
//! (`W`, tail) positions eight columns per slot.

use std::fmt::Write as _;
use std::io::Write as _;

use crate::buffer::{BufferItem, BufferView, SimView};
use crate::identity::WorkerId;

/// Value printed for an empty slot.
pub const EMPTY_SLOT: BufferItem = -1;

/// Columns per slot in the pointer ruler.
const RULER_STEP: &str = "        ";

/// Something a worker did, as seen by the display.
#[derive(Debug, Clone, Copy)]
pub enum WorkerEvent<'a> {
    /// A producer inserted `item`; `view` is the buffer right after.
    Produced {
        worker: WorkerId,
        item: BufferItem,
        view: &'a SimView,
    },
    /// A consumer removed `item`; `view` is the buffer right after.
    Consumed {
        worker: WorkerId,
        item: BufferItem,
        prime: bool,
        view: &'a SimView,
    },
    /// A producer found the buffer full.
    BufferFull { worker: WorkerId },
    /// A consumer found the buffer empty.
    BufferEmpty { worker: WorkerId },
}

/// Receiver of worker events. Shared by every worker thread.
pub trait EventSink: Send + Sync {
    fn record(&self, event: &WorkerEvent<'_>);
}

/// Discards all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn record(&self, _event: &WorkerEvent<'_>) {}
}

/// Writes each event to stdout as one uninterrupted block.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl EventSink for ConsoleSink {
    fn record(&self, event: &WorkerEvent<'_>) {
        let block = render_event(event);
        // A closed stdout only loses the display; the run itself goes on.
        let _ = std::io::stdout().lock().write_all(block.as_bytes());
    }
}

/// Renders one event block, including its trailing blank line.
#[must_use]
pub fn render_event(event: &WorkerEvent<'_>) -> String {
    match *event {
        WorkerEvent::Produced { worker, item, view } => {
            render_view(&format!("{worker} writes {item}"), view)
        }
        WorkerEvent::Consumed {
            worker,
            item,
            prime,
            view,
        } => {
            let mut title = format!("{worker} reads {item}");
            if prime {
                title.push_str("\t*****PRIME NUMBER*****");
            }
            render_view(&title, view)
        }
        WorkerEvent::BufferFull { worker } => format!("All buffers full. {worker} waits.\n\n"),
        WorkerEvent::BufferEmpty { worker } => format!("All buffers empty. {worker} waits.\n\n"),
    }
}

/// Renders `title` followed by the occupancy, slot values and pointer ruler.
#[must_use]
pub fn render_view<const N: usize>(title: &str, view: &BufferView<BufferItem, N>) -> String {
    let mut out = String::with_capacity(160);
    let _ = writeln!(out, "{title}");
    let _ = writeln!(out, "(buffers occupied: {})", view.count);

    out.push_str("buffers:");
    for slot in &view.slots {
        let _ = write!(out, "\t{:5}", slot.unwrap_or(EMPTY_SLOT));
    }
    out.push('\n');

    out.push_str("\t\t\t  ");
    out.push_str(&vec!["----"; N].join("    "));
    out.push('\n');

    let _ = writeln!(out, "\t\t\t   {}", pointer_ruler(view.head, view.tail));
    out.push('\n');
    out
}

/// Places `R` at `head` and `W` at `tail`, whichever comes first leftmost.
///
/// When both point at the same slot the marks print side by side as `RW`.
#[must_use]
pub fn pointer_ruler(head: usize, tail: usize) -> String {
    let (first, first_mark, second, second_mark) = if head > tail {
        (tail, 'W', head, 'R')
    } else {
        (head, 'R', tail, 'W')
    };

    let mut ruler = RULER_STEP.repeat(first);
    ruler.push(first_mark);
    ruler.push_str(&RULER_STEP.repeat(second - first));
    ruler.push(second_mark);
    ruler
}

/// Trial-division primality test. Zero, one and negatives are not prime.
#[must_use]
pub fn is_prime(n: BufferItem) -> bool {
    if n < 2 {
        return false;
    }
    let mut d: BufferItem = 2;
    while d <= n / d {
        if n % d == 0 {
            return false;
        }
        d += 1;
    }
    true
}
