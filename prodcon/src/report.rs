//! Final report of a simulation run.

use std::fmt;
use std::time::Duration;

use crate::config::RunConfig;
use crate::stats::StatsReport;

/// Label column width of the printed report.
const LABEL_WIDTH: usize = 38;

/// Everything known about a run once all workers have been joined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub config: RunConfig,
    /// Buffer slot count.
    pub capacity: usize,
    pub stats: StatsReport,
    /// Items left in the buffer at termination.
    pub remaining: usize,
    /// Wall-clock time from spawn to the last join.
    pub elapsed: Duration,
}

impl RunReport {
    /// Produced minus consumed equals what is still buffered.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.stats
            .total_produced()
            .checked_sub(self.stats.total_consumed())
            .is_some_and(|diff| diff == self.remaining as u64)
    }
}

fn row(f: &mut fmt::Formatter<'_>, label: &str, value: impl fmt::Display) -> fmt::Result {
    writeln!(f, "{:<w$}{value}", format!("{label}:"), w = LABEL_WIDTH)
}

fn worker_rows(f: &mut fmt::Formatter<'_>, kind: &str, counts: &[u64]) -> fmt::Result {
    for (seq, count) in counts.iter().enumerate() {
        writeln!(f, "\t{:<w$}{count}", format!("{kind} {seq}:"), w = LABEL_WIDTH - 8)?;
    }
    Ok(())
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "PRODUCER / CONSUMER SIMULATION COMPLETE")?;
        writeln!(f, "========================================")?;
        row(f, "Simulation Time", format_args!("{:?}", self.config.run_duration))?;
        row(f, "Maximum Thread Sleep Time", format_args!("{:?}", self.config.max_sleep))?;
        row(f, "Number of Producer Threads", self.config.producers)?;
        row(f, "Number of Consumer Threads", self.config.consumers)?;
        row(f, "Size of Buffer", self.capacity)?;
        writeln!(f)?;
        row(f, "Total Number of Items Produced", self.stats.total_produced())?;
        worker_rows(f, "Producer", &self.stats.produced)?;
        writeln!(f)?;
        row(f, "Total Number of Items Consumed", self.stats.total_consumed())?;
        worker_rows(f, "Consumer", &self.stats.consumed)?;
        writeln!(f)?;
        row(f, "Number Of Items Remaining in Buffer", self.remaining)?;
        row(f, "Number Of Times Buffer was Full", self.stats.buffer_full)?;
        row(f, "Number Of Times Buffer was Empty", self.stats.buffer_empty)?;
        row(f, "Elapsed Wall-Clock Time", format_args!("{:.3?}", self.elapsed))
    }
}
