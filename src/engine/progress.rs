use std::io::Write;
use std::time::Duration;

use crossterm::style::{Color, Stylize};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::warn;

/// Progress is printed every tenth of the run.
const REPORT_FRACTIONS: u64 = 10;
const MICROS_PER_SEC: u128 = 1_000_000;

/// Running completion count and the reporting cadence.
///
/// The interval is `floor(total / 10)`, raised to 1 for runs under ten
/// requests so that every completion is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressTally {
    interval: u64,
    completed: u64,
    last_reported: u64,
}

impl ProgressTally {
    #[must_use]
    pub fn new(total: u64) -> Self {
        Self {
            interval: total.checked_div(REPORT_FRACTIONS).unwrap_or(0).max(1),
            completed: 0,
            last_reported: 0,
        }
    }

    #[must_use]
    pub const fn interval(&self) -> u64 {
        self.interval
    }

    #[must_use]
    pub const fn completed(&self) -> u64 {
        self.completed
    }

    /// Adds completions; returns the count to report when a new multiple of
    /// the interval has been reached.
    pub fn record(&mut self, units: u64) -> Option<u64> {
        self.completed = self.completed.saturating_add(units);
        let on_boundary = self.completed.checked_rem(self.interval) == Some(0);
        if on_boundary && self.completed > self.last_reported {
            self.last_reported = self.completed;
            return Some(self.completed);
        }
        None
    }
}

/// Final state of the reporter once the completion channel closed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressSummary {
    pub completed: u64,
    pub lines_printed: u64,
}

pub(crate) struct ProgressReporter {
    tally: ProgressTally,
    run_start: Instant,
    use_color: bool,
    out: Box<dyn Write + Send>,
}

impl ProgressReporter {
    pub(crate) fn new(
        total: u64,
        run_start: Instant,
        use_color: bool,
        out: Box<dyn Write + Send>,
    ) -> Self {
        Self {
            tally: ProgressTally::new(total),
            run_start,
            use_color,
            out,
        }
    }

    /// Drains completion signals until every sender is gone.
    ///
    /// A failing writer stops the output but not the draining, so workers
    /// never see a closed channel.
    pub(crate) fn spawn(
        mut self,
        mut completions: mpsc::UnboundedReceiver<()>,
    ) -> tokio::task::JoinHandle<ProgressSummary> {
        tokio::spawn(async move {
            let mut lines_printed: u64 = 0;
            let mut writable = true;
            while completions.recv().await.is_some() {
                let Some(completed) = self.tally.record(1) else {
                    continue;
                };
                if !writable {
                    continue;
                }
                let line = format_progress_line(
                    completed,
                    self.run_start.elapsed(),
                    self.use_color,
                );
                match self.out.write_all(line.as_bytes()).and_then(|()| self.out.flush()) {
                    Ok(()) => lines_printed = lines_printed.saturating_add(1),
                    Err(err) => {
                        warn!("Progress output disabled: {}", err);
                        writable = false;
                    }
                }
            }
            ProgressSummary {
                completed: self.tally.completed(),
                lines_printed,
            }
        })
    }
}

pub(crate) fn format_progress_line(completed: u64, elapsed: Duration, use_color: bool) -> String {
    let rps = format_rate(completed, elapsed);
    if use_color {
        format!(
            "Completed: {}  Requests Per Second: {}\n",
            completed.to_string().with(Color::Cyan),
            rps.with(Color::Yellow)
        )
    } else {
        format!("Completed: {}  Requests Per Second: {}\n", completed, rps)
    }
}

/// Formats `count / elapsed` per second with two decimals, using integer
/// math over microseconds. A zero duration counts as one microsecond.
#[must_use]
pub fn format_rate(count: u64, elapsed: Duration) -> String {
    let elapsed_us = elapsed.as_micros().max(1);
    let rate_x100 = u128::from(count)
        .saturating_mul(MICROS_PER_SEC)
        .saturating_mul(100)
        .checked_div(elapsed_us)
        .unwrap_or(0);
    let whole = rate_x100.checked_div(100).unwrap_or(0);
    let frac = rate_x100.checked_rem(100).unwrap_or(0);
    format!("{}.{:02}", whole, frac)
}
