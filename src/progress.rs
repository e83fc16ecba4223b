//! Progress reporting and cooperative cancellation for long cover runs.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// A one-way sink for progress fractions in [0, 1].
///
/// Implemented for any `Fn(f64) + Send + Sync` closure:
///
/// ```
/// use geocover::ProgressSink;
///
/// let sink = |fraction: f64| println!("{:.0}%", fraction * 100.0);
/// sink.report(0.5);
/// ```
pub trait ProgressSink: Send + Sync {
    /// Receive a completion fraction in [0, 1].
    fn report(&self, fraction: f64);
}

impl<F> ProgressSink for F
where
    F: Fn(f64) + Send + Sync,
{
    fn report(&self, fraction: f64) {
        self(fraction)
    }
}

/// A clonable token that signals "stop as soon as possible".
///
/// Workers poll the token between latitude rows; a cancelled cover call
/// returns [`GeocoverError::Cancelled`](crate::GeocoverError::Cancelled)
/// without partial results.
///
/// # Examples
///
/// ```
/// use geocover::CancelToken;
///
/// let token = CancelToken::new();
/// let worker_view = token.clone();
/// assert!(!worker_view.is_cancelled());
/// token.cancel();
/// assert!(worker_view.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a fresh, un-cancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal cancellation. Idempotent; visible to all clones.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

/// Shared progress bookkeeping for a parallel row scan: a completed-row
/// counter plus a last-reported-percent register updated by compare-and-swap,
/// so milestone reports are strictly monotone with no duplicates regardless
/// of which worker finishes a row first.
pub(crate) struct ProgressTracker<'a> {
    total_rows: usize,
    completed_rows: AtomicUsize,
    last_percent: AtomicUsize,
    sink: Option<&'a dyn ProgressSink>,
}

impl<'a> ProgressTracker<'a> {
    pub(crate) fn new(total_rows: usize, sink: Option<&'a dyn ProgressSink>) -> Self {
        Self {
            total_rows,
            completed_rows: AtomicUsize::new(0),
            last_percent: AtomicUsize::new(0),
            sink,
        }
    }

    /// Record one finished row and emit a milestone if this worker crossed
    /// a new integer percent. Percents 1-99 are emitted here; 100 is
    /// reserved for [`finish`](Self::finish) so the final 1.0 report happens
    /// exactly once, at the very end.
    pub(crate) fn row_done(&self) {
        let done = self.completed_rows.fetch_add(1, Ordering::Relaxed) + 1;
        if self.total_rows == 0 {
            return;
        }
        let percent = (done * 100 / self.total_rows).min(99);
        self.advance_to(percent);
    }

    /// Emit the final 1.0 report, once.
    pub(crate) fn finish(&self) {
        self.advance_to(100);
    }

    fn advance_to(&self, percent: usize) {
        let Some(sink) = self.sink else {
            return;
        };

        let mut observed = self.last_percent.load(Ordering::Relaxed);
        while percent > observed {
            match self.last_percent.compare_exchange(
                observed,
                percent,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => {
                    sink.report(percent as f64 / 100.0);
                    return;
                }
                // Another worker advanced the register; re-check against
                // its value.
                Err(current) => observed = current,
            }
        }
    }
}
