//! Bounded-duration lifecycle shared by the CPU and memory stress jobs.
//!
//! A job is started with a fresh [`StopSignal`], held for a fixed wall-clock
//! interval, then stopped and released. The wait can be cut short by an
//! external interrupt (Ctrl-C), but cleanup always runs.

use crate::error::Result;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Granularity at which the wait checks the external interrupt
pub const INTERRUPT_POLL: Duration = Duration::from_millis(50);

/// Shared cancellation flag, cheap to clone across threads
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    stopped: Arc<AtomicBool>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Hot-loop variant of [`is_stopped`](Self::is_stopped).
    #[inline]
    pub fn is_stopped_relaxed(&self) -> bool {
        self.stopped.load(Ordering::Relaxed)
    }
}

/// A running workload that the controller tears down when time is up
pub trait Bounded {
    type Report;

    /// Release every resource held by the workload. Called exactly once,
    /// after the job's stop signal has been raised.
    fn release(self) -> Result<Self::Report>;
}

/// Outcome of a bounded run
#[derive(Debug, Clone)]
pub struct BoundedRun<R> {
    pub report: R,
    /// Whole phase, acquisition included
    pub elapsed: Duration,
    /// From the moment `start` returned until the stop signal was raised
    pub held: Duration,
    pub interrupted: bool,
}

/// Start a workload, hold it for `duration`, then stop and release it.
///
/// The hold is measured from the moment `start` returns, so slow acquisition
/// (page-filling a large block) never eats into it. If `start` fails nothing
/// is held and the wait is skipped.
pub fn run_bounded<B, F>(
    duration: Duration,
    interrupt: &StopSignal,
    start: F,
) -> Result<BoundedRun<B::Report>>
where
    B: Bounded,
    F: FnOnce(&StopSignal) -> Result<B>,
{
    let stop = StopSignal::new();
    let started = Instant::now();
    let running = start(&stop)?;
    let acquired = Instant::now();

    let interrupted = wait_until(acquired + duration, interrupt);
    stop.stop();
    let held = acquired.elapsed();
    let report = running.release()?;

    Ok(BoundedRun {
        report,
        elapsed: started.elapsed(),
        held,
        interrupted,
    })
}

/// Sleep until `deadline`, returning early (with `true`) if interrupted
fn wait_until(deadline: Instant, interrupt: &StopSignal) -> bool {
    loop {
        if interrupt.is_stopped() {
            return true;
        }
        let now = Instant::now();
        if now >= deadline {
            return false;
        }
        std::thread::sleep((deadline - now).min(INTERRUPT_POLL));
    }
}
