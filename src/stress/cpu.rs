//! CPU saturation workers
//!
//! Each worker spins on a small integer recurrence and polls the job's stop
//! signal on every iteration. Workers share nothing but that flag.

use super::controller::{Bounded, StopSignal, run_bounded};
use crate::error::{Error, Result};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Maximum time a worker may take to exit once the stop signal is raised
pub const WORKER_EXIT_GRACE: Duration = Duration::from_secs(2);

const BURN_MODULUS: u64 = 10_000_000;

/// Result of a CPU stress run
#[derive(Debug, Clone)]
pub struct CpuReport {
    pub workers: usize,
    pub elapsed: Duration,
    /// Loop iterations completed by each worker, indexed by worker id
    pub iterations: Vec<u64>,
    pub interrupted: bool,
}

impl CpuReport {
    pub fn total_iterations(&self) -> u64 {
        self.iterations.iter().sum()
    }
}

/// Saturate `worker_count` threads for `duration`, then stop and join them.
///
/// Blocks the caller for the whole interval. `worker_count = 0` only waits.
pub fn start_cpu_load(
    worker_count: usize,
    duration: Duration,
    interrupt: &StopSignal,
) -> Result<CpuReport> {
    let run = run_bounded(duration, interrupt, |stop| {
        CpuWorkers::spawn(worker_count, stop)
    })?;

    Ok(CpuReport {
        workers: worker_count,
        elapsed: run.elapsed,
        iterations: run.report,
        interrupted: run.interrupted,
    })
}

/// Set of running burn threads
pub struct CpuWorkers {
    handles: Vec<JoinHandle<u64>>,
    exits: Receiver<usize>,
    grace: Duration,
}

impl CpuWorkers {
    pub fn spawn(count: usize, stop: &StopSignal) -> Result<Self> {
        let (tx, exits) = mpsc::channel();
        let mut handles = Vec::with_capacity(count);

        for worker in 0..count {
            let stop_flag = stop.clone();
            let notice = ExitNotice {
                worker,
                tx: tx.clone(),
            };
            let spawned = thread::Builder::new()
                .name(format!("cpu-burn-{worker}"))
                .spawn(move || {
                    let _notice = notice;
                    burn(&stop_flag)
                });

            match spawned {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    // Wind down whatever already started before reporting
                    stop.stop();
                    for handle in handles {
                        let _ = handle.join();
                    }
                    return Err(Error::Io(e));
                }
            }
        }

        log::debug!("spawned {count} CPU burn workers");
        Ok(CpuWorkers {
            handles,
            exits,
            grace: WORKER_EXIT_GRACE,
        })
    }

    pub fn worker_count(&self) -> usize {
        self.handles.len()
    }
}

impl Bounded for CpuWorkers {
    type Report = Vec<u64>;

    fn release(self) -> Result<Vec<u64>> {
        let count = self.handles.len();
        let deadline = Instant::now() + self.grace;
        let mut exited = vec![false; count];

        for _ in 0..count {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.exits.recv_timeout(remaining) {
                Ok(worker) => exited[worker] = true,
                Err(_) => break,
            }
        }

        // A stuck worker is left detached; joining it would hang the run
        if let Some(worker) = exited.iter().position(|done| !done) {
            return Err(Error::StuckWorker { worker });
        }

        self.handles
            .into_iter()
            .enumerate()
            .map(|(worker, handle)| {
                handle
                    .join()
                    .map_err(|_| Error::WorkerPanicked { worker })
            })
            .collect()
    }
}

/// Tells the supervisor a worker has left its loop, even when unwinding
struct ExitNotice {
    worker: usize,
    tx: Sender<usize>,
}

impl Drop for ExitNotice {
    fn drop(&mut self) {
        let _ = self.tx.send(self.worker);
    }
}

fn burn(stop: &StopSignal) -> u64 {
    let mut x: u64 = 0;
    let mut iterations: u64 = 0;

    while !stop.is_stopped_relaxed() {
        x = x.wrapping_add(1);
        x = x.wrapping_mul(2);
        x %= BURN_MODULUS;
        x = std::hint::black_box(x);
        iterations += 1;
    }

    iterations
}
