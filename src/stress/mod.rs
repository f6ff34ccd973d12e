//! Bounded CPU and memory stress jobs

pub mod controller;
pub mod cpu;
pub mod memory;

pub use controller::{Bounded, BoundedRun, StopSignal, run_bounded};
pub use cpu::{CpuReport, CpuWorkers, start_cpu_load};
pub use memory::{MemoryBlock, MemoryReport, start_memory_load};

use crate::error::Result;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StressKind {
    Cpu,
    Memory,
}

/// One stress phase as requested on the command line
#[derive(Debug, Clone)]
pub struct StressJob {
    pub kind: StressKind,
    /// Burn threads for CPU jobs; always 1 for memory jobs
    pub worker_count: usize,
    pub duration: Duration,
    /// Block size for memory jobs, ignored for CPU jobs
    pub size_mb: u64,
}

/// What a finished job reports
#[derive(Debug, Clone)]
pub enum StressOutcome {
    Cpu(CpuReport),
    Memory(MemoryReport),
}

impl StressJob {
    pub fn cpu(worker_count: usize, duration: Duration) -> Self {
        StressJob {
            kind: StressKind::Cpu,
            worker_count,
            duration,
            size_mb: 0,
        }
    }

    pub fn memory(size_mb: u64, duration: Duration) -> Self {
        StressJob {
            kind: StressKind::Memory,
            worker_count: 1,
            duration,
            size_mb,
        }
    }

    /// Run the job to completion, blocking for its duration.
    ///
    /// `memory_ceiling` only applies to memory jobs.
    pub fn run(&self, interrupt: &StopSignal, memory_ceiling: Option<u64>) -> Result<StressOutcome> {
        match self.kind {
            StressKind::Cpu => {
                start_cpu_load(self.worker_count, self.duration, interrupt).map(StressOutcome::Cpu)
            }
            StressKind::Memory => {
                start_memory_load(self.duration, self.size_mb, memory_ceiling, interrupt)
                    .map(StressOutcome::Memory)
            }
        }
    }

    pub fn describe(&self) -> String {
        let duration = humantime::format_duration(self.duration);
        match self.kind {
            StressKind::Cpu => format!(
                "CPU Stress Test: {} threads for {}",
                self.worker_count, duration
            ),
            StressKind::Memory => format!(
                "RAM Stress Test: Allocating {}MB for {}",
                self.size_mb, duration
            ),
        }
    }
}
