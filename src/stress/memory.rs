//! Memory pressure: hold one resident block for a bounded interval

use super::controller::{Bounded, StopSignal, run_bounded};
use crate::error::{Error, Result};
use std::time::Duration;

pub const BYTES_PER_MB: u64 = 1024 * 1024;

/// Byte written across the block so every page is backed
const FILL_BYTE: u8 = 0xA5;

/// Result of a memory stress run
#[derive(Debug, Clone)]
pub struct MemoryReport {
    pub size_mb: u64,
    pub bytes_held: u64,
    /// Allocation and page fill included
    pub elapsed: Duration,
    /// Time the filled block stayed live
    pub held: Duration,
    pub interrupted: bool,
}

/// Allocate `size_mb` MiB, hold it for `duration`, then release it.
///
/// `ceiling` is the memory that can actually be backed (see
/// `PlatformInfo::allocation_limit_bytes`); requests above it fail up front
/// instead of inviting the OOM killer.
pub fn start_memory_load(
    duration: Duration,
    size_mb: u64,
    ceiling: Option<u64>,
    interrupt: &StopSignal,
) -> Result<MemoryReport> {
    let run = run_bounded(duration, interrupt, |_| MemoryBlock::allocate(size_mb, ceiling))?;

    Ok(MemoryReport {
        size_mb,
        bytes_held: run.report,
        elapsed: run.elapsed,
        held: run.held,
        interrupted: run.interrupted,
    })
}

/// One contiguous, fully touched allocation
#[derive(Debug)]
pub struct MemoryBlock {
    bytes: Vec<u8>,
}

impl MemoryBlock {
    pub fn allocate(size_mb: u64, ceiling: Option<u64>) -> Result<Self> {
        let requested = size_mb.checked_mul(BYTES_PER_MB).ok_or(Error::Allocation {
            requested_bytes: u64::MAX,
            cause: format!("{size_mb} MB overflows a 64-bit byte count"),
        })?;

        if let Some(limit) = ceiling
            && requested > limit
        {
            return Err(Error::Allocation {
                requested_bytes: requested,
                cause: format!("exceeds the {limit} bytes available"),
            });
        }

        let len = usize::try_from(requested).map_err(|_| Error::Allocation {
            requested_bytes: requested,
            cause: "exceeds the address space".to_string(),
        })?;

        let mut bytes = Vec::new();
        bytes
            .try_reserve_exact(len)
            .map_err(|e| Error::Allocation {
                requested_bytes: requested,
                cause: e.to_string(),
            })?;
        bytes.resize(len, FILL_BYTE);

        log::debug!("holding {requested} bytes");
        Ok(MemoryBlock { bytes })
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl Bounded for MemoryBlock {
    type Report = u64;

    fn release(self) -> Result<u64> {
        let held = std::hint::black_box(&self.bytes).len() as u64;
        drop(self.bytes);
        Ok(held)
    }
}
