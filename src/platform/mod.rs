//! Static system capacity facts
//!
//! Each supported OS gets its own [`PlatformInfo`] implementation; the rest of
//! the crate only sees the trait. Probes are best-effort: [`SystemFacts::gather`]
//! and [`probe_gpus`] are the boundary where query failures turn into
//! placeholders instead of errors.

pub mod gpu;

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "macos")]
mod macos;
#[cfg(unix)]
mod unix;
#[cfg(windows)]
mod windows;

pub use gpu::GpuInfo;

use crate::error::{Error, Result};
use std::process::Command;

pub const NO_GPU_INFO: &str = "No GPU info available.";
const UNKNOWN_OS: &str = "unknown OS";

pub trait PlatformInfo {
    fn core_count(&self) -> usize {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }

    fn memory_ceiling_bytes(&self) -> Result<u64>;

    /// Largest block that can be filled without paging the machine into the
    /// OOM killer. Defaults to physical memory.
    fn allocation_limit_bytes(&self) -> Result<u64> {
        self.memory_ceiling_bytes()
    }

    fn os_identity(&self) -> Result<String>;

    fn gpus(&self) -> Result<Vec<GpuInfo>>;
}

/// Provider for the OS this binary was built for
#[cfg(target_os = "linux")]
pub fn current() -> Box<dyn PlatformInfo> {
    Box::new(linux::LinuxPlatform)
}

#[cfg(target_os = "macos")]
pub fn current() -> Box<dyn PlatformInfo> {
    Box::new(macos::MacPlatform)
}

#[cfg(windows)]
pub fn current() -> Box<dyn PlatformInfo> {
    Box::new(windows::WindowsPlatform)
}

#[cfg(not(any(target_os = "linux", target_os = "macos", windows)))]
pub fn current() -> Box<dyn PlatformInfo> {
    Box::new(FallbackPlatform)
}

/// Core count only; everything else is reported as unavailable
#[cfg(not(any(target_os = "linux", target_os = "macos", windows)))]
struct FallbackPlatform;

#[cfg(not(any(target_os = "linux", target_os = "macos", windows)))]
impl PlatformInfo for FallbackPlatform {
    fn memory_ceiling_bytes(&self) -> Result<u64> {
        #[cfg(unix)]
        return unix::physical_memory_bytes();
        #[cfg(not(unix))]
        Err(Error::PlatformQuery(format!(
            "memory size not supported on {}",
            std::env::consts::OS
        )))
    }

    fn os_identity(&self) -> Result<String> {
        #[cfg(unix)]
        return unix::kernel_identity();
        #[cfg(not(unix))]
        Ok(std::env::consts::OS.to_string())
    }

    fn gpus(&self) -> Result<Vec<GpuInfo>> {
        Err(Error::PlatformQuery(format!(
            "GPU query not supported on {}",
            std::env::consts::OS
        )))
    }
}

/// Capacity facts with failed probes degraded
#[derive(Debug, Clone)]
pub struct SystemFacts {
    pub cpu_cores: usize,
    pub memory_bytes: Option<u64>,
    pub os: String,
}

impl SystemFacts {
    pub fn gather(platform: &dyn PlatformInfo) -> Self {
        let memory_bytes = match platform.memory_ceiling_bytes() {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                log::warn!("memory size unavailable: {e}");
                None
            }
        };
        let os = platform.os_identity().unwrap_or_else(|e| {
            log::warn!("OS identity unavailable: {e}");
            UNKNOWN_OS.to_string()
        });

        SystemFacts {
            cpu_cores: platform.core_count(),
            memory_bytes,
            os,
        }
    }

    pub fn memory_gb(&self) -> Option<f64> {
        self.memory_bytes
            .map(|b| b as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}

/// Allocation limit for the RAM stress job, `None` when it cannot be probed
pub fn allocation_limit(platform: &dyn PlatformInfo) -> Option<u64> {
    match platform.allocation_limit_bytes() {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            log::warn!("allocation limit unavailable: {e}");
            None
        }
    }
}

/// GPU list, empty when the query failed or its output was unparseable
pub fn probe_gpus(platform: &dyn PlatformInfo) -> Vec<GpuInfo> {
    platform.gpus().unwrap_or_else(|e| {
        log::warn!("GPU query failed: {e}");
        Vec::new()
    })
}

pub fn describe_gpus(gpus: &[GpuInfo]) -> String {
    if gpus.is_empty() {
        return NO_GPU_INFO.to_string();
    }
    gpus.iter()
        .map(|g| format!("GPU: {g}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Run an external tool and capture its stdout
pub(crate) fn run_tool(program: &str, args: &[&str]) -> Result<String> {
    log::debug!("running {program} {}", args.join(" "));
    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|e| Error::PlatformQuery(format!("{program}: {e}")))?;

    if !output.status.success() {
        return Err(Error::PlatformQuery(format!(
            "{program} exited with {}",
            output.status
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
