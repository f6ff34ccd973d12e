use super::gpu::{self, GpuInfo};
use super::{PlatformInfo, run_tool, unix};
use crate::error::{Error, Result};
use std::fs;
use std::path::PathBuf;

const OS_RELEASE: &str = "/etc/os-release";
const MEMINFO: &str = "/proc/meminfo";
const SELF_CGROUP: &str = "/proc/self/cgroup";
const CGROUP_ROOT: &str = "/sys/fs/cgroup";
const CGROUP_V1_LIMIT: &str = "/sys/fs/cgroup/memory/memory.limit_in_bytes";
const CGROUP_V1_USAGE: &str = "/sys/fs/cgroup/memory/memory.usage_in_bytes";
const NVIDIA_SMI_ARGS: &[&str] = &[
    "--query-gpu=name,memory.total",
    "--format=csv,noheader,nounits",
];

pub struct LinuxPlatform;

impl PlatformInfo for LinuxPlatform {
    fn memory_ceiling_bytes(&self) -> Result<u64> {
        unix::physical_memory_bytes()
    }

    /// With overcommit a reservation above free memory still succeeds, and
    /// the page fill is what gets killed. Cap by what is actually available,
    /// inside the cgroup when one sets a limit.
    fn allocation_limit_bytes(&self) -> Result<u64> {
        let mut limit = unix::physical_memory_bytes()?;

        match fs::read_to_string(MEMINFO) {
            Ok(content) => {
                if let Some(available) = mem_available(&content) {
                    limit = limit.min(available);
                }
            }
            Err(e) => log::debug!("{MEMINFO}: {e}"),
        }

        if let Some(headroom) = cgroup_headroom() {
            limit = limit.min(headroom);
        }

        Ok(limit)
    }

    fn os_identity(&self) -> Result<String> {
        let kernel = unix::kernel_identity()?;
        let distro = fs::read_to_string(OS_RELEASE)
            .ok()
            .and_then(|content| pretty_name(&content));

        Ok(match distro {
            Some(name) => format!("{name} ({kernel})"),
            None => kernel,
        })
    }

    /// NVIDIA cards report VRAM through nvidia-smi; anything else falls back
    /// to lshw, which only knows adapter names.
    fn gpus(&self) -> Result<Vec<GpuInfo>> {
        match run_tool("nvidia-smi", NVIDIA_SMI_ARGS) {
            Ok(output) => {
                let gpus = gpu::parse_nvidia_smi(&output);
                if !gpus.is_empty() {
                    return Ok(gpus);
                }
            }
            Err(e) => log::debug!("{e}"),
        }

        let output = run_tool("lshw", &["-C", "display"])?;
        let gpus = gpu::parse_lshw_display(&output);
        if gpus.is_empty() {
            return Err(Error::PlatformQuery(
                "lshw reported no display adapters".to_string(),
            ));
        }
        Ok(gpus)
    }
}

/// `MemAvailable` from /proc/meminfo, in bytes
fn mem_available(meminfo: &str) -> Option<u64> {
    meminfo.lines().find_map(|line| {
        let rest = line.strip_prefix("MemAvailable:")?;
        let kb = rest.trim().trim_end_matches("kB").trim().parse::<u64>().ok()?;
        Some(kb.saturating_mul(1024))
    })
}

/// A cgroup memory limit file: a byte count, or `max` for none
fn cgroup_limit(content: &str) -> Option<u64> {
    let value = content.trim();
    if value == "max" {
        return None;
    }
    value.parse().ok()
}

/// Unified hierarchy path of this process, from /proc/self/cgroup
fn unified_cgroup(content: &str) -> Option<PathBuf> {
    content.lines().find_map(|line| {
        let path = line.strip_prefix("0::")?;
        Some(PathBuf::from(CGROUP_ROOT).join(path.trim_start_matches('/')))
    })
}

/// Bytes left under this process's cgroup limit, if one is set
fn cgroup_headroom() -> Option<u64> {
    let (limit_file, usage_file) = match fs::read_to_string(SELF_CGROUP)
        .ok()
        .and_then(|content| unified_cgroup(&content))
    {
        Some(dir) => (dir.join("memory.max"), dir.join("memory.current")),
        None => (PathBuf::from(CGROUP_V1_LIMIT), PathBuf::from(CGROUP_V1_USAGE)),
    };

    let limit = cgroup_limit(&fs::read_to_string(&limit_file).ok()?)?;
    let usage = fs::read_to_string(&usage_file)
        .ok()
        .and_then(|content| cgroup_limit(&content))
        .unwrap_or(0);
    log::debug!("cgroup limit {limit} bytes, {usage} in use");
    Some(limit.saturating_sub(usage))
}

/// `PRETTY_NAME` from an os-release file
fn pretty_name(content: &str) -> Option<String> {
    content.lines().find_map(|line| {
        let value = line.strip_prefix("PRETTY_NAME=")?;
        let value = value.trim().trim_matches('"').trim_matches('\'');
        (!value.is_empty()).then(|| value.to_string())
    })
}
