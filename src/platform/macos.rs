use super::gpu::{self, GpuInfo};
use super::{PlatformInfo, run_tool, unix};
use crate::error::{Error, Result};

pub struct MacPlatform;

impl PlatformInfo for MacPlatform {
    fn memory_ceiling_bytes(&self) -> Result<u64> {
        match run_tool("sysctl", &["-n", "hw.memsize"]) {
            Ok(out) => out
                .trim()
                .parse::<u64>()
                .map_err(|e| Error::PlatformQuery(format!("hw.memsize: {e}"))),
            Err(_) => unix::physical_memory_bytes(),
        }
    }

    fn os_identity(&self) -> Result<String> {
        let name = run_tool("sw_vers", &["-productName"]);
        let version = run_tool("sw_vers", &["-productVersion"]);
        match (name, version) {
            (Ok(name), Ok(version)) => Ok(format!("{} {}", name.trim(), version.trim())),
            _ => unix::kernel_identity(),
        }
    }

    fn gpus(&self) -> Result<Vec<GpuInfo>> {
        let output = run_tool("system_profiler", &["SPDisplaysDataType"])?;
        Ok(gpu::parse_system_profiler(&output))
    }
}
