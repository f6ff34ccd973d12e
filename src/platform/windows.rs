use super::gpu::{self, GpuInfo};
use super::{PlatformInfo, run_tool};
use crate::error::{Error, Result};

pub struct WindowsPlatform;

/// Run a `wmic ... /format:list` query; wmic may emit UTF-16 when piped
fn wmic(args: &[&str]) -> Result<Vec<Vec<(String, String)>>> {
    let output = run_tool("wmic", args)?.replace('\0', "");
    Ok(gpu::parse_wmic_list(&output))
}

impl PlatformInfo for WindowsPlatform {
    fn memory_ceiling_bytes(&self) -> Result<u64> {
        let records = wmic(&["ComputerSystem", "get", "TotalPhysicalMemory", "/format:list"])?;
        records
            .iter()
            .find_map(|r| gpu::lookup(r, "TotalPhysicalMemory"))
            .and_then(|v| v.parse::<u64>().ok())
            .ok_or_else(|| Error::PlatformQuery("TotalPhysicalMemory missing".to_string()))
    }

    fn os_identity(&self) -> Result<String> {
        let records = wmic(&["os", "get", "Caption,Version", "/format:list"])?;
        let record = records
            .first()
            .ok_or_else(|| Error::PlatformQuery("wmic os returned nothing".to_string()))?;
        let caption = gpu::lookup(record, "Caption").unwrap_or("Windows");
        Ok(match gpu::lookup(record, "Version") {
            Some(version) => format!("{caption} {version}"),
            None => caption.to_string(),
        })
    }

    fn gpus(&self) -> Result<Vec<GpuInfo>> {
        let output = run_tool(
            "wmic",
            &["path", "win32_VideoController", "get", "AdapterRAM,Caption", "/format:list"],
        )?
        .replace('\0', "");
        Ok(gpu::parse_wmic_video_controllers(&output))
    }
}
