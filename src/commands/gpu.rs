use crate::platform::{GpuInfo, PlatformInfo, describe_gpus, probe_gpus};

/// Query and print GPU adapters; failures print the placeholder
pub fn run(platform: &dyn PlatformInfo) -> Vec<GpuInfo> {
    let gpus = probe_gpus(platform);
    println!("\n{}", describe_gpus(&gpus));
    gpus
}
