//! Best-effort parsers for the text emitted by OS GPU tools.
//!
//! Every parser returns an empty list on output it does not understand.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GpuInfo {
    pub name: String,
    pub vram_mb: Option<u64>,
}

impl fmt::Display for GpuInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.vram_mb {
            Some(mb) => write!(f, "{}, VRAM: {} MB", self.name, mb),
            None => write!(f, "{}", self.name),
        }
    }
}

/// `nvidia-smi --query-gpu=name,memory.total --format=csv,noheader,nounits`
pub fn parse_nvidia_smi(output: &str) -> Vec<GpuInfo> {
    output
        .lines()
        .filter_map(|line| {
            let (name, memory) = line.rsplit_once(',')?;
            let name = name.trim();
            let vram_mb = memory.trim().parse::<u64>().ok()?;
            (!name.is_empty()).then(|| GpuInfo {
                name: name.to_string(),
                vram_mb: Some(vram_mb),
            })
        })
        .collect()
}

/// `lshw -C display`: one `*-display` block per adapter
pub fn parse_lshw_display(output: &str) -> Vec<GpuInfo> {
    let mut gpus = Vec::new();
    let mut product: Option<String> = None;
    let mut vendor: Option<String> = None;

    let mut flush = |product: &mut Option<String>, vendor: &mut Option<String>| {
        if let Some(p) = product.take() {
            let name = match vendor.take() {
                Some(v) if !p.starts_with(&v) => format!("{v} {p}"),
                _ => p,
            };
            gpus.push(GpuInfo { name, vram_mb: None });
        }
        vendor.take();
    };

    for line in output.lines() {
        let line = line.trim();
        if line.starts_with("*-display") {
            flush(&mut product, &mut vendor);
        } else if let Some(value) = line.strip_prefix("product:") {
            product = Some(value.trim().to_string());
        } else if let Some(value) = line.strip_prefix("vendor:") {
            vendor = Some(value.trim().to_string());
        }
    }
    flush(&mut product, &mut vendor);

    gpus
}

/// `system_profiler SPDisplaysDataType`
pub fn parse_system_profiler(output: &str) -> Vec<GpuInfo> {
    let mut gpus: Vec<GpuInfo> = Vec::new();

    for line in output.lines() {
        let line = line.trim();
        if let Some(model) = line.strip_prefix("Chipset Model:") {
            gpus.push(GpuInfo {
                name: model.trim().to_string(),
                vram_mb: None,
            });
        } else if line.starts_with("VRAM")
            && let Some((_, amount)) = line.split_once(':')
            && let Some(gpu) = gpus.last_mut()
        {
            gpu.vram_mb = parse_amount_mb(amount);
        }
    }

    gpus
}

/// `wmic path win32_VideoController get AdapterRAM,Caption /format:list`
pub fn parse_wmic_video_controllers(output: &str) -> Vec<GpuInfo> {
    parse_wmic_list(output)
        .into_iter()
        .filter_map(|record| {
            let name = lookup(&record, "Caption")?.to_string();
            let vram_mb = lookup(&record, "AdapterRAM")
                .and_then(|v| v.parse::<u64>().ok())
                .map(|bytes| bytes / (1024 * 1024));
            Some(GpuInfo { name, vram_mb })
        })
        .collect()
}

/// Split `wmic ... /format:list` output into records of key/value pairs.
///
/// Records are separated by blank lines; empty values are dropped.
pub fn parse_wmic_list(output: &str) -> Vec<Vec<(String, String)>> {
    let mut records = Vec::new();
    let mut current = Vec::new();

    for line in output.lines() {
        let line = line.trim_matches(|c: char| c.is_whitespace() || c == '\0');
        if line.is_empty() {
            if !current.is_empty() {
                records.push(std::mem::take(&mut current));
            }
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            let value = value.trim();
            if !value.is_empty() {
                current.push((key.trim().to_string(), value.to_string()));
            }
        }
    }
    if !current.is_empty() {
        records.push(current);
    }

    records
}

pub fn lookup<'a>(record: &'a [(String, String)], key: &str) -> Option<&'a str> {
    record
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, v)| v.as_str())
}

/// "1536 MB" / "8 GB" → megabytes
fn parse_amount_mb(text: &str) -> Option<u64> {
    let mut parts = text.split_whitespace();
    let value: f64 = parts.next()?.parse().ok()?;
    let scale = match parts.next()? {
        "MB" => 1.0,
        "GB" => 1024.0,
        _ => return None,
    };
    Some((value * scale) as u64)
}

/// Largest VRAM across adapters, in GiB (0 when unknown)
pub fn max_vram_gb(gpus: &[GpuInfo]) -> f64 {
    gpus.iter()
        .filter_map(|g| g.vram_mb)
        .max()
        .map(|mb| mb as f64 / 1024.0)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nvidia_smi() {
        let out = "NVIDIA GeForce RTX 3080, 10240\nNVIDIA A100-SXM4-40GB, 40960\n";
        let gpus = parse_nvidia_smi(out);
        assert_eq!(gpus.len(), 2);
        assert_eq!(gpus[0].name, "NVIDIA GeForce RTX 3080");
        assert_eq!(gpus[1].vram_mb, Some(40960));
        assert_eq!(gpus[0].to_string(), "NVIDIA GeForce RTX 3080, VRAM: 10240 MB");
    }

    #[test]
    fn test_nvidia_smi_garbage() {
        assert!(parse_nvidia_smi("NVIDIA-SMI has failed because it couldn't communicate").is_empty());
        assert!(parse_nvidia_smi("").is_empty());
    }

    #[test]
    fn test_lshw() {
        let out = "\
  *-display
       description: VGA compatible controller
       product: TU106 [GeForce RTX 2060]
       vendor: NVIDIA Corporation
       physical id: 0
  *-display
       description: VGA compatible controller
       product: UHD Graphics 630
       vendor: Intel Corporation
";
        let gpus = parse_lshw_display(out);
        assert_eq!(
            gpus,
            vec![
                GpuInfo {
                    name: "NVIDIA Corporation TU106 [GeForce RTX 2060]".into(),
                    vram_mb: None
                },
                GpuInfo {
                    name: "Intel Corporation UHD Graphics 630".into(),
                    vram_mb: None
                },
            ]
        );
    }

    #[test]
    fn test_lshw_without_product() {
        let out = "WARNING: you should run this program as super-user.\n  *-display UNCLAIMED\n";
        assert!(parse_lshw_display(out).is_empty());
    }

    #[test]
    fn test_system_profiler() {
        let out = "\
Graphics/Displays:

    Intel Iris Plus Graphics 640:

      Chipset Model: Intel Iris Plus Graphics 640
      Type: GPU
      VRAM (Dynamic, Max): 1536 MB
      Vendor: Intel

    Radeon Pro 560:

      Chipset Model: Radeon Pro 560
      VRAM (Total): 4 GB

    Apple M1:

      Chipset Model: Apple M1
      Total Number of Cores: 8
";
        let gpus = parse_system_profiler(out);
        assert_eq!(gpus.len(), 3);
        assert_eq!(gpus[0].vram_mb, Some(1536));
        assert_eq!(gpus[1].vram_mb, Some(4096));
        assert_eq!(gpus[2].name, "Apple M1");
        assert_eq!(gpus[2].vram_mb, None);
    }

    #[test]
    fn test_wmic() {
        let out = "\r\n\r\nAdapterRAM=1073741824\r\nCaption=NVIDIA GeForce GTX 1050\r\n\r\n\r\nAdapterRAM=\r\nCaption=Microsoft Basic Display Adapter\r\n\r\n";
        let gpus = parse_wmic_video_controllers(out);
        assert_eq!(gpus.len(), 2);
        assert_eq!(gpus[0].vram_mb, Some(1024));
        assert_eq!(gpus[1].name, "Microsoft Basic Display Adapter");
        assert_eq!(gpus[1].vram_mb, None);
    }

    #[test]
    fn test_max_vram() {
        let gpus = vec![
            GpuInfo {
                name: "a".into(),
                vram_mb: Some(2048),
            },
            GpuInfo {
                name: "b".into(),
                vram_mb: None,
            },
            GpuInfo {
                name: "c".into(),
                vram_mb: Some(12288),
            },
        ];
        assert_eq!(max_vram_gb(&gpus), 12.0);
        assert_eq!(max_vram_gb(&[]), 0.0);
    }
}
