//! Coarse environment and tooling advice from machine capacity

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub title: &'static str,
    pub advice: Vec<&'static str>,
}

impl Section {
    fn new(title: &'static str, advice: Vec<&'static str>) -> Self {
        Section { title, advice }
    }
}

/// Advice sections for a machine with `ram_gb` of memory, `cpu_cores`
/// logical cores and `vram_gb` on its largest GPU
pub fn recommend(ram_gb: f64, cpu_cores: usize, vram_gb: f64) -> Vec<Section> {
    let music = if ram_gb < 8.0 {
        vec!["VLC or local MP3s (best for low RAM)"]
    } else if ram_gb < 12.0 {
        vec!["YouTube Music on browser with low refresh rate (close background tabs)"]
    } else {
        vec!["Spotify desktop or Apple Music (Mac)"]
    };

    let ide = if ram_gb >= 12.0 {
        vec!["VS Code (recommended)", "PyCharm Community Edition"]
    } else if ram_gb >= 8.0 {
        vec!["VS Code (recommended)"]
    } else {
        vec!["Sublime Text (ultra-lightweight)"]
    };

    let browser = if ram_gb < 12.0 || cpu_cores < 12 {
        vec![
            "Avoid Chrome unless no background apps are running",
            "Prefer Firefox or Brave",
        ]
    } else {
        vec![
            "Chrome is okay for casual use",
            "Brave and Edge are good alternatives",
        ]
    };

    let capability = if ram_gb >= 16.0 && vram_gb >= 12.0 {
        vec!["System is capable for moderate to heavy gaming"]
    } else {
        vec!["Light gaming recommended only; upgrade for better experience"]
    };

    vec![
        Section::new("Music", music),
        Section::new("IDE", ide),
        Section::new("Browser", browser),
        Section::new("Capability", capability),
    ]
}
