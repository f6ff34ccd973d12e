use crate::platform::gpu::max_vram_gb;
use crate::platform::{GpuInfo, SystemFacts};
use crate::recommend::{Section, recommend};

pub fn run(facts: &SystemFacts, gpus: &[GpuInfo]) {
    let ram_gb = facts.memory_gb().unwrap_or(0.0);
    let sections = recommend(ram_gb, facts.cpu_cores, max_vram_gb(gpus));
    println!("{}", render(&sections));
}

fn render(sections: &[Section]) -> String {
    let mut out = String::from("\nEnvironment & Tool Recommendations:");
    for section in sections {
        out.push_str(&format!("\n\n{}:", section.title));
        for line in &section.advice {
            out.push_str(&format!("\n- {}", line));
        }
    }
    out
}
