use crate::platform::{PlatformInfo, SystemFacts};

/// Gather and print core count, memory and OS
pub fn run(platform: &dyn PlatformInfo) -> SystemFacts {
    let facts = SystemFacts::gather(platform);
    println!("{}", render(&facts));
    facts
}

fn render(facts: &SystemFacts) -> String {
    let memory = match facts.memory_gb() {
        Some(gb) => format!("{:.2} GB", gb),
        None => "unknown".to_string(),
    };
    format!(
        "\nSystem Info:\n- CPU cores: {}\n- Memory: {}\n- OS: {}",
        facts.cpu_cores, memory, facts.os
    )
}
