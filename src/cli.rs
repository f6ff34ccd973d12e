use crate::scan::{DEFAULT_HINDRANCE_EXTENSIONS, HindranceFilter};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_RAM_MB: u64 = 500;
pub const DEFAULT_TOP_N: usize = 5;
pub const MAX_CPU_THREADS: usize = 4096;

#[derive(Parser, Debug)]
#[command(name = "stresscheck")]
#[command(about = "Bounded CPU/RAM stress tests, system facts and disk clutter scan")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// How long to saturate the CPU
    #[arg(long, global = true, default_value = "10s", value_parser = parse_duration)]
    pub cpu_duration: Duration,

    /// CPU burn threads (default: available cores)
    #[arg(long, global = true)]
    pub cpu_threads: Option<usize>,

    /// How long to hold the RAM block
    #[arg(long, global = true, default_value = "10s", value_parser = parse_duration)]
    pub ram_duration: Duration,

    /// Size of the RAM block in megabytes
    #[arg(long, global = true, default_value_t = DEFAULT_RAM_MB)]
    pub ram_mb: u64,

    /// Directory to analyze (default: home directory)
    #[arg(long, global = true)]
    pub scan_dir: Option<PathBuf>,

    /// Number of largest files to report
    #[arg(long, short = 'n', global = true, default_value_t = DEFAULT_TOP_N)]
    pub top_n: usize,

    /// File extension that marks a hindrance file (repeatable, replaces the defaults)
    #[arg(long = "hindrance-ext", global = true, value_name = "EXT")]
    pub hindrance_ext: Vec<String>,

    /// Skip the environment recommendations
    #[arg(long, global = true)]
    pub no_recommend: bool,

    /// Print scan results as JSON
    #[arg(long, global = true, conflicts_with = "csv")]
    pub json: bool,

    /// Print scan results as CSV
    #[arg(long, global = true, conflicts_with = "json")]
    pub csv: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show CPU cores, memory and OS
    Info,

    /// Run only the CPU stress test
    Cpu,

    /// Run only the RAM stress test
    Ram,

    /// Only analyze files: largest files and hindrances
    Scan,

    /// Only query GPU information
    Gpu,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

fn parse_duration(s: &str) -> Result<Duration, String> {
    if let Ok(d) = humantime::parse_duration(s) {
        return Ok(d);
    }

    // Bare number as seconds
    if let Ok(secs) = s.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }

    Err(format!(
        "Invalid duration '{}'. Examples: 10s, 500ms, 2m, 90",
        s
    ))
}

impl Cli {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(threads) = self.cpu_threads
            && threads > MAX_CPU_THREADS
        {
            return Err(format!(
                "CPU threads must be at most {}, got {}",
                MAX_CPU_THREADS, threads
            ));
        }

        for ext in &self.hindrance_ext {
            if !ext.starts_with('.') || ext.len() < 2 {
                return Err(format!(
                    "Hindrance extension must look like '.log', got '{}'",
                    ext
                ));
            }
        }

        Ok(())
    }

    pub fn cpu_threads_or(&self, cores: usize) -> usize {
        self.cpu_threads.unwrap_or(cores)
    }

    /// Scan root, falling back to the home directory, then the current one
    pub fn scan_root(&self) -> PathBuf {
        self.scan_dir
            .clone()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn hindrance_filter(&self) -> HindranceFilter {
        if self.hindrance_ext.is_empty() {
            HindranceFilter::new(DEFAULT_HINDRANCE_EXTENSIONS.iter().copied())
        } else {
            HindranceFilter::new(self.hindrance_ext.iter().cloned())
        }
    }

    pub fn output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else if self.csv {
            OutputFormat::Csv
        } else {
            OutputFormat::Table
        }
    }
}
