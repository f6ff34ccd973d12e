use anyhow::Context;
use clap::Parser;
use stresscheck::cli::{Cli, Command};
use stresscheck::commands;
use stresscheck::error::exit_code;
use stresscheck::platform::{self, PlatformInfo};
use stresscheck::scan::Scanner;
use stresscheck::stress::{StopSignal, StressJob};
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match run() {
        Ok(()) => ExitCode::from(exit_code::SUCCESS as u8),
        Err(e) => {
            eprintln!("Error: {e:#}");
            if let Some(err) = e.downcast_ref::<stresscheck::Error>() {
                ExitCode::from(err.exit_code() as u8)
            } else {
                ExitCode::from(exit_code::GENERAL_ERROR as u8)
            }
        }
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    cli.validate()
        .map_err(stresscheck::Error::InvalidArgument)
        .context("Invalid arguments")?;

    let platform = platform::current();

    match cli.command {
        Some(Command::Info) => {
            commands::info::run(platform.as_ref());
        }
        Some(Command::Cpu) => {
            let interrupt = install_interrupt()?;
            let job = StressJob::cpu(cli.cpu_threads_or(platform.core_count()), cli.cpu_duration);
            commands::stress::run(&job, &interrupt, None);
        }
        Some(Command::Ram) => {
            let interrupt = install_interrupt()?;
            let job = StressJob::memory(cli.ram_mb, cli.ram_duration);
            commands::stress::run(&job, &interrupt, platform::allocation_limit(platform.as_ref()));
        }
        Some(Command::Scan) => {
            let scanner = Scanner::new(cli.scan_root())?;
            commands::scan::run(&scanner, cli.top_n, &cli.hindrance_filter(), cli.output_format());
        }
        Some(Command::Gpu) => {
            commands::gpu::run(platform.as_ref());
        }
        Some(Command::Completions { shell }) => {
            use clap::CommandFactory;
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "stresscheck", &mut std::io::stdout());
        }
        None => run_all(&cli, platform.as_ref())?,
    }

    Ok(())
}

/// Every phase in order: facts, CPU, RAM, files, GPU, advice
fn run_all(cli: &Cli, platform: &dyn PlatformInfo) -> anyhow::Result<()> {
    // Resolve the scan root first so a bad path fails before the stress phases
    let scanner = Scanner::new(cli.scan_root())?;
    let interrupt = install_interrupt()?;

    eprintln!(
        "stresscheck {} - {}",
        env!("CARGO_PKG_VERSION"),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );

    let facts = commands::info::run(platform);

    let cpu_job = StressJob::cpu(cli.cpu_threads_or(facts.cpu_cores), cli.cpu_duration);
    commands::stress::run(&cpu_job, &interrupt, None);

    let ram_job = StressJob::memory(cli.ram_mb, cli.ram_duration);
    commands::stress::run(&ram_job, &interrupt, platform::allocation_limit(platform));

    commands::scan::run(&scanner, cli.top_n, &cli.hindrance_filter(), cli.output_format());

    let gpus = commands::gpu::run(platform);

    if !cli.no_recommend {
        commands::recommend::run(&facts, &gpus);
    }

    println!("\nAll tests finished.");
    Ok(())
}

/// First Ctrl-C ends the running stress phase (and skips the next one);
/// a second one exits.
fn install_interrupt() -> anyhow::Result<StopSignal> {
    let interrupt = StopSignal::new();
    let handler_signal = interrupt.clone();

    ctrlc::set_handler(move || {
        if handler_signal.is_stopped() {
            std::process::exit(130);
        }
        handler_signal.stop();
    })
    .context("Failed to set Ctrl-C handler")?;

    Ok(interrupt)
}
