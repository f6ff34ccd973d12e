use super::{format_count, format_elapsed};
use crate::error::Error;
use crate::stress::{StopSignal, StressJob, StressKind, StressOutcome};

/// Run one stress phase and report how it went.
///
/// Failures are printed, never returned: a failed phase must not stop the
/// phases after it.
pub fn run(job: &StressJob, interrupt: &StopSignal, memory_ceiling: Option<u64>) -> bool {
    eprintln!("\n{} (Ctrl-C to skip)...", job.describe());

    match job.run(interrupt, memory_ceiling) {
        Ok(outcome) => {
            println!("{}", render_outcome(&outcome));
            true
        }
        Err(e) => {
            println!("{}", render_failure(job.kind, &e));
            false
        }
    }
}

fn render_outcome(outcome: &StressOutcome) -> String {
    let (summary, interrupted) = match outcome {
        StressOutcome::Cpu(report) => (
            format!(
                "CPU test complete: {} workers, {} iterations in {}",
                report.workers,
                format_count(report.total_iterations()),
                format_elapsed(report.elapsed)
            ),
            report.interrupted,
        ),
        StressOutcome::Memory(report) => (
            format!(
                "RAM test complete: held {} MB for {}",
                report.size_mb,
                format_elapsed(report.held)
            ),
            report.interrupted,
        ),
    };

    if interrupted {
        format!("{} (interrupted)", summary)
    } else {
        summary
    }
}

fn render_failure(kind: StressKind, err: &Error) -> String {
    match (kind, err) {
        (StressKind::Memory, Error::Allocation { .. }) => format!("Not enough memory! {}", err),
        (StressKind::Cpu, _) => format!("CPU test failed: {}", err),
        (StressKind::Memory, _) => format!("RAM test failed: {}", err),
    }
}
