mod live;
mod styling;
mod tables;

pub use live::LiveTable;

use crate::pipeline::RunOutcome;
use crate::plan::ExecutionPlan;
use styling::{banner, dim, failure, success};

/// Prints the `jenkins-bt` banner to stderr.
pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        banner("🔨 jenkins-bt"),
        dim(env!("CARGO_PKG_VERSION")),
        dim("Jenkins dependency-ordered builds")
    );
}

pub fn print_plan(plan: &ExecutionPlan) {
    println!(
        "Total jobs: {}. Total phases: {}\n",
        plan.total_jobs(),
        plan.phase_count()
    );
}

/// Single-line final verdict, always printed.
pub fn print_outcome(outcome: RunOutcome) {
    match outcome {
        RunOutcome::EmptyPlan => println!("No job built!"),
        RunOutcome::Success => println!("\nFinal build status: {}", success(outcome)),
        RunOutcome::Failed { .. } => println!("\nFinal build status: {}", failure(outcome)),
    }
}
