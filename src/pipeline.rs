use indexmap::IndexMap;
use log::{info, warn};
use std::fmt;

use crate::build::{BuildOrchestrator, PhaseReporter, PhaseVerdict, PollSettings};
use crate::config::Config;
use crate::error::Result;
use crate::jenkins::JobService;
use crate::plan::ExecutionPlan;

/// Final result of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every phase ran (failures may have been ignored)
    Success,
    /// Phase `phase` (1-based) failed; later phases were not started
    Failed { phase: usize },
    /// Nothing left to build after exclusions
    EmptyPlan,
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("SUCCESS"),
            Self::Failed { .. } => f.write_str("FAILED"),
            Self::EmptyPlan => f.write_str("NOTHING_BUILT"),
        }
    }
}

/// Drives an execution plan phase by phase.
pub struct Pipeline<'a, S: JobService + ?Sized> {
    orchestrator: BuildOrchestrator<'a, S>,
}

impl<'a, S: JobService + ?Sized> Pipeline<'a, S> {
    pub fn new(
        service: &'a S,
        jobs: &'a IndexMap<String, String>,
        settings: PollSettings,
        ignore_failed: bool,
    ) -> Self {
        Self {
            orchestrator: BuildOrchestrator::new(service, jobs, settings, ignore_failed),
        }
    }

    pub fn from_config(service: &'a S, config: &'a Config, ignore_failed: bool) -> Self {
        Self::new(
            service,
            &config.aliases,
            PollSettings::from(&config.polling),
            ignore_failed,
        )
    }

    /// Runs the phases in order and stops at the first failed one.
    ///
    /// Jobs already running in a failed phase are left alone on the server.
    pub async fn run(
        &self,
        plan: &ExecutionPlan,
        reporter: &mut dyn PhaseReporter,
    ) -> Result<RunOutcome> {
        if plan.is_empty() {
            warn!("Execution plan is empty, nothing to build");
            return Ok(RunOutcome::EmptyPlan);
        }

        info!(
            "Building {} jobs in {} phases",
            plan.total_jobs(),
            plan.phase_count()
        );

        for (idx, aliases) in plan.phases().iter().enumerate() {
            let number = idx + 1;
            info!("Starting phase #{number}: {}", aliases.join(", "));
            reporter.phase_started(number, aliases);

            let verdict = self.orchestrator.run_phase(aliases, reporter).await?;
            reporter.phase_finished(verdict);

            if verdict == PhaseVerdict::Failed {
                warn!("Phase #{number} failed, remaining phases are not started");
                return Ok(RunOutcome::Failed { phase: number });
            }
        }

        Ok(RunOutcome::Success)
    }
}
