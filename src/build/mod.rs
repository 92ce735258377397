mod orchestrator;
mod record;

pub use orchestrator::{BuildOrchestrator, PollSettings};
pub use record::{BuildRecord, BuildStatus, PhaseVerdict};

/// Receives progress of the phase being built.
pub trait PhaseReporter {
    /// Called before the first job of phase `number` (1-based) is triggered.
    fn phase_started(&mut self, _number: usize, _jobs: &[String]) {}

    /// Current state of every record, after triggering and after each polling tick.
    fn update(&mut self, records: &[BuildRecord]);

    fn phase_finished(&mut self, _verdict: PhaseVerdict) {}
}
