use serde::{Deserialize, Serialize};
use std::fmt;

use crate::jenkins::StageInfo;

pub const UNKNOWN_STAGE: &str = "?";

/// Status of one triggered run.
///
/// Jenkins reports statuses as strings; the ones the orchestrator acts upon
/// get their own variant, anything else is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BuildStatus {
    /// Triggered, no status reported yet
    Initiated,
    InProgress,
    Success,
    Failed,
    Aborted,
    Other(String),
}

impl BuildStatus {
    /// SUCCESS, FAILED and ABORTED stop polling for a job.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Failed | Self::Aborted)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Initiated => "INITIATED",
            Self::InProgress => "IN_PROGRESS",
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
            Self::Aborted => "ABORTED",
            Self::Other(status) => status,
        }
    }
}

impl From<String> for BuildStatus {
    fn from(status: String) -> Self {
        match status.as_str() {
            "INITIATED" => Self::Initiated,
            "IN_PROGRESS" => Self::InProgress,
            "SUCCESS" => Self::Success,
            "FAILED" => Self::Failed,
            "ABORTED" => Self::Aborted,
            _ => Self::Other(status),
        }
    }
}

impl From<&str> for BuildStatus {
    fn from(status: &str) -> Self {
        Self::from(status.to_string())
    }
}

impl From<BuildStatus> for String {
    fn from(status: BuildStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One job run within a phase.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildRecord {
    pub alias: String,
    pub job_name: String,
    /// Predicted from the job's next build number before triggering
    pub build_number: u64,
    pub status: BuildStatus,
    /// Last known stage name, "?" until one is reported
    pub stage: String,
    /// Elapsed run time in seconds
    pub duration: f64,
}

impl BuildRecord {
    pub fn new(alias: impl Into<String>, job_name: impl Into<String>, build_number: u64) -> Self {
        Self {
            alias: alias.into(),
            job_name: job_name.into(),
            build_number,
            status: BuildStatus::Initiated,
            stage: UNKNOWN_STAGE.to_string(),
            duration: 0.0,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Applies a status report. The stage is kept when no stage has started.
    pub fn apply(&mut self, info: &StageInfo) {
        self.status = BuildStatus::from(info.status.as_str());
        self.duration = info.duration_secs();
        if let Some(stage) = info.current_stage() {
            self.stage = stage.to_string();
        }
    }
}

/// Aggregate status of a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseVerdict {
    InProgress,
    Success,
    Failed,
}

impl fmt::Display for PhaseVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::InProgress => "IN_PROGRESS",
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
        };
        f.write_str(text)
    }
}

/// Aggregates the current statuses of a phase.
///
/// SUCCESS when every record succeeded, FAILED when any record failed or,
/// unless `ignore_failed` is set, was aborted. IN_PROGRESS otherwise.
pub fn resolve_verdict(records: &[BuildRecord], ignore_failed: bool) -> PhaseVerdict {
    if !records.is_empty() && records.iter().all(|r| r.status == BuildStatus::Success) {
        return PhaseVerdict::Success;
    }

    let any_failed = records.iter().any(|r| r.status == BuildStatus::Failed);
    let any_aborted = records.iter().any(|r| r.status == BuildStatus::Aborted);
    if any_failed || (!ignore_failed && any_aborted) {
        return PhaseVerdict::Failed;
    }

    PhaseVerdict::InProgress
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jenkins::StageSummary;

    fn records(statuses: &[&str]) -> Vec<BuildRecord> {
        statuses
            .iter()
            .enumerate()
            .map(|(i, status)| {
                let mut record = BuildRecord::new(format!("J{i}"), format!("job-{i}"), 1);
                record.status = BuildStatus::from(*status);
                record
            })
            .collect()
    }

    #[test]
    fn parses_known_and_unknown_statuses() {
        assert_eq!(BuildStatus::from("SUCCESS"), BuildStatus::Success);
        assert_eq!(BuildStatus::from("IN_PROGRESS"), BuildStatus::InProgress);
        assert_eq!(
            BuildStatus::from("NOT_EXECUTED"),
            BuildStatus::Other("NOT_EXECUTED".to_string())
        );
        assert_eq!(BuildStatus::from("UNSTABLE").to_string(), "UNSTABLE");
    }

    #[test]
    fn only_success_failed_aborted_are_terminal() {
        for status in ["SUCCESS", "FAILED", "ABORTED"] {
            assert!(BuildStatus::from(status).is_terminal(), "{status}");
        }
        for status in ["INITIATED", "IN_PROGRESS", "PAUSED_PENDING_INPUT", "UNSTABLE"] {
            assert!(!BuildStatus::from(status).is_terminal(), "{status}");
        }
    }

    #[test]
    fn new_record_starts_initiated() {
        let record = BuildRecord::new("A", "job-a", 12);

        assert_eq!(record.status, BuildStatus::Initiated);
        assert_eq!(record.stage, "?");
        assert_eq!(record.build_number, 12);
        assert!(!record.is_terminal());
    }

    #[test]
    fn apply_updates_status_stage_and_duration() {
        let mut record = BuildRecord::new("A", "job-a", 3);

        record.apply(&StageInfo {
            status: "IN_PROGRESS".to_string(),
            stages: Some(vec![StageSummary {
                name: "Compile".to_string(),
            }]),
            duration_millis: 2500,
        });
        assert_eq!(record.stage, "Compile");
        assert_eq!(record.status, BuildStatus::InProgress);
        assert!((record.duration - 2.5).abs() < f64::EPSILON);

        record.apply(&StageInfo {
            status: "SUCCESS".to_string(),
            stages: Some(vec![]),
            duration_millis: 9000,
        });
        assert_eq!(record.stage, "Compile");
        assert_eq!(record.status, BuildStatus::Success);
    }

    #[test]
    fn verdict_success_requires_every_job() {
        assert_eq!(
            resolve_verdict(&records(&["SUCCESS", "SUCCESS"]), false),
            PhaseVerdict::Success
        );
        assert_eq!(
            resolve_verdict(&records(&["SUCCESS", "IN_PROGRESS"]), false),
            PhaseVerdict::InProgress
        );
        assert_eq!(resolve_verdict(&[], false), PhaseVerdict::InProgress);
    }

    #[test]
    fn verdict_failed_on_any_failure() {
        for ignore_failed in [false, true] {
            assert_eq!(
                resolve_verdict(&records(&["SUCCESS", "FAILED", "IN_PROGRESS"]), ignore_failed),
                PhaseVerdict::Failed
            );
        }
    }

    #[test]
    fn verdict_aborted_depends_on_ignore_failed() {
        let aborted = records(&["SUCCESS", "ABORTED"]);

        assert_eq!(resolve_verdict(&aborted, false), PhaseVerdict::Failed);
        assert_eq!(resolve_verdict(&aborted, true), PhaseVerdict::InProgress);
    }

    #[test]
    fn status_serializes_as_plain_string() {
        let json = serde_json::to_string(&BuildStatus::Aborted).unwrap();
        assert_eq!(json, "\"ABORTED\"");

        let parsed: BuildStatus = serde_json::from_str("\"QUEUED\"").unwrap();
        assert_eq!(parsed, BuildStatus::Other("QUEUED".to_string()));
    }
}
