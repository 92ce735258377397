use serde::Deserialize;

/// Run description returned by the Pipeline Stage View API (`wfapi/describe`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageInfo {
    /// Run status (e.g. "IN_PROGRESS", "SUCCESS", "FAILED", "ABORTED")
    pub status: String,
    /// Stages executed so far, in execution order
    #[serde(default)]
    pub stages: Option<Vec<StageSummary>>,
    /// Elapsed run time in milliseconds
    #[serde(default)]
    pub duration_millis: u64,
}

/// A single stage within a pipeline run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageSummary {
    pub name: String,
}

impl StageInfo {
    /// Name of the most recent stage, if any has started.
    pub fn current_stage(&self) -> Option<&str> {
        self.stages
            .as_deref()
            .and_then(<[StageSummary]>::last)
            .map(|stage| stage.name.as_str())
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn duration_secs(&self) -> f64 {
        self.duration_millis as f64 / 1000.0
    }
}

/// Subset of `GET /job/<name>/api/json`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct JobInfo {
    pub next_build_number: u64,
}

/// Response of `GET /crumbIssuer/api/json`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct Crumb {
    pub crumb: String,
    pub crumb_request_field: String,
}
