mod client;
mod types;

pub use client::JenkinsClient;
pub use types::{StageInfo, StageSummary};

use async_trait::async_trait;

use crate::error::Result;

/// Remote service that runs the jobs of a phase.
#[async_trait]
pub trait JobService: Send + Sync {
    /// Number the server will assign to the next run of `job_name`.
    async fn next_build_number(&self, job_name: &str) -> Result<u64>;

    /// Enqueue a run of `job_name`. The server does not report the build number.
    async fn trigger(&self, job_name: &str) -> Result<()>;

    /// Stage information of a run, or `None` while the run is still queued.
    async fn stage_info(&self, job_name: &str, build_number: u64) -> Result<Option<StageInfo>>;
}
