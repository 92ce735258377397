use futures::future::join_all;
use indexmap::IndexMap;
use log::{debug, error, info, warn};
use std::time::Duration;
use tokio::time::Instant;

use super::record::{resolve_verdict, BuildRecord, BuildStatus, PhaseVerdict};
use super::PhaseReporter;
use crate::config::PollingConfig;
use crate::error::{JenkinsBtError, Result};
use crate::jenkins::{JobService, StageInfo};

/// Timing of the status polling loop.
#[derive(Debug, Clone, PartialEq)]
pub struct PollSettings {
    pub refresh_interval: Duration,
    pub retry_count: u32,
    pub retry_interval: Duration,
    pub phase_timeout: Option<Duration>,
}

impl From<&PollingConfig> for PollSettings {
    fn from(config: &PollingConfig) -> Self {
        Self {
            refresh_interval: config.refresh_interval(),
            retry_count: config.retry_count,
            retry_interval: config.retry_interval(),
            phase_timeout: config.phase_timeout(),
        }
    }
}

impl Default for PollSettings {
    fn default() -> Self {
        Self::from(&PollingConfig::default())
    }
}

/// Runs the jobs of a single phase to completion.
pub struct BuildOrchestrator<'a, S: JobService + ?Sized> {
    service: &'a S,
    jobs: &'a IndexMap<String, String>,
    settings: PollSettings,
    ignore_failed: bool,
}

impl<'a, S: JobService + ?Sized> BuildOrchestrator<'a, S> {
    pub fn new(
        service: &'a S,
        jobs: &'a IndexMap<String, String>,
        settings: PollSettings,
        ignore_failed: bool,
    ) -> Self {
        Self {
            service,
            jobs,
            settings,
            ignore_failed,
        }
    }

    /// Triggers every alias of the phase and polls until the phase settles.
    ///
    /// Returns SUCCESS or FAILED once the phase has settled. When failures are
    /// ignored, a failed phase is reported as IN_PROGRESS so the caller moves
    /// on to the next phase.
    ///
    /// # Errors
    ///
    /// Fails only if an alias has no job name. A job whose build number, trigger
    /// or status request fails is marked FAILED and the verdict rules decide.
    pub async fn run_phase(
        &self,
        aliases: &[String],
        reporter: &mut dyn PhaseReporter,
    ) -> Result<PhaseVerdict> {
        let mut records = self.init_records(aliases).await?;
        self.trigger_all(&mut records).await;
        reporter.update(&records);

        let started = Instant::now();
        let verdict = loop {
            tokio::time::sleep(self.settings.refresh_interval).await;

            self.poll_tick(&mut records).await;

            if let Some(timeout) = self.settings.phase_timeout {
                if started.elapsed() >= timeout {
                    Self::expire(&mut records, timeout);
                }
            }

            reporter.update(&records);

            let verdict = resolve_verdict(&records, self.ignore_failed);
            if verdict != PhaseVerdict::InProgress || records.iter().all(BuildRecord::is_terminal) {
                break verdict;
            }
        };

        info!("Phase finished with verdict {verdict}");

        if self.ignore_failed && verdict == PhaseVerdict::Failed {
            return Ok(PhaseVerdict::InProgress);
        }
        Ok(verdict)
    }

    async fn init_records(&self, aliases: &[String]) -> Result<Vec<BuildRecord>> {
        let mut records = Vec::with_capacity(aliases.len());

        for alias in aliases {
            let job_name = self
                .jobs
                .get(alias)
                .ok_or_else(|| JenkinsBtError::UnknownAlias {
                    alias: alias.clone(),
                    context: "build phase".to_string(),
                })?;

            match self.service.next_build_number(job_name).await {
                Ok(build_number) => records.push(BuildRecord::new(alias, job_name, build_number)),
                Err(e) => {
                    error!("Failed to look up the next build of {alias} ({job_name}): {e}");
                    let mut record = BuildRecord::new(alias, job_name, 0);
                    record.status = BuildStatus::Failed;
                    records.push(record);
                }
            }
        }

        Ok(records)
    }

    /// Triggers every record that has not failed yet; a rejected trigger fails its record.
    async fn trigger_all(&self, records: &mut [BuildRecord]) {
        let triggers = records.iter().map(|record| async move {
            if record.is_terminal() {
                return Ok(());
            }
            self.service.trigger(&record.job_name).await
        });
        let results = join_all(triggers).await;

        for (record, result) in records.iter_mut().zip(results) {
            if let Err(e) = result {
                error!("Failed to trigger {} ({}): {e}", record.alias, record.job_name);
                record.status = BuildStatus::Failed;
            }
        }

        info!(
            "Triggered {}",
            records
                .iter()
                .filter(|r| !r.is_terminal())
                .map(|r| format!("{} #{}", r.job_name, r.build_number))
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    /// Refreshes every non-terminal record concurrently.
    async fn poll_tick(&self, records: &mut [BuildRecord]) {
        let updates = records
            .iter_mut()
            .filter(|record| !record.is_terminal())
            .map(|record| async move {
                match self
                    .fetch_stage_info(&record.job_name, record.build_number)
                    .await
                {
                    Ok(info) => record.apply(&info),
                    Err(e) => {
                        error!("Failed to update build status of {}: {e}", record.alias);
                        record.status = BuildStatus::Failed;
                    }
                }
            });

        join_all(updates).await;
    }

    async fn fetch_stage_info(&self, job_name: &str, build_number: u64) -> Result<StageInfo> {
        let attempts = self.settings.retry_count.max(1);

        for attempt in 1..=attempts {
            match self.service.stage_info(job_name, build_number).await {
                Ok(Some(info)) => return Ok(info),
                Ok(None) => {
                    debug!("No stage info for {job_name} #{build_number} yet ({attempt}/{attempts})");
                }
                Err(e) => {
                    warn!(
                        "Stage info lookup for {job_name} #{build_number} failed ({attempt}/{attempts}): {e}"
                    );
                }
            }

            if attempt < attempts {
                tokio::time::sleep(self.settings.retry_interval).await;
            }
        }

        Err(JenkinsBtError::StatusUnavailable {
            job: job_name.to_string(),
            build: build_number,
            attempts,
        })
    }

    fn expire(records: &mut [BuildRecord], timeout: Duration) {
        for record in records.iter_mut().filter(|r| !r.is_terminal()) {
            error!(
                "{} #{} did not finish within {}s",
                record.job_name,
                record.build_number,
                timeout.as_secs()
            );
            record.status = BuildStatus::Failed;
        }
    }
}
