use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info, warn};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::config::Config;
use crate::jenkins::JenkinsClient;
use crate::output::{self, LiveTable};
use crate::pipeline::{Pipeline, RunOutcome};
use crate::plan::DependencyGraph;

#[derive(Parser, Debug)]
#[command(name = "jenkins-bt")]
#[command(author, version, about = "Build interdependent Jenkins jobs in dependency order", long_about = None)]
pub struct Cli {
    /// Path to the config file [default: ~/jenkins-bt-config.yml]
    #[arg(short = 'f', long, env = "JENKINS_BT_CONFIG")]
    config_file: Option<PathBuf>,

    /// Alias of the job to start building from
    #[arg(short, long)]
    start_point: Option<String>,

    /// Aliases to leave out of the build (repeatable or comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    exclude_aliases: Vec<String>,

    /// Keep going when jobs of a phase fail (default: fail fast)
    #[arg(long, default_value_t = false)]
    ignore_failed: bool,
}

impl Cli {
    pub async fn execute(&self) -> Result<ExitCode> {
        info!(
            "config_file={:?}, start_point={:?}, exclude_aliases={:?}, ignore_failed={}",
            self.config_file, self.start_point, self.exclude_aliases, self.ignore_failed
        );

        let Some(start_point) = self.start_point.as_deref() else {
            println!("Start point is required!");
            return Ok(ExitCode::SUCCESS);
        };

        let config_path = self.config_file.clone().unwrap_or_else(Config::default_path);
        let config = Config::load(&config_path)
            .with_context(|| format!("Failed to load config: {}", config_path.display()))?;

        let graph = DependencyGraph::build(
            config.aliases.keys().map(String::as_str),
            config.dependencies.iter().map(|(d, p)| (d.as_str(), p.as_str())),
        )?;
        if graph.is_empty() {
            warn!("No aliases declared in {}", config_path.display());
        }
        debug!("Dependency graph with {} aliases", graph.len());
        for alias in graph.aliases() {
            debug!(
                "{alias}: {} prerequisites, unblocks {:?}",
                graph.prerequisite_count(alias).unwrap_or_default(),
                graph.successors_of(alias)
            );
        }

        let mut plan = graph.schedule(start_point)?;
        for alias in &self.exclude_aliases {
            if !graph.contains(alias) {
                warn!("Excluded alias '{alias}' is not declared");
            } else if plan.phase_of(alias).is_none() {
                warn!("Excluded alias '{alias}' is not part of the build from '{start_point}'");
            }
        }
        if !self.exclude_aliases.is_empty() {
            plan = plan.exclude(&self.exclude_aliases);
        }

        if plan.is_empty() {
            warn!("No job to build from '{start_point}'");
            output::print_outcome(RunOutcome::EmptyPlan);
            return Ok(ExitCode::SUCCESS);
        }

        output::print_plan(&plan);

        let client = JenkinsClient::new(&config.endpoint, config.auth.clone())?;
        let outcome = Pipeline::from_config(&client, &config, self.ignore_failed)
            .run(&plan, &mut LiveTable::stdout())
            .await?;

        info!("Final build status: {outcome}");
        output::print_outcome(outcome);

        match outcome {
            RunOutcome::Failed { phase } => {
                info!("Stopped after phase #{phase}");
                Ok(ExitCode::FAILURE)
            }
            RunOutcome::Success | RunOutcome::EmptyPlan => Ok(ExitCode::SUCCESS),
        }
    }
}
