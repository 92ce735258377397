use std::collections::HashSet;

use log::debug;

use super::graph::DependencyGraph;
use crate::error::Result;

/// Ordered phases of aliases; every phase may run concurrently once the
/// previous ones are done.
///
/// Excluding aliases never moves a job ahead of its prerequisites; phases left
/// empty by an exclusion are dropped, so later phases move up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionPlan {
    phases: Vec<Vec<String>>,
}

impl DependencyGraph {
    /// Layers the subgraph reachable from `start` into phases.
    ///
    /// Phase 0 is always `{start}`, even when `start` has prerequisites that
    /// are not reachable from it. A successor joins the next phase once every
    /// reachable prerequisite has been placed. Nodes on a cycle never get there
    /// and are left out of the plan.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::JenkinsBtError::UnknownAlias`] if `start` is not declared.
    pub fn schedule(&self, start: &str) -> Result<ExecutionPlan> {
        let start_idx = self.require(start, "start point")?;

        let mut remaining: Vec<usize> = self.nodes.iter().map(|n| n.prerequisites).collect();
        let mut scheduled = vec![false; self.nodes.len()];
        scheduled[start_idx] = true;

        let mut phases = Vec::new();
        let mut current = vec![start_idx];

        while !current.is_empty() {
            let mut next = Vec::new();

            for &idx in &current {
                for &succ in &self.nodes[idx].successors {
                    let Some(count) = remaining[succ].checked_sub(1) else {
                        continue;
                    };
                    remaining[succ] = count;

                    if count == 0 && !scheduled[succ] {
                        scheduled[succ] = true;
                        next.push(succ);
                    }
                }
            }

            phases.push(
                current
                    .iter()
                    .map(|&idx| self.nodes[idx].name.clone())
                    .collect(),
            );
            current = next;
        }

        debug!("Scheduled {} phases from '{start}'", phases.len());

        Ok(ExecutionPlan { phases })
    }
}

impl ExecutionPlan {
    /// Removes the given aliases and drops the phases they leave empty.
    ///
    /// Prerequisite counts are not re-resolved: successors of an excluded
    /// alias keep their relative order, as if it had run.
    #[must_use]
    pub fn exclude<S: AsRef<str>>(mut self, excluded: &[S]) -> Self {
        let excluded: HashSet<&str> = excluded.iter().map(|s| s.as_ref()).collect();
        for phase in &mut self.phases {
            phase.retain(|alias| !excluded.contains(alias.as_str()));
        }
        self.phases.retain(|phase| !phase.is_empty());
        self
    }

    /// All phases in order; none of them is empty.
    pub fn phases(&self) -> &[Vec<String>] {
        &self.phases
    }

    pub fn phase_count(&self) -> usize {
        self.phases.len()
    }

    pub fn total_jobs(&self) -> usize {
        self.phases.iter().map(Vec::len).sum()
    }

    /// `true` when there is nothing to build.
    pub fn is_empty(&self) -> bool {
        self.total_jobs() == 0
    }

    /// Zero-based phase index of `alias`, if it is part of the plan.
    pub fn phase_of(&self, alias: &str) -> Option<usize> {
        self.phases
            .iter()
            .position(|phase| phase.iter().any(|a| a == alias))
    }
}
