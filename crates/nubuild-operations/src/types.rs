use nubuild_core::result::OperationResult;
use serde::Serialize;

use crate::report::failure_count;

// ---- Pack ----

/// Outcome of a pack step.
#[derive(Clone, Debug, Serialize)]
pub struct PackReport {
    /// Pattern after macro expansion.
    pub nuspec_pattern: String,
    /// Output directory as passed to NuGet.
    pub output_directory: String,
    pub results: Vec<OperationResult>,
}

impl PackReport {
    pub fn succeeded(&self) -> usize {
        self.results.len() - failure_count(&self.results)
    }
}

// ---- Restore ----

/// Outcome of a restore step.
#[derive(Clone, Debug, Serialize)]
pub struct RestoreReport {
    pub repository: String,
    pub source: String,
    pub project_path: String,
    pub results: Vec<OperationResult>,
}

// ---- Plan ----

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StepReport {
    Pack(PackReport),
    Restore(RestoreReport),
}

/// Reports of every step of a build plan, in execution order.
#[derive(Clone, Debug, Default, Serialize)]
pub struct PlanReport {
    pub steps: Vec<StepReport>,
}
