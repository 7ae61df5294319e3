use nubuild_config::plan::{BuildPlan, StepSpec};
use nubuild_core::{error::NubuildError, NubuildResult};
use tracing::info;

use crate::{pack::pack, restore::restore, PlanReport, StepContext, StepReport};

pub fn run_step(ctx: &StepContext, step: &StepSpec) -> NubuildResult<StepReport> {
    match step {
        StepSpec::Pack(step) => pack(ctx, step).map(StepReport::Pack),
        StepSpec::Restore(step) => restore(ctx, step).map(StepReport::Restore),
    }
}

/// Runs the steps of `plan` in order and stops at the first failing step.
pub fn run_plan(ctx: &StepContext, plan: &BuildPlan) -> NubuildResult<PlanReport> {
    let steps = plan.resolved_steps();
    let total = steps.len();
    let mut report = PlanReport::default();

    for (idx, step) in steps.iter().enumerate() {
        if ctx.cancel().is_cancelled() {
            return Err(NubuildError::Cancelled);
        }

        info!("Step {}/{}: {}", idx + 1, total, step.kind());
        report.steps.push(run_step(ctx, step)?);
    }

    Ok(report)
}
