//! Reduces per-file results to a step-level pass or fail.

use nubuild_core::{error::NubuildError, result::OperationResult, NubuildResult};

pub fn failure_count(results: &[OperationResult]) -> usize {
    results.iter().filter(|result| !result.success).count()
}

/// Fails when nothing matched and that is not allowed, or when any invocation failed.
pub fn check_pack_results(
    results: &[OperationResult],
    fail_if_no_packages_are_created: bool,
) -> NubuildResult<()> {
    if results.is_empty() && fail_if_no_packages_are_created {
        return Err(NubuildError::NoPackagesCreated);
    }

    let failed = failure_count(results);
    if failed > 0 {
        return Err(NubuildError::PackFailed { failed });
    }

    Ok(())
}

pub fn check_restore_results(results: &[OperationResult]) -> NubuildResult<()> {
    if results.is_empty() {
        return Err(NubuildError::NoPackagesRestored);
    }
    if failure_count(results) > 0 {
        return Err(NubuildError::RestoreFailed);
    }
    Ok(())
}
