use nubuild_config::plan::PackStep;
use nubuild_core::{command::PackCommand, NubuildResult};
use nubuild_events::{NubuildEvent, StepKind};
use nubuild_utils::fileset::FileSet;
use tracing::{debug, info};

use crate::{
    context::next_op_id,
    report::{check_pack_results, failure_count},
    PackReport, StepContext,
};

/// Output directory argument for NuGet.
///
/// The value is passed as written: NuGet runs in the workspace, so relative directories
/// resolve against it and absolute ones are used verbatim.
fn output_directory_arg(expanded: &str) -> String {
    if expanded.trim().is_empty() {
        ".".to_string()
    } else {
        expanded.to_string()
    }
}

/// Runs `nuget pack` once for every nuspec file in the workspace matching the step's pattern.
///
/// The summary is logged before the step fails, whether nothing matched while packages were
/// required or some invocations failed.
pub fn pack(ctx: &StepContext, step: &PackStep) -> NubuildResult<PackReport> {
    let op_id = next_op_id();
    let nuspec_pattern = ctx.expand(&step.nuspec_pattern);
    let output_directory = output_directory_arg(&ctx.expand(&step.output_directory));

    info!(
        "Preparing to create NuGet packages in the folder '{}' for all nuspec files matching the pattern '{}'.",
        output_directory, nuspec_pattern
    );
    ctx.events().emit(NubuildEvent::StepStarting {
        op_id,
        kind: StepKind::Pack,
        description: nuspec_pattern.clone(),
    });

    let nuspec_paths = FileSet::new(&nuspec_pattern).scan(ctx.workspace())?;
    debug!("{} nuspec files matched", nuspec_paths.len());

    let runner = ctx.command_runner(step.verbosity.clone(), op_id);
    let mut results = Vec::with_capacity(nuspec_paths.len());

    for nuspec_path in &nuspec_paths {
        let result = runner.execute(&PackCommand::new(nuspec_path, &output_directory))?;
        info!(
            "Finished creating a NuGet package based on the nuspec file '{}'. Success={}.",
            nuspec_path, result.success
        );
        results.push(result);
    }

    let total = results.len();
    let succeeded = total - failure_count(&results);
    info!("Finished creating {}/{} NuGet packages.", succeeded, total);
    ctx.events().emit(NubuildEvent::StepSummary {
        op_id,
        kind: StepKind::Pack,
        succeeded,
        total,
    });

    check_pack_results(&results, step.fail_if_no_packages_are_created)?;

    Ok(PackReport {
        nuspec_pattern,
        output_directory,
        results,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use nubuild_core::{error::NubuildError, launcher::LaunchOutcome, testing::ScriptedLauncher};
    use nubuild_events::CollectorSink;
    use tempfile::tempdir;

    use super::*;
    use crate::test_utils::{test_context, touch};

    fn step(pattern: &str, output: &str, fail_if_none: bool) -> PackStep {
        PackStep {
            fail_if_no_packages_are_created: fail_if_none,
            verbosity: None,
            nuspec_pattern: pattern.to_string(),
            output_directory: output.to_string(),
        }
    }

    #[test]
    fn test_pack_each_matched_nuspec() {
        let ws = tempdir().unwrap();
        touch(ws.path(), "a.nuspec");
        touch(ws.path(), "b.nuspec");
        touch(ws.path(), "readme.md");

        let launcher = Arc::new(ScriptedLauncher::new());
        let ctx = test_context(ws.path(), launcher.clone(), Arc::default());

        let report = pack(&ctx, &step("**/*.nuspec", "out", true)).unwrap();

        assert_eq!(
            launcher.command_lines(),
            [
                "pack a.nuspec -OutputDirectory out -NonInteractive",
                "pack b.nuspec -OutputDirectory out -NonInteractive",
            ]
        );
        let targets: Vec<_> = report.results.iter().map(|r| r.target.as_str()).collect();
        assert_eq!(targets, ["a.nuspec", "b.nuspec"]);
        assert_eq!(report.succeeded(), 2);
        assert!(launcher
            .invocations()
            .iter()
            .all(|inv| inv.working_dir == ws.path()));
    }

    #[test]
    fn test_nested_matches_in_sorted_order() {
        let ws = tempdir().unwrap();
        touch(ws.path(), "src/Zeta/Zeta.nuspec");
        touch(ws.path(), "src/Alpha/Alpha.nuspec");
        touch(ws.path(), ".git/hooks/ignored.nuspec");

        let launcher = Arc::new(ScriptedLauncher::new());
        let ctx = test_context(ws.path(), launcher.clone(), Arc::default());

        let report = pack(&ctx, &step("src/**/*.nuspec", "", false)).unwrap();

        let targets: Vec<_> = report.results.iter().map(|r| r.target.as_str()).collect();
        assert_eq!(targets, ["src/Alpha/Alpha.nuspec", "src/Zeta/Zeta.nuspec"]);
        assert_eq!(report.output_directory, ".");
        assert_eq!(launcher.launch_count(), 2);
    }

    #[test]
    fn test_macros_are_expanded() {
        let ws = tempdir().unwrap();
        touch(ws.path(), "pkg/Lib.nuspec");

        let launcher = Arc::new(ScriptedLauncher::new());
        let ctx = test_context(ws.path(), launcher.clone(), Arc::default())
            .with_defines([("SPEC_DIR", "pkg")]);

        let report = pack(&ctx, &step("${SPEC_DIR}/*.nuspec", "out/$BUILD_NUMBER", true)).unwrap();

        assert_eq!(report.nuspec_pattern, "pkg/*.nuspec");
        assert_eq!(
            launcher.command_lines(),
            ["pack pkg/Lib.nuspec -OutputDirectory out/7 -NonInteractive"]
        );
    }

    #[test]
    fn test_verbosity_is_appended() {
        let ws = tempdir().unwrap();
        touch(ws.path(), "a.nuspec");

        let launcher = Arc::new(ScriptedLauncher::new());
        let ctx = test_context(ws.path(), launcher.clone(), Arc::default());
        let mut step = step("*.nuspec", "out", false);
        step.verbosity = Some("Quiet".to_string());

        pack(&ctx, &step).unwrap();
        assert_eq!(
            launcher.command_lines(),
            ["pack a.nuspec -OutputDirectory out -NonInteractive -Verbosity Quiet"]
        );
    }

    #[test]
    fn test_no_match_with_fail_if_none() {
        let ws = tempdir().unwrap();
        let launcher = Arc::new(ScriptedLauncher::new());
        let events = Arc::new(CollectorSink::default());
        let ctx = test_context(ws.path(), launcher.clone(), events.clone());

        let result = pack(&ctx, &step("**/*.nuspec", "out", true));

        assert!(matches!(result, Err(NubuildError::NoPackagesCreated)));
        assert_eq!(launcher.launch_count(), 0);
        assert!(events.events().iter().any(|event| matches!(
            event,
            NubuildEvent::StepSummary {
                succeeded: 0,
                total: 0,
                ..
            }
        )));
    }

    #[test]
    fn test_no_match_without_fail_if_none() {
        let ws = tempdir().unwrap();
        let launcher = Arc::new(ScriptedLauncher::new());
        let events = Arc::new(CollectorSink::default());
        let ctx = test_context(ws.path(), launcher.clone(), events.clone());

        let report = pack(&ctx, &step("**/*.nuspec", "out", false)).unwrap();

        assert!(report.results.is_empty());
        assert_eq!(report.succeeded(), 0);
        assert_eq!(launcher.launch_count(), 0);
        assert!(events.events().iter().any(|event| matches!(
            event,
            NubuildEvent::StepSummary {
                kind: StepKind::Pack,
                succeeded: 0,
                total: 0,
                ..
            }
        )));
    }

    #[test]
    fn test_failed_invocations_abort_with_count() {
        let ws = tempdir().unwrap();
        touch(ws.path(), "a.nuspec");
        touch(ws.path(), "b.nuspec");
        touch(ws.path(), "c.nuspec");

        let launcher = Arc::new(ScriptedLauncher::with_outcomes([
            LaunchOutcome::Exited(0),
            LaunchOutcome::Exited(1),
            LaunchOutcome::Exited(0),
        ]));
        let events = Arc::new(CollectorSink::default());
        let ctx = test_context(ws.path(), launcher.clone(), events.clone());

        let result = pack(&ctx, &step("*.nuspec", "out", true));

        assert!(matches!(result, Err(NubuildError::PackFailed { failed: 1 })));
        assert_eq!(launcher.launch_count(), 3);
        assert!(events.events().iter().any(|event| matches!(
            event,
            NubuildEvent::StepSummary {
                succeeded: 2,
                total: 3,
                ..
            }
        )));
    }

    #[test]
    fn test_interrupted_invocation_is_retried_once() {
        let ws = tempdir().unwrap();
        touch(ws.path(), "a.nuspec");

        let launcher = Arc::new(ScriptedLauncher::with_outcomes([
            LaunchOutcome::Interrupted("killed".to_string()),
            LaunchOutcome::Exited(0),
        ]));
        let ctx = test_context(ws.path(), launcher.clone(), Arc::default());

        let report = pack(&ctx, &step("a.nuspec", "out", true)).unwrap();

        assert_eq!(report.results.len(), 1);
        assert!(report.results[0].success);
        assert_eq!(launcher.launch_count(), 2);
    }

    #[test]
    fn test_missing_workspace_is_error() {
        let ws = tempdir().unwrap();
        let missing = ws.path().join("missing");
        let ctx = test_context(&missing, Arc::default(), Arc::default());

        assert!(matches!(
            pack(&ctx, &step("*.nuspec", "out", false)),
            Err(NubuildError::FileSystemError(_))
        ));
    }
}
