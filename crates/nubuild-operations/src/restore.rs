use nubuild_config::plan::RestoreStep;
use nubuild_core::{command::RestoreCommand, error::NubuildError, NubuildResult};
use nubuild_events::{NubuildEvent, StepKind};
use nubuild_utils::path::resolve_against;
use tracing::info;

use crate::{
    context::next_op_id,
    report::{check_restore_results, failure_count},
    RestoreReport, StepContext,
};

/// Runs `nuget restore` once for the step's project against a configured repository.
///
/// The repository is looked up by exact name before anything is launched.
pub fn restore(ctx: &StepContext, step: &RestoreStep) -> NubuildResult<RestoreReport> {
    let op_id = next_op_id();
    let project_path = resolve_against(ctx.workspace(), ctx.expand(&step.project_path))
        .display()
        .to_string();

    let repository = ctx
        .config()
        .get_repository(&step.repository)
        .ok_or_else(|| NubuildError::RepositoryNotFound(step.repository.clone()))?;

    info!(
        "Preparing to restore NuGet packages from the NuGet repository named '{}' at '{}' for the project path '{}'.",
        repository.name, repository.url, project_path
    );
    ctx.events().emit(NubuildEvent::StepStarting {
        op_id,
        kind: StepKind::Restore,
        description: project_path.clone(),
    });

    let runner = ctx.command_runner(step.verbosity.clone(), op_id);
    let result = runner.execute(&RestoreCommand::new(&project_path, &repository.url))?;
    info!(
        "Finished restoring NuGet packages for the project path '{}'. Success={}.",
        project_path, result.success
    );

    let results = vec![result];
    info!("Finished restoring NuGet packages.");
    ctx.events().emit(NubuildEvent::StepSummary {
        op_id,
        kind: StepKind::Restore,
        succeeded: results.len() - failure_count(&results),
        total: results.len(),
    });

    check_restore_results(&results)?;

    Ok(RestoreReport {
        repository: repository.name.clone(),
        source: repository.url.clone(),
        project_path,
        results,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use nubuild_core::{launcher::LaunchOutcome, testing::ScriptedLauncher};
    use nubuild_events::CollectorSink;
    use tempfile::tempdir;

    use super::*;
    use crate::test_utils::test_context;

    fn step(repository: &str, project_path: &str) -> RestoreStep {
        RestoreStep {
            repository: repository.to_string(),
            verbosity: None,
            project_path: project_path.to_string(),
        }
    }

    #[test]
    fn test_restore_runs_once_against_repository() {
        let ws = tempdir().unwrap();
        let launcher = Arc::new(ScriptedLauncher::new());
        let ctx = test_context(ws.path(), launcher.clone(), Arc::default());

        let report = restore(&ctx, &step("internal", "src/App.sln")).unwrap();

        let expected_path = ws.path().join("src/App.sln").display().to_string();
        assert_eq!(report.project_path, expected_path);
        assert_eq!(report.source, "https://nuget.internal/v3/index.json");
        assert_eq!(report.results.len(), 1);
        assert_eq!(report.results[0].target, expected_path);

        let invocations = launcher.invocations();
        assert_eq!(invocations.len(), 1);
        assert_eq!(
            invocations[0].arg_strs(),
            [
                "restore",
                expected_path.as_str(),
                "-Source",
                "https://nuget.internal/v3/index.json",
                "-NonInteractive"
            ]
        );
    }

    #[test]
    fn test_absolute_project_path_is_used_verbatim() {
        let ws = tempdir().unwrap();
        let other = tempdir().unwrap();
        let absolute = other.path().join("App.csproj").display().to_string();

        let launcher = Arc::new(ScriptedLauncher::new());
        let ctx = test_context(ws.path(), launcher.clone(), Arc::default());

        let report = restore(&ctx, &step("nuget.org", &absolute)).unwrap();
        assert_eq!(report.project_path, absolute);
    }

    #[test]
    fn test_project_path_macros_are_expanded() {
        let ws = tempdir().unwrap();
        let launcher = Arc::new(ScriptedLauncher::new());
        let ctx = test_context(ws.path(), launcher.clone(), Arc::default())
            .with_defines([("SOLUTION", "Build.sln")]);

        let report = restore(&ctx, &step("nuget.org", "$SOLUTION")).unwrap();
        assert_eq!(
            report.project_path,
            ws.path().join("Build.sln").display().to_string()
        );
    }

    #[test]
    fn test_unknown_repository_aborts_before_launch() {
        let ws = tempdir().unwrap();
        let launcher = Arc::new(ScriptedLauncher::new());
        let events = Arc::new(CollectorSink::default());
        let ctx = test_context(ws.path(), launcher.clone(), events.clone());

        let result = restore(&ctx, &step("NuGet.org", "App.sln"));

        assert!(matches!(
            result,
            Err(NubuildError::RepositoryNotFound(name)) if name == "NuGet.org"
        ));
        assert_eq!(launcher.launch_count(), 0);
        assert!(events.is_empty());
    }

    #[test]
    fn test_failed_restore_aborts() {
        let ws = tempdir().unwrap();
        let launcher = Arc::new(ScriptedLauncher::with_outcomes([LaunchOutcome::Exited(1)]));
        let ctx = test_context(ws.path(), launcher.clone(), Arc::default());

        assert!(matches!(
            restore(&ctx, &step("nuget.org", "App.sln")),
            Err(NubuildError::RestoreFailed)
        ));
        assert_eq!(launcher.launch_count(), 1);
    }

    #[test]
    fn test_interrupted_twice_fails() {
        let ws = tempdir().unwrap();
        let launcher = Arc::new(ScriptedLauncher::with_outcomes([
            LaunchOutcome::Interrupted("killed".to_string()),
            LaunchOutcome::Interrupted("killed".to_string()),
        ]));
        let ctx = test_context(ws.path(), launcher.clone(), Arc::default());

        assert!(matches!(
            restore(&ctx, &step("nuget.org", "App.sln")),
            Err(NubuildError::RestoreFailed)
        ));
        assert_eq!(launcher.launch_count(), 2);
    }
}
