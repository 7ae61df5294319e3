use std::{path::PathBuf, sync::Arc};

use nubuild_config::{
    config::Config,
    plan::{BuildPlan, PackStep, RestoreStep, StepSpec},
};
use nubuild_core::{
    cancel::CancellationToken,
    error::{ErrorContext, NubuildError},
    launcher::{DryRunLauncher, Launcher, ProcessLauncher},
    NubuildResult,
};
use nubuild_events::{ChannelSink, EventSinkHandle, NullSink};
use nubuild_operations::{plan::run_plan, plan::run_step, PlanReport, StepContext, StepReport};
use nubuild_utils::{error::FileSystemError, path::resolve_path};
use serde::Serialize;
use tracing::debug;

use crate::progress::{spawn_event_handler, ProgressGuard};

/// What a step command produced, printed under `--json`.
#[derive(Serialize)]
#[serde(untagged)]
pub enum RunOutput {
    Step(StepReport),
    Plan(PlanReport),
}

/// A step command after argument parsing.
pub enum StepRequest {
    Single(StepSpec),
    Plan(Option<String>),
}

pub struct RunSettings {
    pub workspace: PathBuf,
    pub defines: Vec<(String, String)>,
    pub dry_run: bool,
    pub render_events: bool,
    pub cancel: CancellationToken,
}

/// Resolves the workspace option, defaulting to the current directory.
pub fn resolve_workspace(workspace: Option<&str>) -> NubuildResult<PathBuf> {
    let workspace = match workspace {
        Some(path) => resolve_path(path)?,
        None => std::env::current_dir().with_context(|| "retrieving current directory".into())?,
    };

    if !workspace.is_dir() {
        return Err(FileSystemError::NotADirectory { path: workspace }.into());
    }
    Ok(workspace)
}

pub fn pack_request(
    nuspec_pattern: String,
    output_directory: String,
    fail_if_no_packages_are_created: bool,
    verbosity: Option<String>,
) -> NubuildResult<StepRequest> {
    let step = StepSpec::Pack(PackStep {
        fail_if_no_packages_are_created,
        verbosity,
        nuspec_pattern,
        output_directory,
    });
    step.validate(1)?;
    Ok(StepRequest::Single(step))
}

pub fn restore_request(
    project_path: String,
    repository: String,
    verbosity: Option<String>,
) -> NubuildResult<StepRequest> {
    let step = StepSpec::Restore(RestoreStep {
        repository,
        verbosity,
        project_path,
    });
    step.validate(1)?;
    Ok(StepRequest::Single(step))
}

fn create_context(
    config: Config,
    settings: &RunSettings,
) -> (StepContext, Option<ProgressGuard>) {
    let launcher: Arc<dyn Launcher> = if settings.dry_run {
        Arc::new(DryRunLauncher)
    } else {
        Arc::new(ProcessLauncher)
    };

    let (events, guard): (EventSinkHandle, _) = if settings.render_events {
        let (sink, receiver) = ChannelSink::new();
        (Arc::new(sink), Some(spawn_event_handler(receiver)))
    } else {
        (Arc::new(NullSink), None)
    };

    let ctx = StepContext::new(config, settings.workspace.clone(), events)
        .with_defines(settings.defines.iter().cloned())
        .with_launcher(launcher)
        .with_cancellation(settings.cancel.clone());

    (ctx, guard)
}

fn execute(ctx: &StepContext, request: StepRequest) -> NubuildResult<RunOutput> {
    match request {
        StepRequest::Single(step) => run_step(ctx, &step).map(RunOutput::Step),
        StepRequest::Plan(path) => {
            let plan_path = match path {
                Some(path) => resolve_path(&path)?,
                None => BuildPlan::default_path(ctx.workspace()),
            };
            debug!("loading build plan from {}", plan_path.display());
            let plan = BuildPlan::load(&plan_path)?;
            run_plan(ctx, &plan).map(RunOutput::Plan)
        }
    }
}

/// Runs the request on a blocking thread and waits for the event output to drain.
pub async fn run_request(
    config: Config,
    settings: RunSettings,
    request: StepRequest,
) -> NubuildResult<RunOutput> {
    let (ctx, guard) = create_context(config, &settings);

    let result = tokio::task::spawn_blocking(move || execute(&ctx, request))
        .await
        .map_err(|err| NubuildError::Custom(format!("step runner failed: {err}")));

    if let Some(guard) = guard {
        guard.finish();
    }

    result?
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_pack_request_requires_pattern() {
        assert!(pack_request(" ".into(), ".".into(), false, None).is_err());
        assert!(matches!(
            pack_request("*.nuspec".into(), ".".into(), false, Some("Loud".into())),
            Ok(StepRequest::Single(StepSpec::Pack(_)))
        ));
    }

    #[test]
    fn test_restore_request_requires_project() {
        assert!(restore_request(String::new(), "nuget.org".into(), None).is_err());
    }

    #[test]
    fn test_resolve_workspace_accepts_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().to_str().unwrap();
        assert_eq!(resolve_workspace(Some(path)).unwrap(), dir.path());
    }

    #[test]
    fn test_resolve_workspace_rejects_files() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("App.sln");
        std::fs::write(&file, "").unwrap();

        assert!(matches!(
            resolve_workspace(Some(file.to_str().unwrap())),
            Err(NubuildError::FileSystemError(FileSystemError::NotADirectory { path })) if path == file
        ));
    }

    #[test]
    fn test_resolve_workspace_rejects_missing_paths() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing");

        assert!(matches!(
            resolve_workspace(Some(missing.to_str().unwrap())),
            Err(NubuildError::FileSystemError(FileSystemError::NotADirectory { .. }))
        ));
    }
}
