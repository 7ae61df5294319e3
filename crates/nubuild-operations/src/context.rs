use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use nubuild_config::config::Config;
use nubuild_core::{
    cancel::CancellationToken,
    command::CommandRunner,
    launcher::{Launcher, ProcessLauncher},
};
use nubuild_events::{EventSinkHandle, OperationId};
use nubuild_utils::macros::expand_macros;

/// Variable holding the workspace path during macro expansion.
pub const WORKSPACE_VAR: &str = "WORKSPACE";

/// Everything a step needs to run: configuration, workspace, variables and the process seam.
#[derive(Clone)]
pub struct StepContext {
    config: Arc<Config>,
    workspace: PathBuf,
    env: HashMap<String, String>,
    events: EventSinkHandle,
    launcher: Arc<dyn Launcher>,
    cancel: CancellationToken,
}

impl StepContext {
    /// Creates a context whose macro variables are the process environment plus `WORKSPACE`.
    pub fn new(config: Config, workspace: impl Into<PathBuf>, events: EventSinkHandle) -> Self {
        let workspace = workspace.into();
        let mut env: HashMap<String, String> = std::env::vars().collect();
        env.insert(WORKSPACE_VAR.to_string(), workspace.display().to_string());

        Self {
            config: Arc::new(config),
            workspace,
            env,
            events,
            launcher: Arc::new(ProcessLauncher),
            cancel: CancellationToken::default(),
        }
    }

    /// Replaces the macro variables. `WORKSPACE` is always set.
    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.env = env;
        self.env.insert(
            WORKSPACE_VAR.to_string(),
            self.workspace.display().to_string(),
        );
        self
    }

    /// Adds or overrides macro variables.
    pub fn with_defines<I, K, V>(mut self, defines: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env
            .extend(defines.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn with_launcher(mut self, launcher: Arc<dyn Launcher>) -> Self {
        self.launcher = launcher;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    pub fn env(&self) -> &HashMap<String, String> {
        &self.env
    }

    pub fn events(&self) -> &EventSinkHandle {
        &self.events
    }

    pub fn cancel(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Expands `$VAR` and `${VAR}` references against the step variables.
    pub fn expand(&self, input: &str) -> String {
        expand_macros(input, &self.env)
    }

    /// Returns a runner that launches NuGet in the workspace.
    pub fn command_runner(&self, verbosity: Option<String>, op_id: OperationId) -> CommandRunner {
        CommandRunner::new(
            self.config.nuget_exe(),
            self.workspace.clone(),
            self.launcher.clone(),
            self.events.clone(),
        )
        .with_verbosity(verbosity)
        .with_cancellation(self.cancel.clone())
        .with_op_id(op_id)
    }
}

/// Returns a process-wide unique operation id.
pub fn next_op_id() -> OperationId {
    static COUNTER: AtomicU64 = AtomicU64::new(1);
    COUNTER.fetch_add(1, Ordering::Relaxed)
}
