//! NuGet command construction and the retrying executor.

use std::{path::PathBuf, sync::Arc};

use nubuild_config::verbosity::effective_verbosity;
use nubuild_events::{EventSinkHandle, NubuildEvent, OperationId};
use tracing::debug;

use crate::{
    cancel::CancellationToken,
    error::NubuildError,
    launcher::{Invocation, LaunchOutcome, Launcher},
    result::OperationResult,
    NubuildResult,
};

/// Number of extra attempts after an interrupted invocation.
pub const DEFAULT_RETRY_COUNT: u32 = 1;

pub const NON_INTERACTIVE: &str = "-NonInteractive";
pub const VERBOSITY: &str = "-Verbosity";

/// A NuGet subcommand together with its operation-specific arguments.
pub trait NugetCommand {
    /// Identifier recorded in the [`OperationResult`].
    fn target(&self) -> &str;

    /// Appends the subcommand and its arguments.
    fn enrich_arguments(&self, args: &mut Vec<String>);
}

/// `nuget pack <nuspec> -OutputDirectory <dir> -NonInteractive`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackCommand {
    pub nuspec: String,
    pub output_directory: String,
}

impl PackCommand {
    pub fn new(nuspec: impl Into<String>, output_directory: impl Into<String>) -> Self {
        Self {
            nuspec: nuspec.into(),
            output_directory: output_directory.into(),
        }
    }
}

impl NugetCommand for PackCommand {
    fn target(&self) -> &str {
        &self.nuspec
    }

    fn enrich_arguments(&self, args: &mut Vec<String>) {
        args.extend([
            "pack".to_string(),
            self.nuspec.clone(),
            "-OutputDirectory".to_string(),
            self.output_directory.clone(),
            NON_INTERACTIVE.to_string(),
        ]);
    }
}

/// `nuget restore <project> -Source <url> -NonInteractive`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RestoreCommand {
    pub project_path: String,
    pub source: String,
}

impl RestoreCommand {
    pub fn new(project_path: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            project_path: project_path.into(),
            source: source.into(),
        }
    }
}

impl NugetCommand for RestoreCommand {
    fn target(&self) -> &str {
        &self.project_path
    }

    fn enrich_arguments(&self, args: &mut Vec<String>) {
        args.extend([
            "restore".to_string(),
            self.project_path.clone(),
            "-Source".to_string(),
            self.source.clone(),
            NON_INTERACTIVE.to_string(),
        ]);
    }
}

/// Builds NuGet command lines and runs them, retrying interrupted invocations.
pub struct CommandRunner {
    nuget_exe: String,
    working_dir: PathBuf,
    verbosity: Option<String>,
    retry_count: u32,
    launcher: Arc<dyn Launcher>,
    events: EventSinkHandle,
    cancel: CancellationToken,
    op_id: OperationId,
}

impl CommandRunner {
    pub fn new(
        nuget_exe: impl Into<String>,
        working_dir: impl Into<PathBuf>,
        launcher: Arc<dyn Launcher>,
        events: EventSinkHandle,
    ) -> Self {
        Self {
            nuget_exe: nuget_exe.into(),
            working_dir: working_dir.into(),
            verbosity: None,
            retry_count: DEFAULT_RETRY_COUNT,
            launcher,
            events,
            cancel: CancellationToken::default(),
            op_id: 0,
        }
    }

    pub fn with_verbosity(mut self, verbosity: Option<String>) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn with_retry_count(mut self, retry_count: u32) -> Self {
        self.retry_count = retry_count;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_op_id(mut self, op_id: OperationId) -> Self {
        self.op_id = op_id;
        self
    }

    /// Builds `<exe> <command args> [-Verbosity <level>]`.
    pub fn build_invocation(&self, command: &dyn NugetCommand) -> Invocation {
        let mut args = Vec::new();
        command.enrich_arguments(&mut args);

        if let Some(verbosity) = effective_verbosity(self.verbosity.as_deref()) {
            args.push(VERBOSITY.to_string());
            args.push(verbosity.to_string());
        }

        Invocation {
            program: self.nuget_exe.clone(),
            args,
            working_dir: self.working_dir.clone(),
        }
    }

    /// Runs `command` and maps its exit code to an [`OperationResult`].
    ///
    /// A nonzero exit code is a failed result, not an error. An interrupted invocation is
    /// started again up to the retry count and counts as failed once the retries are used
    /// up. Interruptions after cancellation was requested abort with
    /// [`NubuildError::Cancelled`].
    pub fn execute(&self, command: &dyn NugetCommand) -> NubuildResult<OperationResult> {
        let invocation = self.build_invocation(command);
        let target = command.target();
        let max_attempts = self.retry_count.saturating_add(1);
        let mut attempt = 1;

        loop {
            if self.cancel.is_cancelled() {
                return Err(NubuildError::Cancelled);
            }

            debug!("attempt {} of {}: {}", attempt, max_attempts, invocation);
            self.events.emit(NubuildEvent::CommandLaunching {
                op_id: self.op_id,
                target: target.to_string(),
                attempt,
                command_line: invocation.to_string(),
            });

            match self.launcher.launch(&invocation)? {
                LaunchOutcome::Exited(code) => {
                    let success = code == 0;
                    if !success {
                        debug!("{} exited with code {}", invocation.program, code);
                    }
                    self.events.emit(NubuildEvent::CommandFinished {
                        op_id: self.op_id,
                        target: target.to_string(),
                        success,
                        exit_code: Some(code),
                    });
                    return Ok(OperationResult::new(target, success));
                }
                LaunchOutcome::Interrupted(reason) => {
                    debug!("{} interrupted on attempt {}: {}", target, attempt, reason);
                    self.events.emit(NubuildEvent::CommandInterrupted {
                        op_id: self.op_id,
                        target: target.to_string(),
                        attempt,
                        reason,
                    });

                    if self.cancel.is_cancelled() {
                        return Err(NubuildError::Cancelled);
                    }

                    if attempt >= max_attempts {
                        self.events.emit(NubuildEvent::CommandFinished {
                            op_id: self.op_id,
                            target: target.to_string(),
                            success: false,
                            exit_code: None,
                        });
                        return Ok(OperationResult::new(target, false));
                    }

                    debug!("retrying {} after attempt {}", target, attempt);
                    attempt += 1;
                    self.events.emit(NubuildEvent::CommandRetrying {
                        op_id: self.op_id,
                        target: target.to_string(),
                        attempt,
                    });
                }
            }
        }
    }
}
