//! Process launching seam.
//!
//! Steps never spawn processes directly; they go through a [`Launcher`] so the CLI can swap
//! in [`DryRunLauncher`] and tests can script outcomes.

use std::{
    fmt,
    path::PathBuf,
    process::{Command, Stdio},
};

use tracing::{debug, info};

use crate::{error::ErrorContext, NubuildResult};

/// A fully built command line together with the directory it runs in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
}

impl Invocation {
    /// Returns the arguments as string slices, without the program.
    pub fn arg_strs(&self) -> Vec<&str> {
        self.args.iter().map(String::as_str).collect()
    }
}

fn quote(arg: &str) -> String {
    if arg.is_empty() || arg.contains(char::is_whitespace) {
        format!("\"{arg}\"")
    } else {
        arg.to_string()
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", quote(&self.program))?;
        for arg in &self.args {
            write!(f, " {}", quote(arg))?;
        }
        Ok(())
    }
}

/// How a launched process ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LaunchOutcome {
    /// The process ran to completion with this exit code.
    Exited(i32),
    /// The process was stopped before producing an exit code.
    Interrupted(String),
}

pub trait Launcher: Send + Sync {
    /// Runs `invocation` to completion, blocking the calling thread.
    ///
    /// Failing to start the process is an error; anything that happens after it started is
    /// reported through [`LaunchOutcome`].
    fn launch(&self, invocation: &Invocation) -> NubuildResult<LaunchOutcome>;
}

/// Runs commands as child processes with inherited output streams.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessLauncher;

impl Launcher for ProcessLauncher {
    fn launch(&self, invocation: &Invocation) -> NubuildResult<LaunchOutcome> {
        debug!(
            "executing '{}' in {}",
            invocation,
            invocation.working_dir.display()
        );

        let status = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.working_dir)
            .stdin(Stdio::null())
            .status()
            .with_context(|| format!("executing {}", invocation.program))?;

        match status.code() {
            Some(code) => Ok(LaunchOutcome::Exited(code)),
            None => {
                Ok(LaunchOutcome::Interrupted(format!(
                    "{} was interrupted ({})",
                    invocation.program, status
                )))
            }
        }
    }
}

/// Prints commands instead of running them and reports success.
#[derive(Clone, Copy, Debug, Default)]
pub struct DryRunLauncher;

impl Launcher for DryRunLauncher {
    fn launch(&self, invocation: &Invocation) -> NubuildResult<LaunchOutcome> {
        info!(
            "[dry-run] {} (in {})",
            invocation,
            invocation.working_dir.display()
        );
        Ok(LaunchOutcome::Exited(0))
    }
}
