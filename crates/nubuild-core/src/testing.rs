//! Scripted launcher for exercising steps without a NuGet executable.

use std::{collections::VecDeque, sync::Mutex};

use crate::{
    launcher::{Invocation, LaunchOutcome, Launcher},
    NubuildResult,
};

/// Records every invocation and answers with pre-scripted outcomes.
///
/// Once the script runs out, every further launch exits with code 0.
#[derive(Debug, Default)]
pub struct ScriptedLauncher {
    outcomes: Mutex<VecDeque<LaunchOutcome>>,
    invocations: Mutex<Vec<Invocation>>,
}

impl ScriptedLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_outcomes<I>(outcomes: I) -> Self
    where
        I: IntoIterator<Item = LaunchOutcome>,
    {
        Self {
            outcomes: Mutex::new(outcomes.into_iter().collect()),
            invocations: Mutex::default(),
        }
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations
            .lock()
            .map(|inv| inv.clone())
            .unwrap_or_default()
    }

    /// Argument lists of every launch, joined with spaces.
    pub fn command_lines(&self) -> Vec<String> {
        self.invocations()
            .iter()
            .map(|inv| inv.args.join(" "))
            .collect()
    }

    pub fn launch_count(&self) -> usize {
        self.invocations().len()
    }
}

impl Launcher for ScriptedLauncher {
    fn launch(&self, invocation: &Invocation) -> NubuildResult<LaunchOutcome> {
        self.invocations.lock()?.push(invocation.clone());
        Ok(self
            .outcomes
            .lock()?
            .pop_front()
            .unwrap_or(LaunchOutcome::Exited(0)))
    }
}
