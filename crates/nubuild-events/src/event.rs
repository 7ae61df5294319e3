use std::fmt;

use crate::OperationId;

/// Events emitted while steps run.
#[derive(Debug, Clone)]
pub enum NubuildEvent {
    /// A step begins.
    StepStarting {
        op_id: OperationId,
        kind: StepKind,
        description: String,
    },
    /// NuGet is about to be launched for one target.
    CommandLaunching {
        op_id: OperationId,
        target: String,
        attempt: u32,
        command_line: String,
    },
    /// The NuGet process was interrupted before it exited.
    CommandInterrupted {
        op_id: OperationId,
        target: String,
        attempt: u32,
        reason: String,
    },
    /// The interrupted invocation is started again.
    CommandRetrying {
        op_id: OperationId,
        target: String,
        attempt: u32,
    },
    /// Final outcome for one target.
    CommandFinished {
        op_id: OperationId,
        target: String,
        success: bool,
        exit_code: Option<i32>,
    },
    /// A step has collected all of its results.
    StepSummary {
        op_id: OperationId,
        kind: StepKind,
        succeeded: usize,
        total: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Pack,
    Restore,
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepKind::Pack => write!(f, "pack"),
            StepKind::Restore => write!(f, "restore"),
        }
    }
}
