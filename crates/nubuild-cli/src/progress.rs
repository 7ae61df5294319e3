use std::{sync::mpsc::Receiver, thread::JoinHandle};

use nu_ansi_term::Color::{Cyan, Green, Red, Yellow};
use nubuild_events::NubuildEvent;
use tracing::{debug, error, info, warn};

use crate::utils::{Colored, Icons};

/// Keeps the event rendering thread alive until it has drained the channel.
pub struct ProgressGuard {
    handle: Option<JoinHandle<()>>,
}

impl ProgressGuard {
    /// Waits for the rendering thread to print the remaining events.
    ///
    /// Every sender (the step context and its runners) must be dropped first, otherwise this
    /// blocks forever.
    pub fn finish(mut self) {
        if let Some(handle) = self.handle.take() {
            handle.join().ok();
        }
    }
}

fn render(event: NubuildEvent) {
    match event {
        NubuildEvent::StepStarting {
            op_id,
            kind,
            description,
        } => {
            debug!("[{}] {} step started: {}", op_id, kind, description);
        }
        NubuildEvent::CommandLaunching {
            command_line,
            attempt,
            ..
        } => {
            if attempt > 1 {
                info!(
                    "{} {} (attempt {})",
                    Colored(Cyan, Icons::ARROW),
                    command_line,
                    attempt
                );
            } else {
                info!("{} {}", Colored(Cyan, Icons::ARROW), command_line);
            }
        }
        NubuildEvent::CommandInterrupted {
            target,
            attempt,
            reason,
            ..
        } => {
            warn!(
                "{} NuGet was interrupted on attempt {} for '{}': {}",
                Colored(Yellow, Icons::WARNING),
                attempt,
                target,
                reason
            );
        }
        NubuildEvent::CommandRetrying { target, .. } => {
            debug!("retrying NuGet for '{}'", target);
        }
        NubuildEvent::CommandFinished {
            target,
            success,
            exit_code,
            ..
        } => {
            if success {
                info!("{} {}", Colored(Green, Icons::CHECK), target);
            } else {
                match exit_code {
                    Some(code) => {
                        error!(
                            "{} {} (exit code {})",
                            Colored(Red, Icons::CROSS),
                            target,
                            code
                        )
                    }
                    None => error!("{} {} (interrupted)", Colored(Red, Icons::CROSS), target),
                }
            }
        }
        NubuildEvent::StepSummary {
            op_id,
            kind,
            succeeded,
            total,
        } => {
            debug!("[{}] {} step finished: {}/{}", op_id, kind, succeeded, total);
        }
    }
}

/// Spawns a thread that prints step events as they arrive.
pub fn spawn_event_handler(receiver: Receiver<NubuildEvent>) -> ProgressGuard {
    let handle = std::thread::spawn(move || {
        while let Ok(event) = receiver.recv() {
            render(event);
        }
    });

    ProgressGuard {
        handle: Some(handle),
    }
}

#[cfg(test)]
mod tests {
    use nubuild_events::{ChannelSink, EventSink, StepKind};

    use super::*;

    #[test]
    fn test_guard_drains_after_sender_dropped() {
        let (sink, receiver) = ChannelSink::new();
        let guard = spawn_event_handler(receiver);

        sink.emit(NubuildEvent::StepSummary {
            op_id: 1,
            kind: StepKind::Pack,
            succeeded: 1,
            total: 1,
        });
        drop(sink);

        guard.finish();
    }
}
