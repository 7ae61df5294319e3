use std::sync::{
    mpsc::{self, Receiver, Sender},
    Mutex,
};

use crate::NubuildEvent;

/// Consumer of step events.
///
/// The CLI renders them; tests collect them.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: NubuildEvent);
}

/// Forwards events over a standard mpsc channel.
pub struct ChannelSink {
    sender: Sender<NubuildEvent>,
}

impl ChannelSink {
    pub fn new() -> (Self, Receiver<NubuildEvent>) {
        let (sender, receiver) = mpsc::channel();
        (Self { sender }, receiver)
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: NubuildEvent) {
        // A closed receiver means nobody is rendering anymore.
        let _ = self.sender.send(event);
    }
}

/// Discards every event.
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: NubuildEvent) {}
}

/// Keeps every event for later inspection.
#[derive(Default)]
pub struct CollectorSink {
    events: Mutex<Vec<NubuildEvent>>,
}

impl CollectorSink {
    pub fn events(&self) -> Vec<NubuildEvent> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<NubuildEvent>> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl EventSink for CollectorSink {
    fn emit(&self, event: NubuildEvent) {
        self.lock().push(event);
    }
}
