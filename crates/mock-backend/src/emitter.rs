//! Realtime emitter that records what it is asked to send.

use std::sync::Mutex;

use async_trait::async_trait;
use roadmate_core::{BackendError, OutboundEvent, RealtimeEmitter};

use crate::faults::{lock, Faults};

#[derive(Debug, Default)]
pub struct RecordingEmitter {
    events: Mutex<Vec<OutboundEvent>>,
    faults: Faults,
}

impl RecordingEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events successfully emitted so far.
    pub fn events(&self) -> Vec<OutboundEvent> {
        lock(&self.events).clone()
    }

    pub fn faults(&self) -> &Faults {
        &self.faults
    }
}

#[async_trait]
impl RealtimeEmitter for RecordingEmitter {
    async fn emit(&self, event: OutboundEvent) -> Result<(), BackendError> {
        self.faults.check("emit")?;
        lock(&self.events).push(event);
        Ok(())
    }
}
