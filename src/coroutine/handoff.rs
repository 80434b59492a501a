//! Strict ping-pong handoff between a driver and one carrier thread
//!
//! Both directions use zero-capacity rendezvous channels, so exactly one
//! side makes progress at a time: the driver grants a turn, then blocks
//! until the carrier reports back with a suspend, a completion, or a
//! failure. The carrier blocks between turns.

use std::sync::mpsc::{sync_channel, Receiver, SyncSender};

use crate::interpreter::errors::{RuntimeError, RuntimeResult};
use crate::interpreter::values::Value;

/// What a carrier reports back to the driver at the end of its turn.
#[derive(Debug)]
pub enum CarrierEvent {
    /// The coroutine executed `suspend <expr>`.
    Suspended(Value),
    /// The coroutine body returned.
    Completed(Value),
    /// The coroutine body hit a runtime error.
    Failed(RuntimeError),
}

/// Driver side of the handoff, owned by the registry.
pub struct DriverEnd {
    token_tx: SyncSender<()>,
    event_rx: Receiver<CarrierEvent>,
}

/// Carrier side of the handoff, moved into the carrier thread.
pub struct CarrierLink {
    token_rx: Receiver<()>,
    event_tx: SyncSender<CarrierEvent>,
}

/// Build a connected driver/carrier pair.
pub fn channel() -> (DriverEnd, CarrierLink) {
    let (token_tx, token_rx) = sync_channel(0);
    let (event_tx, event_rx) = sync_channel(0);
    (
        DriverEnd { token_tx, event_rx },
        CarrierLink { token_rx, event_tx },
    )
}

impl DriverEnd {
    /// Unblock the carrier for one turn. Fails when the carrier thread is
    /// gone, which only happens if it panicked.
    pub fn grant_turn(&self) -> RuntimeResult<()> {
        self.token_tx
            .send(())
            .map_err(|_| RuntimeError::CarrierFailed("carrier thread is gone".into()))
    }

    /// Block until the carrier ends its turn.
    pub fn await_event(&self) -> RuntimeResult<CarrierEvent> {
        self.event_rx
            .recv()
            .map_err(|_| RuntimeError::CarrierFailed("carrier thread is gone".into()))
    }
}

impl CarrierLink {
    /// Block until the driver grants a turn. An error means the driver end
    /// was dropped and the carrier should unwind quietly.
    pub fn wait_for_turn(&self) -> RuntimeResult<()> {
        self.token_rx.recv().map_err(|_| RuntimeError::Shutdown)
    }

    /// End the current turn with a suspended value, then block until the
    /// next turn is granted.
    pub fn yield_value(&self, value: Value) -> RuntimeResult<()> {
        self.event_tx
            .send(CarrierEvent::Suspended(value))
            .map_err(|_| RuntimeError::Shutdown)?;
        self.wait_for_turn()
    }

    /// Report the final event for this coroutine. Best-effort: if the driver
    /// has already torn down, there is nobody left to tell.
    pub fn finish(&self, event: CarrierEvent) {
        let _ = self.event_tx.send(event);
    }
}
