//! Per-coroutine bookkeeping held by the registry.

use serde::{Deserialize, Serialize};

use crate::coroutine::carrier::Carrier;
use crate::interpreter::values::Value;

/// Lifecycle of a coroutine as observed by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoroState {
    /// Spawned but never resumed; the body has not started.
    Created,
    /// A resume is in flight and the carrier holds the turn.
    Running,
    /// Parked at a `suspend`, waiting for the next resume.
    Suspended,
    /// The body returned or failed. Terminal.
    Completed,
}

pub struct Descriptor {
    pub state: CoroState,
    pub function: String,
    pub last_yielded: Option<Value>,
    pub return_value: Option<Value>,
    pub carrier: Option<Carrier>,
}

impl Descriptor {
    pub fn new(function: String, carrier: Carrier) -> Descriptor {
        Descriptor {
            state: CoroState::Created,
            function,
            last_yielded: None,
            return_value: None,
            carrier: Some(carrier),
        }
    }

    /// Reap the carrier thread once the coroutine is done.
    pub fn join_carrier(&mut self) {
        if let Some(carrier) = self.carrier.take() {
            carrier.join();
        }
    }
}
