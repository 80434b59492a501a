//! Carrier threads
//!
//! Each coroutine body runs on its own OS thread. The thread starts parked
//! on the handoff channel, so nothing in the body executes before the first
//! `resume`.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::debug;

use crate::coroutine::handoff::{CarrierEvent, CarrierLink};
use crate::interpreter::ast::FunDecl;
use crate::interpreter::errors::{RuntimeError, RuntimeResult};
use crate::interpreter::eval::{Globals, Interpreter};
use crate::interpreter::values::Value;

pub struct Carrier {
    handle: JoinHandle<()>,
}

impl Carrier {
    /// Spawn a carrier thread for one coroutine. The body does not run until
    /// the driver grants the first turn.
    pub fn spawn(
        id: u64,
        globals: Arc<Globals>,
        decl: FunDecl,
        args: Vec<Value>,
        link: CarrierLink,
        stack_bytes: usize,
    ) -> RuntimeResult<Carrier> {
        let handle = thread::Builder::new()
            .name(format!("carrier-{}", id))
            .stack_size(stack_bytes)
            .spawn(move || run_carrier(globals, decl, args, link))
            .map_err(|e| RuntimeError::CarrierFailed(e.to_string()))?;

        Ok(Carrier { handle })
    }

    /// Wait for the carrier thread to exit.
    pub fn join(self) {
        if self.handle.join().is_err() {
            debug!("carrier thread panicked during shutdown");
        }
    }
}

fn run_carrier(globals: Arc<Globals>, decl: FunDecl, args: Vec<Value>, link: CarrierLink) {
    // First turn. If the driver tore down before ever resuming, the body
    // never runs at all.
    if link.wait_for_turn().is_err() {
        return;
    }

    let name = decl.name.clone();
    let mut interp = Interpreter::with_link(globals, link);
    let result = interp.call_function(&decl, args);
    let Some(link) = interp.into_link() else {
        return;
    };

    match result {
        Ok(value) => {
            debug!(coroutine = %name, "coroutine body completed");
            link.finish(CarrierEvent::Completed(value));
        }
        Err(RuntimeError::Shutdown) => {
            // Driver went away mid-run. Nothing to report.
        }
        Err(err) => {
            debug!(coroutine = %name, error = %err, "coroutine body failed");
            link.finish(CarrierEvent::Failed(err));
        }
    }
}
