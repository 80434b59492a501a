//! Coroutine registry
//!
//! Owns every live coroutine: the descriptor, the driver end of the handoff
//! channel, and the carrier thread. Handles handed to scripts are opaque ids
//! into this table, so a script can never forge a pointer to engine state.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::coroutine::carrier::Carrier;
use crate::coroutine::descriptor::{CoroState, Descriptor};
use crate::coroutine::handoff::{self, CarrierEvent, DriverEnd};
use crate::interpreter::ast::FunDecl;
use crate::interpreter::errors::{RuntimeError, RuntimeResult};
use crate::interpreter::eval::Globals;
use crate::interpreter::values::Value;

/// Opaque coroutine identifier exposed to scripts as a `void *` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoroHandle(u64);

impl CoroHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

struct CoroCell {
    desc: Mutex<Descriptor>,
    /// Dropped on shutdown to disconnect the carrier.
    driver: Mutex<Option<DriverEnd>>,
}

#[derive(Default)]
pub struct Registry {
    cells: Mutex<HashMap<u64, Arc<CoroCell>>>,
    next_id: AtomicU64,
}

impl Registry {
    pub fn new() -> Registry {
        Registry {
            cells: Mutex::new(HashMap::new()),
            // Handle ids start at 1 so a handle is never confused with NULL.
            next_id: AtomicU64::new(1),
        }
    }

    /// Spawn a coroutine for `decl` with `args` already evaluated. The body
    /// does not run until the first resume.
    pub fn create(
        &self,
        globals: &Arc<Globals>,
        decl: FunDecl,
        args: Vec<Value>,
    ) -> RuntimeResult<CoroHandle> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (driver, link) = handoff::channel();
        let function = decl.name.clone();

        let carrier = Carrier::spawn(
            id,
            Arc::clone(globals),
            decl,
            args,
            link,
            globals.carrier_stack_bytes,
        )?;

        let cell = Arc::new(CoroCell {
            desc: Mutex::new(Descriptor::new(function.clone(), carrier)),
            driver: Mutex::new(Some(driver)),
        });

        self.cells
            .lock()
            .expect("registry lock poisoned")
            .insert(id, cell);

        debug!(id, function = %function, "coroutine created");
        Ok(CoroHandle(id))
    }

    /// Drive one turn of the coroutine: unblock its carrier, then block
    /// until it suspends, completes, or fails.
    ///
    /// Resuming a completed coroutine is a no-op. Resuming a coroutine that
    /// is already mid-turn (a coroutine resuming itself, or its ancestor) is
    /// an error.
    pub fn resume(&self, handle: CoroHandle) -> RuntimeResult<()> {
        let cell = {
            let cells = self.cells.lock().expect("registry lock poisoned");
            cells
                .get(&handle.0)
                .cloned()
                .ok_or(RuntimeError::InvalidHandle)?
        };

        {
            let mut desc = cell.desc.lock().expect("descriptor lock poisoned");
            match desc.state {
                CoroState::Completed => return Ok(()),
                CoroState::Running => return Err(RuntimeError::CoroutineBusy),
                CoroState::Created | CoroState::Suspended => {
                    desc.state = CoroState::Running;
                }
            }
        }

        // The descriptor lock is released while the carrier runs, so a body
        // is free to create or resume other coroutines during its turn.
        let outcome = {
            let driver = cell.driver.lock().expect("driver lock poisoned");
            match driver.as_ref() {
                None => Err(RuntimeError::Shutdown),
                Some(d) => d.grant_turn().and_then(|_| d.await_event()),
            }
        };

        let mut desc = cell.desc.lock().expect("descriptor lock poisoned");
        match outcome {
            Ok(CarrierEvent::Suspended(value)) => {
                debug!(id = handle.0, function = %desc.function, yielded = %value, "coroutine suspended");
                desc.state = CoroState::Suspended;
                desc.last_yielded = Some(value);
                Ok(())
            }
            Ok(CarrierEvent::Completed(value)) => {
                debug!(id = handle.0, function = %desc.function, "coroutine completed");
                desc.state = CoroState::Completed;
                desc.return_value = Some(value);
                desc.join_carrier();
                Ok(())
            }
            Ok(CarrierEvent::Failed(err)) => {
                debug!(id = handle.0, function = %desc.function, error = %err, "coroutine failed");
                desc.state = CoroState::Completed;
                desc.join_carrier();
                Err(err)
            }
            Err(err) => {
                desc.state = CoroState::Completed;
                desc.join_carrier();
                Err(err)
            }
        }
    }

    pub fn state(&self, handle: CoroHandle) -> Option<CoroState> {
        self.with_cell(handle, |desc| desc.state)
    }

    pub fn last_yielded(&self, handle: CoroHandle) -> Option<Value> {
        self.with_cell(handle, |desc| desc.last_yielded.clone())?
    }

    pub fn return_value(&self, handle: CoroHandle) -> Option<Value> {
        self.with_cell(handle, |desc| desc.return_value.clone())?
    }

    /// Name of the function the coroutine was constructed from.
    pub fn function_name(&self, handle: CoroHandle) -> Option<String> {
        self.with_cell(handle, |desc| desc.function.clone())
    }

    pub fn len(&self) -> usize {
        self.cells.lock().expect("registry lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn with_cell<T>(&self, handle: CoroHandle, f: impl FnOnce(&Descriptor) -> T) -> Option<T> {
        let cell = {
            let cells = self.cells.lock().expect("registry lock poisoned");
            cells.get(&handle.0).cloned()
        }?;
        let desc = cell.desc.lock().expect("descriptor lock poisoned");
        Some(f(&desc))
    }

    /// Disconnect every carrier and reap its thread. Carriers parked on the
    /// handoff channel observe the disconnect and unwind without running any
    /// further script code.
    pub fn shutdown(&self) {
        let cells: Vec<Arc<CoroCell>> = match self.cells.lock() {
            Ok(mut map) => map.drain().map(|(_, cell)| cell).collect(),
            Err(_) => return,
        };

        for cell in cells {
            if let Ok(mut driver) = cell.driver.lock() {
                driver.take();
            }
            if let Ok(mut desc) = cell.desc.lock() {
                desc.join_carrier();
            }
        }
    }
}

impl Drop for Registry {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::ast::{Expr, Stmt};
    use crate::interpreter::eval::RunOptions;
    use maplit::hashmap;

    /// float yielder() { suspend 1; return 2; }
    fn yielder() -> FunDecl {
        FunDecl {
            name: "yielder".to_string(),
            ret_type: "float".to_string(),
            params: vec![],
            body: vec![
                Stmt::Suspend {
                    expr: Expr::LitInt { v: 1 },
                },
                Stmt::Return {
                    value: Some(Expr::LitInt { v: 2 }),
                },
            ],
        }
    }

    fn test_globals(decl: &FunDecl) -> Arc<Globals> {
        Arc::new(Globals::new(
            hashmap! { decl.name.clone() => decl.clone() },
            Box::new(std::io::sink()),
            RunOptions::default(),
        ))
    }

    #[test]
    fn created_coroutine_has_not_run() {
        let decl = yielder();
        let globals = test_globals(&decl);
        let handle = globals
            .coroutines
            .create(&globals, decl, vec![])
            .unwrap();

        assert_eq!(globals.coroutines.state(handle), Some(CoroState::Created));
        assert_eq!(globals.coroutines.last_yielded(handle), None);
        assert_eq!(
            globals.coroutines.function_name(handle),
            Some("yielder".to_string())
        );
        globals.coroutines.shutdown();
    }

    #[test]
    fn resume_steps_through_suspend_and_completion() {
        let decl = yielder();
        let globals = test_globals(&decl);
        let handle = globals
            .coroutines
            .create(&globals, decl, vec![])
            .unwrap();

        globals.coroutines.resume(handle).unwrap();
        assert_eq!(globals.coroutines.state(handle), Some(CoroState::Suspended));
        assert_eq!(
            globals.coroutines.last_yielded(handle),
            Some(Value::int(1))
        );

        globals.coroutines.resume(handle).unwrap();
        assert_eq!(globals.coroutines.state(handle), Some(CoroState::Completed));
        assert_eq!(
            globals.coroutines.return_value(handle),
            Some(Value::int(2))
        );

        // Completed coroutines accept further resumes as no-ops.
        globals.coroutines.resume(handle).unwrap();
        globals.coroutines.shutdown();
    }

    #[test]
    fn unknown_handle_is_rejected() {
        let decl = yielder();
        let globals = test_globals(&decl);
        assert_eq!(
            globals.coroutines.resume(CoroHandle(99)),
            Err(RuntimeError::InvalidHandle)
        );
    }

    #[test]
    fn shutdown_reaps_suspended_carriers() {
        let decl = yielder();
        let globals = test_globals(&decl);
        let a = globals
            .coroutines
            .create(&globals, decl.clone(), vec![])
            .unwrap();
        let _b = globals
            .coroutines
            .create(&globals, decl, vec![])
            .unwrap();

        globals.coroutines.resume(a).unwrap();

        // One coroutine suspended, one never started. Must not hang.
        globals.coroutines.shutdown();
        assert!(globals.coroutines.is_empty());
    }
}
