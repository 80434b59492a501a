//! Thread-per-coroutine engine
//!
//! Coroutines are script functions started with `co_await`, driven with
//! `resume`, and paused with `suspend`. Each one runs on a dedicated carrier
//! thread; a strict ping-pong handoff channel guarantees that the driver and
//! the carrier never execute script code at the same time.

pub mod carrier;
pub mod descriptor;
pub mod handoff;
pub mod registry;

pub use descriptor::CoroState;
pub use registry::{CoroHandle, Registry};
