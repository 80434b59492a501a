//! Runtime error type shared by the evaluator and the coroutine engine.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error("invalid coroutine handle")]
    InvalidHandle,

    #[error("suspend outside a coroutine")]
    SuspendOutsideCoroutine,

    #[error("coroutine is already running")]
    CoroutineBusy,

    #[error("unknown variable '{0}'")]
    UnknownVariable(String),

    #[error("unknown function '{0}'")]
    UnknownFunction(String),

    #[error("'{0}' cannot be started as a coroutine")]
    NotCallable(String),

    #[error("type error: {0}")]
    TypeError(String),

    #[error("function '{name}' expects {expected} argument(s), got {got}")]
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
    },

    #[error("division by zero")]
    DivisionByZero,

    #[error("interpreter shutting down")]
    Shutdown,

    #[error("coroutine carrier failed: {0}")]
    CarrierFailed(String),

    #[error("i/o error: {0}")]
    Io(String),
}

pub type RuntimeResult<T> = Result<T, RuntimeError>;
