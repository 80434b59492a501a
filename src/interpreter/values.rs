//! Runtime values
//!
//! Every expression in the language evaluates to a [`Value`]. Declared types
//! are advisory: the interpreter checks operations dynamically, so an `int`
//! variable can hold a float or a coroutine handle without complaint.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::coroutine::CoroHandle;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Value {
    Null,
    Int { v: i64 },
    Float { v: f64 },
    Str { v: String },
    Bool { v: bool },
    Handle { v: CoroHandle },
}

impl Value {
    /// C-style truthiness: zero and NULL are false, everything else is true.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Int { v } => *v != 0,
            Value::Float { v } => *v != 0.0,
            Value::Str { v } => !v.is_empty(),
            Value::Bool { v } => *v,
            Value::Handle { .. } => true,
        }
    }

    pub fn int(v: i64) -> Value {
        Value::Int { v }
    }

    pub fn float(v: f64) -> Value {
        Value::Float { v }
    }

    pub fn str(v: impl Into<String>) -> Value {
        Value::Str { v: v.into() }
    }

    pub fn bool(v: bool) -> Value {
        Value::Bool { v }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Int { .. } => "int",
            Value::Float { .. } => "float",
            Value::Str { .. } => "string",
            Value::Bool { .. } => "bool",
            Value::Handle { .. } => "coroutine handle",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Int { v } => write!(f, "{}", v),
            Value::Float { v } => write!(f, "{}", v),
            Value::Str { v } => write!(f, "{}", v),
            Value::Bool { v } => write!(f, "{}", if *v { 1 } else { 0 }),
            Value::Handle { v } => write!(f, "coroutine#{}", v.id()),
        }
    }
}
