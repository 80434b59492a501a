//! Lexical environments
//!
//! A stack of scopes local to a single function activation. Globals live on
//! the shared interpreter state, not here; lookup falls back to them in the
//! evaluator.

use std::collections::HashMap;

use crate::interpreter::values::Value;

#[derive(Debug, Default)]
pub struct Env {
    scopes: Vec<HashMap<String, Value>>,
}

impl Env {
    pub fn new() -> Env {
        Env {
            scopes: vec![HashMap::new()],
        }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    pub fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    /// Introduce a binding in the innermost scope, shadowing any outer one.
    pub fn declare(&mut self, name: &str, value: Value) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), value);
        }
    }

    /// Assign to the nearest existing binding. Returns false when the name
    /// is not bound in any scope, so the caller can try globals.
    pub fn assign(&mut self, name: &str, value: Value) -> bool {
        for scope in self.scopes.iter_mut().rev() {
            if let Some(slot) = scope.get_mut(name) {
                *slot = value;
                return true;
            }
        }
        false
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inner_scope_shadows_outer() {
        let mut env = Env::new();
        env.declare("x", Value::int(1));
        env.push_scope();
        env.declare("x", Value::int(2));
        assert_eq!(env.get("x"), Some(&Value::int(2)));
        env.pop_scope();
        assert_eq!(env.get("x"), Some(&Value::int(1)));
    }

    #[test]
    fn assign_targets_nearest_binding() {
        let mut env = Env::new();
        env.declare("x", Value::int(1));
        env.push_scope();
        assert!(env.assign("x", Value::int(5)));
        env.pop_scope();
        assert_eq!(env.get("x"), Some(&Value::int(5)));
        assert!(!env.assign("missing", Value::Null));
    }
}
