use std::collections::HashSet;

use crate::interpreter::ast::{Expr, Program};
use crate::interpreter::stdlib;
use crate::interpreter::validate::{Severity, ValidationError, ValidationRule};

use super::walk_exprs;

/// Every call and every `co_await` target must name a declared function or a
/// builtin. A builtin cannot be started as a coroutine.
pub struct UnknownFunctionRule;

impl ValidationRule for UnknownFunctionRule {
    fn id(&self) -> &'static str {
        "unknown-function"
    }

    fn description(&self) -> &'static str {
        "call targets must be declared functions or builtins"
    }

    fn validate(&self, program: &Program) -> Vec<ValidationError> {
        let declared: HashSet<&str> = program
            .functions
            .iter()
            .map(|f| f.name.as_str())
            .collect();

        let mut errors = Vec::new();
        for function in &program.functions {
            walk_exprs(&function.body, &mut |expr| match expr {
                Expr::Call { callee, .. } => {
                    if !declared.contains(callee.as_str()) && !stdlib::is_builtin(callee) {
                        errors.push(ValidationError {
                            rule_id: self.id().to_string(),
                            severity: Severity::Error,
                            message: format!("call to undeclared function '{}'", callee),
                            function: Some(function.name.clone()),
                        });
                    }
                }
                Expr::CoAwait { callee, .. } => {
                    if stdlib::is_builtin(callee) {
                        errors.push(ValidationError {
                            rule_id: self.id().to_string(),
                            severity: Severity::Error,
                            message: format!(
                                "builtin '{}' cannot be started as a coroutine",
                                callee
                            ),
                            function: Some(function.name.clone()),
                        });
                    } else if !declared.contains(callee.as_str()) {
                        errors.push(ValidationError {
                            rule_id: self.id().to_string(),
                            severity: Severity::Error,
                            message: format!("co_await of undeclared function '{}'", callee),
                            function: Some(function.name.clone()),
                        });
                    }
                }
                _ => {}
            });
        }

        errors
    }
}
