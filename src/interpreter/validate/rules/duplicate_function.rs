use std::collections::HashSet;

use crate::interpreter::ast::Program;
use crate::interpreter::validate::{Severity, ValidationError, ValidationRule};

/// Function names must be unique. Later definitions would silently shadow
/// earlier ones in the function table.
pub struct DuplicateFunctionRule;

impl ValidationRule for DuplicateFunctionRule {
    fn id(&self) -> &'static str {
        "duplicate-function"
    }

    fn description(&self) -> &'static str {
        "function names must be unique"
    }

    fn validate(&self, program: &Program) -> Vec<ValidationError> {
        let mut seen = HashSet::new();
        let mut errors = Vec::new();

        for function in &program.functions {
            if !seen.insert(function.name.as_str()) {
                errors.push(ValidationError {
                    rule_id: self.id().to_string(),
                    severity: Severity::Error,
                    message: format!("function '{}' is defined more than once", function.name),
                    function: Some(function.name.clone()),
                });
            }
        }

        errors
    }
}
