use crate::interpreter::ast::{Program, Stmt};
use crate::interpreter::validate::{Severity, ValidationError, ValidationRule};

use super::walk_stmts;

/// `suspend` only makes sense inside a coroutine body. The entry point runs
/// on the main thread and has no driver to yield to, so a suspend in `main`
/// can only ever fail at runtime.
pub struct SuspendPlacementRule;

impl ValidationRule for SuspendPlacementRule {
    fn id(&self) -> &'static str {
        "suspend-outside-coroutine"
    }

    fn description(&self) -> &'static str {
        "suspend statements must not appear in main"
    }

    fn validate(&self, program: &Program) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        let Some(main) = program.function("main") else {
            return errors;
        };

        walk_stmts(&main.body, &mut |stmt| {
            if matches!(stmt, Stmt::Suspend { .. }) {
                errors.push(ValidationError {
                    rule_id: self.id().to_string(),
                    severity: Severity::Error,
                    message: "suspend cannot appear in main; only coroutine bodies may suspend"
                        .to_string(),
                    function: Some("main".to_string()),
                });
            }
        });

        errors
    }
}
