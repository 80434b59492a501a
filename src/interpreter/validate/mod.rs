//! Static checks run before execution
//!
//! These catch mistakes the evaluator would otherwise only hit at runtime,
//! possibly deep inside a coroutine. Each check is a [`ValidationRule`]; the
//! [`Validator`] runs the full set and collects diagnostics.

pub mod rules;


use serde::{Deserialize, Serialize};

use crate::interpreter::ast::Program;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationError {
    pub rule_id: String,
    pub severity: Severity,
    pub message: String,
    /// Function the diagnostic points at, when there is one.
    pub function: Option<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let level = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        match &self.function {
            Some(function) => write!(f, "{}[{}] in {}: {}", level, self.rule_id, function, self.message),
            None => write!(f, "{}[{}]: {}", level, self.rule_id, self.message),
        }
    }
}

pub trait ValidationRule {
    fn id(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn validate(&self, program: &Program) -> Vec<ValidationError>;
}

pub struct Validator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Default for Validator {
    fn default() -> Validator {
        Validator::new()
    }
}

impl Validator {
    /// Validator with the standard rule set.
    pub fn new() -> Validator {
        Validator {
            rules: vec![
                Box::new(rules::SuspendPlacementRule),
                Box::new(rules::UnknownFunctionRule),
                Box::new(rules::DuplicateFunctionRule),
            ],
        }
    }

    pub fn validate_program(&self, program: &Program) -> Vec<ValidationError> {
        self.rules
            .iter()
            .flat_map(|rule| rule.validate(program))
            .collect()
    }
}

pub fn has_errors(diagnostics: &[ValidationError]) -> bool {
    diagnostics.iter().any(|d| d.severity == Severity::Error)
}
