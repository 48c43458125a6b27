//! Errores del core.
//!
//! Se distinguen tres familias:
//! - Errores de compilación (`UnknownMethod`, `UnknownStory`, `Composition`):
//!   abortan la compilación completa, nunca se produce una historia parcial.
//! - Errores de ejecución esperables (`NameCollision`): el engine los convierte
//!   en un `RunOutcome::Failed`.
//! - Defectos (`InvalidResult`, `MissingBinding` durante un step, `Step`): se
//!   propagan tal cual al invocador.

use serde_json::Value;
use thiserror::Error;

use crate::contract::Violation;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum StoryError {
    #[error("unknown method '{method}' referenced by story '{story}'")]
    UnknownMethod { story: String, method: String },
    #[error("unknown story '{0}'")]
    UnknownStory(String),
    #[error("invalid composition of story '{story}': {reason}")]
    Composition { story: String, reason: String },
    #[error("name collision: '{name}' is already bound in the context")]
    NameCollision { name: String },
    #[error("invalid result returned by '{step}': {reason}")]
    InvalidResult { step: String, reason: String },
    #[error("missing binding '{name}'")]
    MissingBinding { name: String },
    #[error("contract violation: '{name}' = {value} is not {expected}")]
    ContractViolation { name: String, value: Value, expected: String },
    #[error("contract violations: {}", format_violations(.0))]
    ContractViolations(Vec<Violation>),
    #[error("cannot decode binding '{name}': {reason}")]
    Decode { name: String, reason: String },
    #[error("story failed at '{step}'{}", format_reason(.reason))]
    Failure { step: String, reason: Option<Value> },
    #[error("step error: {0}")]
    Step(String),
}

fn format_reason(reason: &Option<Value>) -> String {
    reason.as_ref().map(|r| format!(" because {r}")).unwrap_or_default()
}

fn format_violations(violations: &[Violation]) -> String {
    violations.iter().map(|v| v.to_string()).collect::<Vec<_>>().join("; ")
}

impl StoryError {
    /// Errores que sólo pueden surgir al compilar una historia.
    pub fn is_compile_error(&self) -> bool {
        matches!(self,
                 StoryError::UnknownMethod { .. } | StoryError::UnknownStory(_) | StoryError::Composition { .. })
    }
}
