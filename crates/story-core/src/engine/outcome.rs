//! Resultado terminal de una ejecución.
use serde_json::Value;

use crate::errors::StoryError;
use crate::model::Context;
use crate::step::{RunStatus, StepIdentity};

/// Por qué terminó en `Failed` una ejecución.
#[derive(Debug, Clone, PartialEq)]
pub enum FailureCause {
    /// El step devolvió `Failure` con esta razón.
    Reason(Option<Value>),
    /// El step intentó re-ligar un nombre existente.
    NameCollision { name: String },
}

impl FailureCause {
    pub fn reason(&self) -> Option<&Value> {
        match self {
            FailureCause::Reason(reason) => reason.as_ref(),
            FailureCause::NameCollision { .. } => None,
        }
    }
}

#[derive(Debug)]
pub enum RunOutcome {
    /// Todos los steps terminaron bien, o uno pidió terminar (`Result`/`Skip`
    /// en la raíz). `value` sólo existe cuando un step devolvió `Result`.
    Completed { context: Context, value: Option<Value> },
    /// Un step falló. `step` identifica dónde.
    Failed { context: Context, step: StepIdentity, cause: FailureCause },
}

impl RunOutcome {
    pub fn status(&self) -> RunStatus {
        match self {
            RunOutcome::Completed { .. } => RunStatus::Completed,
            RunOutcome::Failed { .. } => RunStatus::Failed,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Completed { .. })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, RunOutcome::Failed { .. })
    }

    pub fn context(&self) -> &Context {
        match self {
            RunOutcome::Completed { context, .. } | RunOutcome::Failed { context, .. } => context,
        }
    }

    pub fn into_context(self) -> Context {
        match self {
            RunOutcome::Completed { context, .. } | RunOutcome::Failed { context, .. } => context,
        }
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            RunOutcome::Completed { value, .. } => value.as_ref(),
            RunOutcome::Failed { .. } => None,
        }
    }

    pub fn failed_step(&self) -> Option<&StepIdentity> {
        match self {
            RunOutcome::Failed { step, .. } => Some(step),
            RunOutcome::Completed { .. } => None,
        }
    }

    pub fn cause(&self) -> Option<&FailureCause> {
        match self {
            RunOutcome::Failed { cause, .. } => Some(cause),
            RunOutcome::Completed { .. } => None,
        }
    }

    /// `true` si la ejecución falló en el método `method`.
    pub fn failed_on(&self, method: &str) -> bool {
        self.failed_step().is_some_and(|s| s.method == method)
    }

    /// `true` si la ejecución falló con exactamente esta razón.
    pub fn failed_because(&self, reason: impl Into<Value>) -> bool {
        let reason = reason.into();
        self.cause().and_then(FailureCause::reason) == Some(&reason)
    }

    /// Convierte un `Failed` en error, conservando el contexto final en el
    /// caso exitoso.
    pub fn into_result(self) -> Result<Context, StoryError> {
        match self {
            RunOutcome::Completed { context, .. } => Ok(context),
            RunOutcome::Failed { cause: FailureCause::NameCollision { name }, .. } => {
                Err(StoryError::NameCollision { name })
            }
            RunOutcome::Failed { step,
                                 cause: FailureCause::Reason(reason),
                                 .. } => Err(StoryError::Failure { step: step.to_string(),
                                                                   reason }),
        }
    }
}
