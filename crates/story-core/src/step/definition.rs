use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::StepRunResult;
use crate::constants::PATH_SEPARATOR;
use crate::errors::StoryError;
use crate::model::Context;

/// Lo que devuelve la implementación de un step. `Err` es un defecto del
/// colaborador y el engine lo propaga sin recuperarse.
pub type StepReturn = Result<StepRunResult, StoryError>;

/// Método ejecutable sobre el host `T`.
pub type StepFn<T> = Arc<dyn Fn(&T, &Context) -> StepReturn + Send + Sync>;

/// Identidad serializable de un step dentro de la secuencia aplanada.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StepIdentity {
    /// Posición en la secuencia aplanada (desde 0).
    pub index: usize,
    /// Historia que declaró el step.
    pub story: String,
    /// Nombre del método invocado.
    pub method: String,
    /// Proveedor que aportó el método (objeto declarante o mixin).
    pub provider: String,
    /// Ruta de historias desde la raíz hasta la declarante (incluidas).
    pub path: Vec<String>,
}

impl StepIdentity {
    /// `true` si el step proviene de una historia anidada.
    pub fn is_inlined(&self) -> bool {
        self.path.len() > 1
    }
}

impl fmt::Display for StepIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.path.join(PATH_SEPARATOR), PATH_SEPARATOR, self.method)
    }
}

/// Registro inmutable de un step compilado.
pub struct Step<T> {
    identity: StepIdentity,
    scope: Vec<usize>,
    failures: Option<Arc<[Value]>>,
    func: StepFn<T>,
}

impl<T> Step<T> {
    pub(crate) fn new(identity: StepIdentity,
                      scope: Vec<usize>,
                      failures: Option<Arc<[Value]>>,
                      func: StepFn<T>)
                      -> Self {
        Self { identity,
               scope,
               failures,
               func }
    }

    pub fn identity(&self) -> &StepIdentity {
        &self.identity
    }

    pub fn index(&self) -> usize {
        self.identity.index
    }

    pub fn method(&self) -> &str {
        &self.identity.method
    }

    pub fn provider(&self) -> &str {
        &self.identity.provider
    }

    pub fn story(&self) -> &str {
        &self.identity.story
    }

    pub fn is_inlined(&self) -> bool {
        self.identity.is_inlined()
    }

    /// Ids de las inserciones anidadas que contienen a este step. Dos
    /// inserciones de la misma historia reciben ids distintos.
    pub(crate) fn scope(&self) -> &[usize] {
        &self.scope
    }

    /// Razones de fallo admitidas: las de la historia declarante o, si no
    /// declaró ninguna, las del ancestro más cercano que sí lo hizo.
    pub fn failures(&self) -> Option<&[Value]> {
        self.failures.as_deref()
    }

    pub fn invoke(&self, host: &T, ctx: &Context) -> StepReturn {
        (self.func)(host, ctx)
    }

    /// Verifica que el resultado cumple el protocolo de fallos del step.
    pub(crate) fn check_protocol(&self, result: &StepRunResult) -> Result<(), StoryError> {
        let invalid = |reason: String| StoryError::InvalidResult { step: self.identity.to_string(), reason };
        match result {
            StepRunResult::Success { outputs } => {
                if outputs.keys().any(|k| k.is_empty()) {
                    return Err(invalid("empty output name".into()));
                }
                Ok(())
            }
            StepRunResult::Failure { reason } => match (self.failures(), reason) {
                (None, _) => Ok(()),
                (Some(_), None) => Err(invalid("a failure reason is required by the failure protocol".into())),
                (Some(allowed), Some(r)) if allowed.contains(r) => Ok(()),
                (Some(_), Some(r)) => Err(invalid(format!("reason {r} is outside the failure protocol"))),
            },
            StepRunResult::Result { .. } | StepRunResult::Skip => Ok(()),
        }
    }
}

impl<T> Clone for Step<T> {
    fn clone(&self) -> Self {
        Self { identity: self.identity.clone(),
               scope: self.scope.clone(),
               failures: self.failures.clone(),
               func: Arc::clone(&self.func) }
    }
}

impl<T> fmt::Debug for Step<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
         .field("identity", &self.identity)
         .field("scope", &self.scope)
         .field("failures", &self.failures)
         .finish_non_exhaustive()
    }
}
