use serde_json::Value;

use crate::model::Bindings;

/// Resultado de invocar un step.
///
/// El engine hace `match` exhaustivo sobre las variantes; no existe ningún
/// otro valor de retorno aceptable.
#[derive(Debug, Clone, PartialEq)]
pub enum StepRunResult {
    /// Outputs nombrados que se fusionan en el contexto. Ningún nombre puede
    /// estar ya ligado.
    Success { outputs: Bindings },
    /// Aborta la ejecución. `reason` debe pertenecer al protocolo de fallos de
    /// la historia declarante cuando ésta declara uno.
    Failure { reason: Option<Value> },
    /// Termina la ejecución completa con éxito devolviendo `value`.
    Result { value: Value },
    /// Salta el resto de la historia anidada actual (o termina la raíz).
    Skip,
}

impl StepRunResult {
    pub fn success() -> Self {
        StepRunResult::Success { outputs: Bindings::new() }
    }

    pub fn success_with<I, K, V>(outputs: I) -> Self
        where I: IntoIterator<Item = (K, V)>,
              K: Into<String>,
              V: Into<Value>
    {
        StepRunResult::Success { outputs: outputs.into_iter().map(|(k, v)| (k.into(), v.into())).collect() }
    }

    pub fn failure() -> Self {
        StepRunResult::Failure { reason: None }
    }

    pub fn failure_because(reason: impl Into<Value>) -> Self {
        StepRunResult::Failure { reason: Some(reason.into()) }
    }

    pub fn result(value: impl Into<Value>) -> Self {
        StepRunResult::Result { value: value.into() }
    }

    pub fn skip() -> Self {
        StepRunResult::Skip
    }

    /// Etiqueta corta de la variante (para logs e historial).
    pub fn variant(&self) -> &'static str {
        match self {
            StepRunResult::Success { .. } => "success",
            StepRunResult::Failure { .. } => "failure",
            StepRunResult::Result { .. } => "result",
            StepRunResult::Skip => "skip",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_with_keeps_declaration_order() {
        let r = StepRunResult::success_with([("b", json!(1)), ("a", json!(2))]);
        match r {
            StepRunResult::Success { outputs } => {
                let names: Vec<&str> = outputs.keys().map(|k| k.as_str()).collect();
                assert_eq!(names, vec!["b", "a"]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn constructors_tag_variants() {
        assert_eq!(StepRunResult::success().variant(), "success");
        assert_eq!(StepRunResult::failure_because("x").variant(), "failure");
        assert_eq!(StepRunResult::result(1).variant(), "result");
        assert_eq!(StepRunResult::skip().variant(), "skip");
    }
}
