//! Contexto compartido de una ejecución.
//!
//! Un `Context` se crea exactamente una vez por invocación de nivel superior
//! (ver `ContextFactory`) y se descarta al terminar. Los steps lo reciben como
//! `&Context`: sólo el engine liga nombres y agrega historial.
use std::fmt;

use chrono::Utc;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::Value;
use uuid::Uuid;

use super::{HistoryEntry, HistoryOutcome};
use crate::errors::StoryError;
use crate::step::StepIdentity;

/// Ligaduras ordenadas por orden de inserción.
pub type Bindings = IndexMap<String, Value>;

#[derive(Debug, Clone)]
pub struct Context {
    run_id: Uuid,
    bindings: Bindings,
    history: Vec<HistoryEntry>,
}

impl Context {
    /// Contexto vacío con un `run_id` nuevo. Preferir crear contextos a través
    /// de una `ContextFactory`.
    pub fn new() -> Self {
        Self { run_id: Uuid::new_v4(),
               bindings: Bindings::new(),
               history: Vec::new() }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Liga un nombre nuevo. Re-ligar un nombre existente es un error.
    pub fn bind(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Result<(), StoryError> {
        let name = name.into();
        if self.bindings.contains_key(&name) {
            return Err(StoryError::NameCollision { name });
        }
        self.bindings.insert(name, value.into());
        Ok(())
    }

    /// Sobrescritura explícita (p.ej. al reconstruir un contexto). Devuelve el
    /// valor anterior si existía. El engine nunca la usa.
    pub fn overwrite(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.bindings.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Result<&Value, StoryError> {
        self.bindings
            .get(name)
            .ok_or_else(|| StoryError::MissingBinding { name: name.to_string() })
    }

    /// Decodifica una ligadura a un tipo concreto.
    pub fn get_as<D: DeserializeOwned>(&self, name: &str) -> Result<D, StoryError> {
        let value = self.get(name)?;
        D::deserialize(value).map_err(|e| StoryError::Decode { name: name.to_string(),
                                                               reason: e.to_string() })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Agrega una entrada al historial y la devuelve.
    pub fn record(&mut self, step: StepIdentity, outcome: HistoryOutcome) -> &HistoryEntry {
        let seq = self.history.len() as u64;
        self.history.push(HistoryEntry { seq,
                                         step,
                                         outcome,
                                         ts: Utc::now() });
        &self.history[self.history.len() - 1]
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Secuencia compacta de resultados (`"SSF"`), útil en asserts y logs.
    pub fn outcome_codes(&self) -> String {
        self.history.iter().map(|e| e.outcome.code()).collect()
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Context {}:", self.run_id)?;
        for entry in &self.history {
            let detail = match &entry.outcome {
                HistoryOutcome::Success { bound } if bound.is_empty() => String::new(),
                HistoryOutcome::Success { bound } => format!(" -> {}", bound.join(", ")),
                HistoryOutcome::Failure { reason: Some(r) } => format!(" (failed: {r})"),
                HistoryOutcome::Failure { reason: None } => " (failed)".to_string(),
                HistoryOutcome::Collision { name } => format!(" (collision: {name})"),
                HistoryOutcome::Result { value } => format!(" (result: {value})"),
                HistoryOutcome::Skip => " (skipped)".to_string(),
            };
            writeln!(f, "  {}{}", entry.step, detail)?;
        }
        if self.bindings.is_empty() {
            return writeln!(f, "  <no bindings>");
        }
        for (name, value) in &self.bindings {
            writeln!(f, "  {name} = {value}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn identity(method: &str) -> StepIdentity {
        StepIdentity { index: 0,
                       story: "x".into(),
                       method: method.into(),
                       provider: "Child".into(),
                       path: vec!["x".into()] }
    }

    #[test]
    fn bind_rejects_existing_names() {
        let mut ctx = Context::new();
        ctx.bind("foo", 1).expect("first bind");
        let err = ctx.bind("foo", 2).unwrap_err();
        assert_eq!(err, StoryError::NameCollision { name: "foo".into() });
        assert_eq!(ctx.get("foo").unwrap(), &json!(1));
    }

    #[test]
    fn overwrite_is_explicit() {
        let mut ctx = Context::new();
        ctx.bind("foo", 1).unwrap();
        assert_eq!(ctx.overwrite("foo", 2), Some(json!(1)));
        assert_eq!(ctx.get("foo").unwrap(), &json!(2));
    }

    #[test]
    fn get_reports_missing_names() {
        let ctx = Context::new();
        assert_eq!(ctx.get("nope").unwrap_err(), StoryError::MissingBinding { name: "nope".into() });
    }

    #[test]
    fn get_as_decodes_with_serde() {
        let mut ctx = Context::new();
        ctx.bind("ids", json!([1, 2, 3])).unwrap();
        let ids: Vec<u32> = ctx.get_as("ids").unwrap();
        assert_eq!(ids, vec![1, 2, 3]);
        assert!(matches!(ctx.get_as::<String>("ids"), Err(StoryError::Decode { .. })));
    }

    #[test]
    fn bindings_keep_insertion_order() {
        let mut ctx = Context::new();
        ctx.bind("z", 1).unwrap();
        ctx.bind("a", 2).unwrap();
        assert_eq!(ctx.names().collect::<Vec<_>>(), vec!["z", "a"]);
    }

    #[test]
    fn record_appends_in_order() {
        let mut ctx = Context::new();
        ctx.record(identity("one"), HistoryOutcome::Success { bound: vec!["foo".into()] });
        let last = ctx.record(identity("two"), HistoryOutcome::Failure { reason: None });
        assert_eq!(last.seq, 1);
        assert_eq!(ctx.outcome_codes(), "SF");
        assert_eq!(ctx.history()[0].step.method, "one");
    }

    #[test]
    fn display_lists_history_and_bindings() {
        let mut ctx = Context::new();
        ctx.bind("foo", "<boom>").unwrap();
        ctx.record(identity("one"), HistoryOutcome::Success { bound: vec!["foo".into()] });
        let text = ctx.to_string();
        assert!(text.contains("x.one -> foo"), "{text}");
        assert!(text.contains("foo = \"<boom>\""), "{text}");
    }
}
