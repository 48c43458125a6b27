//! Contratos: validación posterior a la ejecución de las ligaduras finales.
//!
//! Un `Contract` asocia a cada nombre requerido un predicado sobre su valor.
//! Se valida contra un `Context` completado, con una de dos políticas:
//! - `FailFast`: devuelve el primer problema encontrado, en orden de
//!   declaración. Un nombre ausente es `StoryError::MissingBinding`; un
//!   predicado falso es `StoryError::ContractViolation`.
//! - `CollectAll`: recorre todos los requisitos y devuelve
//!   `StoryError::ContractViolations` con cada ausencia o valor inválido.

pub mod predicates;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::StoryError;
use crate::model::Context;

/// Predicado sobre el valor final de una ligadura.
pub type Predicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Requisito de un nombre: descripción legible + predicado.
#[derive(Clone)]
pub struct Requirement {
    expected: String,
    predicate: Predicate,
}

impl Requirement {
    pub fn new<F>(expected: impl Into<String>, predicate: F) -> Self
        where F: Fn(&Value) -> bool + Send + Sync + 'static
    {
        Self { expected: expected.into(),
               predicate: Arc::new(predicate) }
    }

    pub fn expected(&self) -> &str {
        &self.expected
    }

    pub fn check(&self, value: &Value) -> bool {
        (self.predicate)(value)
    }
}

impl fmt::Debug for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Requirement").field("expected", &self.expected).finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationPolicy {
    #[default]
    FailFast,
    CollectAll,
}

impl FromStr for ValidationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail_fast" | "fail-fast" => Ok(ValidationPolicy::FailFast),
            "collect_all" | "collect-all" => Ok(ValidationPolicy::CollectAll),
            other => Err(format!("unknown contract policy '{other}'")),
        }
    }
}

/// Un problema encontrado al validar un contrato.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    Missing { name: String },
    Invalid { name: String, value: Value, expected: String },
}

impl Violation {
    pub fn name(&self) -> &str {
        match self {
            Violation::Missing { name } | Violation::Invalid { name, .. } => name,
        }
    }

    fn into_error(self) -> StoryError {
        match self {
            Violation::Missing { name } => StoryError::MissingBinding { name },
            Violation::Invalid { name, value, expected } => StoryError::ContractViolation { name, value, expected },
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::Missing { name } => write!(f, "'{name}' is missing"),
            Violation::Invalid { name, value, expected } => write!(f, "'{name}' = {value} is not {expected}"),
        }
    }
}

/// Conjunto ordenado de requisitos sobre el contexto final.
#[derive(Debug, Clone, Default)]
pub struct Contract {
    requirements: IndexMap<String, Requirement>,
}

impl Contract {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declara que `name` debe existir y cumplir `predicate`. Re-declarar un
    /// nombre reemplaza el requisito anterior.
    pub fn require<F>(mut self, name: impl Into<String>, expected: impl Into<String>, predicate: F) -> Self
        where F: Fn(&Value) -> bool + Send + Sync + 'static
    {
        self.requirements.insert(name.into(), Requirement::new(expected, predicate));
        self
    }

    pub fn require_with(mut self, name: impl Into<String>, requirement: Requirement) -> Self {
        self.requirements.insert(name.into(), requirement);
        self
    }

    pub fn requirement(&self, name: &str) -> Option<&Requirement> {
        self.requirements.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.requirements.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.requirements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }

    /// Agrega los requisitos de `other` que no estén ya declarados aquí.
    pub fn merge(&mut self, other: &Contract) {
        for (name, req) in &other.requirements {
            if !self.requirements.contains_key(name) {
                self.requirements.insert(name.clone(), req.clone());
            }
        }
    }

    /// Copia con los requisitos cuyo nombre cumple `keep`, en el mismo orden.
    pub fn subset<F>(&self, keep: F) -> Contract
        where F: Fn(&str) -> bool
    {
        Contract { requirements: self.requirements
                                     .iter()
                                     .filter(|(name, _)| keep(name))
                                     .map(|(name, req)| (name.clone(), req.clone()))
                                     .collect() }
    }

    /// Validación fail-fast.
    pub fn validate(&self, ctx: &Context) -> Result<(), StoryError> {
        self.validate_with(ctx, ValidationPolicy::FailFast)
    }

    pub fn validate_with(&self, ctx: &Context, policy: ValidationPolicy) -> Result<(), StoryError> {
        match policy {
            ValidationPolicy::FailFast => match self.check(ctx).next() {
                Some(v) => Err(v.into_error()),
                None => Ok(()),
            },
            ValidationPolicy::CollectAll => {
                let all = self.violations(ctx);
                if all.is_empty() {
                    Ok(())
                } else {
                    Err(StoryError::ContractViolations(all))
                }
            }
        }
    }

    /// Todas las violaciones, en orden de declaración.
    pub fn violations(&self, ctx: &Context) -> Vec<Violation> {
        self.check(ctx).collect()
    }

    fn check<'a>(&'a self, ctx: &'a Context) -> impl Iterator<Item = Violation> + 'a {
        self.requirements.iter().filter_map(move |(name, req)| match ctx.get(name) {
                                    Err(_) => Some(Violation::Missing { name: name.clone() }),
                                    Ok(value) if req.check(value) => None,
                                    Ok(value) => Some(Violation::Invalid { name: name.clone(),
                                                                           value: value.clone(),
                                                                           expected: req.expected().to_string() }),
                                })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn contract() -> Contract {
        Contract::new().require("foo", "is_integer", predicates::is_integer)
                       .require("bar", "is_string", predicates::is_string)
    }

    #[test]
    fn passes_when_every_requirement_holds() {
        let mut ctx = Context::new();
        ctx.bind("foo", 1).unwrap();
        ctx.bind("bar", "x").unwrap();
        assert!(contract().validate(&ctx).is_ok());
        assert!(contract().validate_with(&ctx, ValidationPolicy::CollectAll).is_ok());
    }

    #[test]
    fn fail_fast_reports_first_problem_only() {
        let mut ctx = Context::new();
        ctx.bind("foo", "<boom>").unwrap();
        let err = contract().validate(&ctx).unwrap_err();
        assert_eq!(err,
                   StoryError::ContractViolation { name: "foo".into(),
                                                   value: json!("<boom>"),
                                                   expected: "is_integer".into() });
    }

    #[test]
    fn fail_fast_reports_missing_as_missing_binding() {
        let mut ctx = Context::new();
        ctx.bind("foo", 7).unwrap();
        let err = contract().validate(&ctx).unwrap_err();
        assert_eq!(err, StoryError::MissingBinding { name: "bar".into() });
    }

    #[test]
    fn collect_all_reports_every_problem() {
        let mut ctx = Context::new();
        ctx.bind("foo", "<boom>").unwrap();
        match contract().validate_with(&ctx, ValidationPolicy::CollectAll) {
            Err(StoryError::ContractViolations(all)) => {
                assert_eq!(all.len(), 2);
                assert_eq!(all[0].name(), "foo");
                assert_eq!(all[1], Violation::Missing { name: "bar".into() });
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn merge_keeps_own_requirements() {
        let mut own = Contract::new().require("foo", "is_string", predicates::is_string);
        let other = Contract::new().require("foo", "is_integer", predicates::is_integer)
                                   .require("baz", "not_null", predicates::not_null);
        own.merge(&other);
        assert_eq!(own.names().collect::<Vec<_>>(), vec!["foo", "baz"]);
        assert_eq!(own.requirement("foo").unwrap().expected(), "is_string");
    }

    #[test]
    fn prebuilt_requirements_and_subsets() {
        let positive = Requirement::new("a positive integer", |v| v.as_i64().is_some_and(|n| n > 0));
        let c = contract().require_with("count", positive);
        assert_eq!(c.names().collect::<Vec<_>>(), vec!["foo", "bar", "count"]);

        let only_count = c.subset(|name| name == "count");
        assert_eq!(only_count.len(), 1);
        let mut ctx = Context::new();
        ctx.bind("count", 0).unwrap();
        assert_eq!(only_count.validate(&ctx).unwrap_err(),
                   StoryError::ContractViolation { name: "count".into(),
                                                   value: json!(0),
                                                   expected: "a positive integer".into() });
        assert!(c.subset(|_| false).is_empty());
    }

    #[test]
    fn policy_parses_from_text() {
        assert_eq!("collect_all".parse::<ValidationPolicy>(), Ok(ValidationPolicy::CollectAll));
        assert_eq!(" Fail-Fast ".parse::<ValidationPolicy>(), Ok(ValidationPolicy::FailFast));
        assert!("sometimes".parse::<ValidationPolicy>().is_err());
    }
}
