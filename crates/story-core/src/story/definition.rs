use serde_json::Value;

use crate::contract::Contract;

/// Declaración de una historia: referencias ordenadas a steps (métodos u
/// otras historias del mismo `StoryBook`), contrato y protocolo de fallos.
///
/// ```ignore
/// let x = StoryDefinition::new("x")
///     .step("one")
///     .contract(Contract::new().require("foo", "is_integer", predicates::is_integer));
/// ```
#[derive(Debug, Clone)]
pub struct StoryDefinition {
    name: String,
    steps: Vec<String>,
    contract: Option<Contract>,
    failures: Option<Vec<Value>>,
}

impl StoryDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(),
               steps: Vec::new(),
               contract: None,
               failures: None }
    }

    pub fn step(mut self, reference: impl Into<String>) -> Self {
        self.steps.push(reference.into());
        self
    }

    pub fn steps<I, S>(mut self, references: I) -> Self
        where I: IntoIterator<Item = S>,
              S: Into<String>
    {
        self.steps.extend(references.into_iter().map(Into::into));
        self
    }

    pub fn contract(mut self, contract: Contract) -> Self {
        self.contract = Some(contract);
        self
    }

    /// Restringe las razones con que pueden fallar los steps de esta historia.
    pub fn failures<I, V>(mut self, reasons: I) -> Self
        where I: IntoIterator<Item = V>,
              V: Into<Value>
    {
        self.failures = Some(reasons.into_iter().map(Into::into).collect());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn references(&self) -> &[String] {
        &self.steps
    }

    pub fn declared_contract(&self) -> Option<&Contract> {
        self.contract.as_ref()
    }

    pub fn failure_protocol(&self) -> Option<&[Value]> {
        self.failures.as_deref()
    }
}
