use std::borrow::Cow;
use std::fmt;

use indexmap::IndexMap;

use crate::contract::Contract;
use crate::engine::{RunOutcome, StoryEngine};
use crate::errors::StoryError;
use crate::model::Bindings;
use crate::step::{Step, StepIdentity};

/// Historia compilada: secuencia plana de steps, contrato efectivo (propio +
/// el de las historias anidadas) y hash determinista de la definición.
pub struct CompiledStory<T> {
    name: String,
    steps: Vec<Step<T>>,
    contract: Option<Contract>,
    origins: IndexMap<String, Vec<Vec<usize>>>,
    definition_hash: String,
}

impl<T> CompiledStory<T> {
    pub(crate) fn new(name: String,
                      steps: Vec<Step<T>>,
                      contract: Option<Contract>,
                      origins: IndexMap<String, Vec<Vec<usize>>>,
                      definition_hash: String)
                      -> Self {
        Self { name,
               steps,
               contract,
               origins,
               definition_hash }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn steps(&self) -> &[Step<T>] {
        &self.steps
    }

    pub fn contract(&self) -> Option<&Contract> {
        self.contract.as_ref()
    }

    /// Contrato a validar tras una ejecución que saltó las inserciones
    /// `skipped`. Un requisito se descarta sólo si todas las inserciones que
    /// lo declaran quedaron dentro de una saltada.
    pub(crate) fn contract_after_skips(&self, skipped: &[&[usize]]) -> Option<Cow<'_, Contract>> {
        let contract = self.contract.as_ref()?;
        if skipped.is_empty() {
            return Some(Cow::Borrowed(contract));
        }
        let was_skipped = |scope: &Vec<usize>| skipped.iter().any(|k| scope.starts_with(k));
        Some(Cow::Owned(contract.subset(|name| {
                                    self.origins
                                        .get(name)
                                        .map_or(true, |scopes| !scopes.iter().all(|s| was_skipped(s)))
                                })))
    }

    pub fn definition_hash(&self) -> &str {
        &self.definition_hash
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn identities(&self) -> Vec<StepIdentity> {
        self.steps.iter().map(|s| s.identity().clone()).collect()
    }

    /// Ejecuta con un engine por defecto.
    pub fn run(&self, host: &T) -> Result<RunOutcome, StoryError> {
        StoryEngine::new().run(self, host)
    }

    /// Ejecuta con un engine por defecto y ligaduras iniciales.
    pub fn run_with(&self, host: &T, initial: Bindings) -> Result<RunOutcome, StoryError> {
        StoryEngine::new().run_with(self, host, initial)
    }
}

impl<T> fmt::Debug for CompiledStory<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledStory")
         .field("name", &self.name)
         .field("steps", &self.steps)
         .field("contract", &self.contract)
         .field("definition_hash", &self.definition_hash)
         .finish()
    }
}
