//! Builder para `StoryEngine`.
//!
//! ```ignore
//! let engine = StoryEngine::builder()
//!     .contract_policy(ValidationPolicy::CollectAll)
//!     .context_factory(&collector)
//!     .build();
//! ```

use super::{EngineOptions, StoryEngine};
use crate::contract::ValidationPolicy;
use crate::model::{ContextFactory, DefaultContextFactory};

#[derive(Debug, Clone)]
pub struct EngineBuilder<F: ContextFactory = DefaultContextFactory> {
    factory: F,
    options: EngineOptions,
}

impl EngineBuilder<DefaultContextFactory> {
    pub fn new() -> Self {
        Self { factory: DefaultContextFactory,
               options: EngineOptions::default() }
    }
}

impl Default for EngineBuilder<DefaultContextFactory> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: ContextFactory> EngineBuilder<F> {
    /// Reemplaza la factory de contextos (el único punto de creación).
    pub fn context_factory<G: ContextFactory>(self, factory: G) -> EngineBuilder<G> {
        EngineBuilder { factory,
                        options: self.options }
    }

    pub fn options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn enforce_contract(mut self, enforce: bool) -> Self {
        self.options.enforce_contract = enforce;
        self
    }

    pub fn contract_policy(mut self, policy: ValidationPolicy) -> Self {
        self.options.contract_policy = policy;
        self
    }

    pub fn build(self) -> StoryEngine<F> {
        StoryEngine::with_factory(self.factory, self.options)
    }
}
