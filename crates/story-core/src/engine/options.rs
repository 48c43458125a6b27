use crate::contract::ValidationPolicy;

/// Opciones del engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    /// Valida el contrato de la historia al completar la ejecución.
    pub enforce_contract: bool,
    /// Política usada para esa validación.
    pub contract_policy: ValidationPolicy,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self { enforce_contract: true,
               contract_policy: ValidationPolicy::FailFast }
    }
}
