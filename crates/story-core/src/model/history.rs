//! Historial append-only de una ejecución.
//!
//! Cada step ejecutado deja exactamente una entrada. El historial sirve para
//! diagnóstico (qué step falló, qué nombres ligó cada uno); el engine nunca lo
//! consulta para decidir el flujo.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::step::StepIdentity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HistoryOutcome {
    /// El step terminó bien y ligó estos nombres (en orden).
    Success { bound: Vec<String> },
    /// El step devolvió `Failure`.
    Failure { reason: Option<Value> },
    /// El step intentó re-ligar un nombre existente.
    Collision { name: String },
    /// El step terminó la ejecución con un valor.
    Result { value: Value },
    /// El step saltó el resto de su historia.
    Skip,
}

impl HistoryOutcome {
    /// Código compacto de la variante.
    pub fn code(&self) -> &'static str {
        match self {
            HistoryOutcome::Success { .. } => "S",
            HistoryOutcome::Failure { .. } => "F",
            HistoryOutcome::Collision { .. } => "X",
            HistoryOutcome::Result { .. } => "R",
            HistoryOutcome::Skip => "K",
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, HistoryOutcome::Failure { .. } | HistoryOutcome::Collision { .. })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub seq: u64, // orden de append dentro del contexto
    pub step: StepIdentity,
    pub outcome: HistoryOutcome,
    pub ts: DateTime<Utc>, // metadato, no entra en ningún hash
}
