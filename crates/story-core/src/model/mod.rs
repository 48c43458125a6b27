//! Modelos neutrales de una ejecución (Context, historial, factory).

pub mod context;
pub mod factory;
pub mod history;

pub use context::{Bindings, Context};
pub use factory::{ContextFactory, DefaultContextFactory, RecordingContextFactory};
pub use history::{HistoryEntry, HistoryOutcome};
