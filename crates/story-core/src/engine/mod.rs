//! Motor de ejecución de historias.
//!
//! Provee el engine, su builder, las opciones y el resultado de una ejecución.

pub mod builder;
pub mod core;
pub mod options;
pub mod outcome;

pub use builder::EngineBuilder;
pub use self::core::StoryEngine;
pub use options::EngineOptions;
pub use outcome::{FailureCause, RunOutcome};
