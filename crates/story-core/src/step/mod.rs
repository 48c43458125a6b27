//! Steps y protocolo de resultados.
//!
//! Un step es la unidad atómica de una historia: resuelve a exactamente un
//! método de un proveedor (el objeto declarante o un mixin). Este módulo define:
//! - `StepRunResult`: el protocolo cerrado de resultados que devuelve un step.
//! - `Step`: el registro inmutable producido por el compilador.
//! - `RunStatus`: la máquina de estados de una ejecución.

pub mod definition;
mod run_result;
mod status;

pub use definition::{Step, StepFn, StepIdentity, StepReturn};
pub use run_result::StepRunResult;
pub use status::RunStatus;
