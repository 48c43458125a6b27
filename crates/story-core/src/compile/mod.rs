//! Resolución y aplanado de historias.
//!
//! `LookupTable` fija, una vez por compilación, a qué proveedor pertenece cada
//! nombre; `compile` recorre la historia raíz expandiendo las anidadas en su
//! lugar y detectando ciclos.

mod compiler;
mod resolver;

pub use compiler::compile;
pub use resolver::{LookupTable, Resolution};
