//! Declaración de historias.
//!
//! - `MethodTable`: un proveedor de métodos candidatos (el objeto declarante
//!   o un mixin) sobre el host `T`.
//! - `StoryDefinition`: builder fluido de una historia (referencias a steps,
//!   contrato y protocolo de fallos opcionales).
//! - `StoryBook`: el objeto declarante; agrupa métodos propios, mixins en
//!   orden y las historias declaradas. Compila y cachea.
//! - `CompiledStory`: la secuencia aplanada e inmutable.

pub mod book;
pub mod compiled;
pub mod definition;
pub mod provider;

pub use book::{StoryBook, StoryBookBuilder};
pub use compiled::CompiledStory;
pub use definition::StoryDefinition;
pub use provider::MethodTable;
