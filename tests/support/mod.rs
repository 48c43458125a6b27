//! Utilidades compartidas por los tests de integración.

use storyflow::{RecordingContextFactory, StoryEngine};
use uuid::Uuid;

/// Registra cada `Context` creado por un engine y verifica que una
/// invocación construya exactamente uno.
#[derive(Debug, Default)]
pub struct Collector {
    factory: RecordingContextFactory,
}

pub fn make_collector() -> Collector {
    Collector::default()
}

impl Collector {
    /// Engine cuyo único punto de creación de contextos es este collector.
    pub fn engine(&self) -> StoryEngine<&RecordingContextFactory> {
        StoryEngine::builder().context_factory(&self.factory).build()
    }

    /// Run id del único contexto creado. Falla si se creó más de uno o ninguno.
    pub fn single(&self) -> Uuid {
        let ids = self.factory.run_ids();
        assert_eq!(ids.len(), 1, "Context was created {} times", ids.len());
        ids[0]
    }
}
