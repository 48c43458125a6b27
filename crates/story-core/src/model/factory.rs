//! Punto único de construcción de contextos.
//!
//! El engine llama a `ContextFactory::create` exactamente una vez por
//! invocación de nivel superior. Inyectar una factory propia permite observar
//! esa construcción (p.ej. contarla en tests) sin estado global.

use std::cell::RefCell;

use uuid::Uuid;

use super::Context;

pub trait ContextFactory {
    fn create(&self) -> Context;
}

/// Factory por defecto: `Context::new()`.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultContextFactory;

impl ContextFactory for DefaultContextFactory {
    fn create(&self) -> Context {
        Context::new()
    }
}

impl<F: ContextFactory + ?Sized> ContextFactory for &F {
    fn create(&self) -> Context {
        (**self).create()
    }
}

/// Factory que registra el `run_id` de cada contexto creado.
///
/// Pensada para verificar que cada invocación crea un único contexto,
/// independientemente de cuántas historias anidadas se expandan.
#[derive(Debug, Default)]
pub struct RecordingContextFactory {
    created: RefCell<Vec<Uuid>>,
}

impl RecordingContextFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cantidad de contextos creados hasta ahora.
    pub fn created(&self) -> usize {
        self.created.borrow().len()
    }

    pub fn run_ids(&self) -> Vec<Uuid> {
        self.created.borrow().clone()
    }
}

impl ContextFactory for RecordingContextFactory {
    fn create(&self) -> Context {
        let ctx = Context::new();
        self.created.borrow_mut().push(ctx.run_id());
        ctx
    }
}
