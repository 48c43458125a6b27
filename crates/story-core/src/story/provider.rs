use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::model::Context;
use crate::step::{StepFn, StepReturn};

/// Tabla nombrada de métodos ejecutables sobre el host `T`.
///
/// Representa un proveedor de capacidades: el objeto que declara las
/// historias o uno de sus mixins. El orden de registro se conserva.
pub struct MethodTable<T> {
    name: String,
    methods: IndexMap<String, StepFn<T>>,
}

impl<T> MethodTable<T> {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(),
               methods: IndexMap::new() }
    }

    /// Registra un método. Registrar dos veces el mismo nombre reemplaza la
    /// implementación anterior.
    pub fn method<F>(mut self, name: impl Into<String>, f: F) -> Self
        where F: Fn(&T, &Context) -> StepReturn + Send + Sync + 'static
    {
        self.methods.insert(name.into(), Arc::new(f));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, method: &str) -> Option<&StepFn<T>> {
        self.methods.get(method)
    }

    pub fn contains(&self, method: &str) -> bool {
        self.methods.contains_key(method)
    }

    pub fn methods(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

impl<T> Clone for MethodTable<T> {
    fn clone(&self) -> Self {
        Self { name: self.name.clone(),
               methods: self.methods.clone() }
    }
}

impl<T> fmt::Debug for MethodTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodTable")
         .field("name", &self.name)
         .field("methods", &self.methods.keys().collect::<Vec<_>>())
         .finish()
    }
}
