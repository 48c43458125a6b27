//! `StoryBook`: el objeto declarante.
//!
//! Agrupa la tabla de métodos propia, los mixins en orden de declaración y las
//! historias declaradas. Cada historia se compila una sola vez (cache por
//! definición); compilaciones posteriores devuelven la misma secuencia.
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use once_cell::sync::OnceCell;

use super::{CompiledStory, MethodTable, StoryDefinition};
use crate::compile::{self, LookupTable, Resolution};
use crate::errors::StoryError;

struct StoryEntry<T> {
    definition: StoryDefinition,
    compiled: OnceCell<Arc<CompiledStory<T>>>,
}

pub struct StoryBook<T> {
    own: MethodTable<T>,
    mixins: Vec<MethodTable<T>>,
    stories: IndexMap<String, StoryEntry<T>>,
}

impl<T> StoryBook<T> {
    /// Inicia la declaración. El nombre de `own` identifica al objeto
    /// declarante en el historial.
    pub fn builder(own: MethodTable<T>) -> StoryBookBuilder<T> {
        StoryBookBuilder { own,
                           mixins: Vec::new(),
                           stories: Vec::new() }
    }

    pub fn name(&self) -> &str {
        self.own.name()
    }

    pub fn own_methods(&self) -> &MethodTable<T> {
        &self.own
    }

    pub fn mixins(&self) -> &[MethodTable<T>] {
        &self.mixins
    }

    pub fn definition(&self, story: &str) -> Option<&StoryDefinition> {
        self.stories.get(story).map(|e| &e.definition)
    }

    pub fn story_names(&self) -> impl Iterator<Item = &str> {
        self.stories.keys().map(String::as_str)
    }

    pub fn has_story(&self, story: &str) -> bool {
        self.stories.contains_key(story)
    }

    /// Cómo resolvería el compilador `reference` en este libro.
    pub fn resolve(&self, reference: &str) -> Result<Option<Resolution>, StoryError> {
        Ok(LookupTable::build(self)?.resolve(reference))
    }

    /// Compila (o devuelve de la cache) la historia `story`.
    pub fn compile(&self, story: &str) -> Result<Arc<CompiledStory<T>>, StoryError> {
        let entry = self.stories
                        .get(story)
                        .ok_or_else(|| StoryError::UnknownStory(story.to_string()))?;
        entry.compiled
             .get_or_try_init(|| compile::compile(self, story).map(Arc::new))
             .map(Arc::clone)
    }
}

impl<T> fmt::Debug for StoryBook<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoryBook")
         .field("own", &self.own)
         .field("mixins", &self.mixins)
         .field("stories", &self.stories.keys().collect::<Vec<_>>())
         .finish()
    }
}

/// Builder de `StoryBook`.
pub struct StoryBookBuilder<T> {
    own: MethodTable<T>,
    mixins: Vec<MethodTable<T>>,
    stories: Vec<StoryDefinition>,
}

impl<T> StoryBookBuilder<T> {
    /// Agrega un mixin. Los mixins se consultan en el orden en que se agregan,
    /// siempre después de los métodos propios.
    pub fn mixin(mut self, table: MethodTable<T>) -> Self {
        self.mixins.push(table);
        self
    }

    /// Declara una historia. Re-declarar un nombre reemplaza la anterior.
    pub fn story(mut self, definition: StoryDefinition) -> Self {
        self.stories.retain(|s| s.name() != definition.name());
        self.stories.push(definition);
        self
    }

    pub fn build(self) -> StoryBook<T> {
        let stories = self.stories
                          .into_iter()
                          .map(|d| (d.name().to_string(),
                                    StoryEntry { definition: d,
                                                 compiled: OnceCell::new() }))
                          .collect();
        StoryBook { own: self.own,
                    mixins: self.mixins,
                    stories }
    }
}
