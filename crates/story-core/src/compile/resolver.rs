use std::collections::HashMap;

use crate::errors::StoryError;
use crate::story::{MethodTable, StoryBook};
use crate::step::StepFn;

/// Resultado de resolver una referencia.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Historia declarada en el mismo libro; se expande en su lugar.
    Story(String),
    /// Método hoja aportado por `provider`.
    Method { provider: String },
}

#[derive(Clone, Copy)]
enum Slot {
    Story,
    Method(usize), // 0 = métodos propios, i = mixins[i - 1]
}

/// Tabla de búsqueda first-match: métodos e historias propios, luego cada
/// mixin en orden de declaración.
pub struct LookupTable<'a, T> {
    book: &'a StoryBook<T>,
    slots: HashMap<&'a str, Slot>,
}

impl<'a, T> LookupTable<'a, T> {
    pub fn build(book: &'a StoryBook<T>) -> Result<Self, StoryError> {
        let mut slots: HashMap<&'a str, Slot> = HashMap::new();
        for m in book.own_methods().methods() {
            slots.insert(m, Slot::Method(0));
        }
        for story in book.story_names() {
            if slots.contains_key(story) {
                return Err(StoryError::Composition { story: story.to_string(),
                                                     reason: format!("'{story}' is declared both as a story and as a method of '{}'",
                                                                     book.name()) });
            }
            slots.insert(story, Slot::Story);
        }
        for (i, mixin) in book.mixins().iter().enumerate() {
            for m in mixin.methods() {
                slots.entry(m).or_insert(Slot::Method(i + 1));
            }
        }
        Ok(Self { book, slots })
    }

    pub fn resolve(&self, reference: &str) -> Option<Resolution> {
        self.slots.get(reference).map(|slot| match slot {
                                     Slot::Story => Resolution::Story(reference.to_string()),
                                     Slot::Method(i) => Resolution::Method { provider: self.provider(*i).name().to_string() },
                                 })
    }

    /// Proveedor y función de un método hoja, si `reference` resuelve a uno.
    pub(crate) fn method(&self, reference: &str) -> Option<(&'a MethodTable<T>, &'a StepFn<T>)> {
        match self.slots.get(reference)? {
            Slot::Method(i) => {
                let table = self.provider(*i);
                table.get(reference).map(|f| (table, f))
            }
            Slot::Story => None,
        }
    }

    pub(crate) fn is_story(&self, reference: &str) -> bool {
        matches!(self.slots.get(reference), Some(Slot::Story))
    }

    fn provider(&self, index: usize) -> &'a MethodTable<T> {
        match index {
            0 => self.book.own_methods(),
            i => &self.book.mixins()[i - 1],
        }
    }
}
