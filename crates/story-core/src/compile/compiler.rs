use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{json, Value};

use super::LookupTable;
use crate::constants::ENGINE_VERSION;
use crate::contract::Contract;
use crate::errors::StoryError;
use crate::hashing::hash_value;
use crate::step::{Step, StepIdentity};
use crate::story::{CompiledStory, StoryBook};

/// Compila `story` sin pasar por la cache del libro.
///
/// El resultado es determinista: misma declaración, misma secuencia y mismo
/// `definition_hash`. Ante cualquier error no se produce historia parcial.
pub fn compile<T>(book: &StoryBook<T>, story: &str) -> Result<CompiledStory<T>, StoryError> {
    let table = LookupTable::build(book)?;
    let mut state = Flattener { book,
                                table,
                                root: story,
                                stack: Vec::new(),
                                steps: Vec::new(),
                                contract: None,
                                origins: IndexMap::new(),
                                next_scope: 0 };
    state.expand(story, &[], &[], None)?;

    let Flattener { steps, contract, origins, .. } = state;
    let identities: Vec<&StepIdentity> = steps.iter().map(|s| s.identity()).collect();
    let definition_hash = hash_value(&json!({
        "engine_version": ENGINE_VERSION,
        "story": story,
        "steps": identities,
    }));
    log::debug!("compiled story '{story}' of '{}' into {} steps ({definition_hash})",
                book.name(),
                steps.len());
    Ok(CompiledStory::new(story.to_string(), steps, contract, origins, definition_hash))
}

struct Flattener<'a, T> {
    book: &'a StoryBook<T>,
    table: LookupTable<'a, T>,
    root: &'a str,
    stack: Vec<String>,
    steps: Vec<Step<T>>,
    contract: Option<Contract>,
    origins: IndexMap<String, Vec<Vec<usize>>>, // requisito -> inserciones que lo declaran
    next_scope: usize,
}

impl<'a, T> Flattener<'a, T> {
    fn expand(&mut self,
              story: &str,
              scope: &[usize],
              parent_path: &[String],
              inherited: Option<&Arc<[Value]>>)
              -> Result<(), StoryError> {
        if let Some(pos) = self.stack.iter().position(|s| s == story) {
            let mut cycle = self.stack[pos..].to_vec();
            cycle.push(story.to_string());
            return Err(StoryError::Composition { story: self.root.to_string(),
                                                 reason: format!("cycle {}", cycle.join(" -> ")) });
        }
        let definition = self.book
                             .definition(story)
                             .ok_or_else(|| StoryError::UnknownStory(story.to_string()))?;

        // La raíz se procesa primero: sus requisitos prevalecen sobre los de
        // las historias anidadas.
        if let Some(own) = definition.declared_contract() {
            for name in own.names() {
                self.origins.entry(name.to_string()).or_default().push(scope.to_vec());
            }
            match self.contract.as_mut() {
                Some(acc) => acc.merge(own),
                None => self.contract = Some(own.clone()),
            }
        }

        // Sin protocolo propio se hereda el del ancestro más cercano; uno propio
        // debe estar contenido en el heredado.
        let failures: Option<Arc<[Value]>> = match (definition.failure_protocol(), inherited) {
            (None, inherited) => inherited.cloned(),
            (Some(own), Some(outer)) => {
                if let Some(reason) = own.iter().find(|r| !outer.contains(r)) {
                    return Err(StoryError::Composition { story: self.root.to_string(),
                                                         reason: format!("story '{story}' declares failure reason {reason} outside the protocol of its parent") });
                }
                Some(Arc::from(own))
            }
            (Some(own), None) => Some(Arc::from(own)),
        };
        let mut path = parent_path.to_vec();
        path.push(story.to_string());
        self.stack.push(story.to_string());

        for reference in definition.references() {
            if self.table.is_story(reference) {
                self.next_scope += 1;
                let mut inner = scope.to_vec();
                inner.push(self.next_scope);
                self.expand(reference, &inner, &path, failures.as_ref())?;
                continue;
            }
            let (provider, func) =
                self.table
                    .method(reference)
                    .ok_or_else(|| StoryError::UnknownMethod { story: story.to_string(),
                                                               method: reference.clone() })?;
            let identity = StepIdentity { index: self.steps.len(),
                                          story: story.to_string(),
                                          method: reference.clone(),
                                          provider: provider.name().to_string(),
                                          path: path.clone() };
            self.steps
                .push(Step::new(identity, scope.to_vec(), failures.clone(), Arc::clone(func)));
        }

        self.stack.pop();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::Resolution;
    use crate::model::Context;
    use crate::step::StepRunResult;
    use crate::story::{MethodTable, StoryDefinition};

    struct Host;

    fn ok(_: &Host, _: &Context) -> crate::step::StepReturn {
        Ok(StepRunResult::success())
    }

    fn book() -> StoryBook<Host> {
        StoryBook::builder(MethodTable::new("Host").method("one", ok).method("shared", ok))
            .mixin(MethodTable::new("First").method("before", ok).method("shared", ok))
            .mixin(MethodTable::new("Second").method("before", ok).method("after", ok))
            .story(StoryDefinition::new("x").step("one"))
            .story(StoryDefinition::new("a").steps(["before", "x", "after"]))
            .build()
    }

    #[test]
    fn resolution_prefers_own_then_mixins_in_order() {
        let b = book();
        assert_eq!(b.resolve("shared").unwrap(), Some(Resolution::Method { provider: "Host".into() }));
        assert_eq!(b.resolve("before").unwrap(), Some(Resolution::Method { provider: "First".into() }));
        assert_eq!(b.resolve("after").unwrap(), Some(Resolution::Method { provider: "Second".into() }));
        assert_eq!(b.resolve("x").unwrap(), Some(Resolution::Story("x".into())));
        assert_eq!(b.resolve("missing").unwrap(), None);
    }

    #[test]
    fn nested_story_is_spliced_in_place() {
        let compiled = compile(&book(), "a").expect("compiles");
        let rendered: Vec<String> = compiled.steps().iter().map(|s| s.identity().to_string()).collect();
        assert_eq!(rendered, vec!["a.before", "a.x.one", "a.after"]);
        assert!(compiled.steps()[1].is_inlined());
        assert_eq!(compiled.steps()[1].scope(), &[1]);
        assert!(compiled.steps()[2].scope().is_empty());
        assert_eq!(compiled.steps().iter().map(|s| s.index()).collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn repeated_inlining_gets_distinct_scopes() {
        let b = StoryBook::builder(MethodTable::new("Host").method("one", ok))
            .story(StoryDefinition::new("x").step("one"))
            .story(StoryDefinition::new("twice").steps(["x", "x"]))
            .build();
        let compiled = compile(&b, "twice").unwrap();
        assert_ne!(compiled.steps()[0].scope(), compiled.steps()[1].scope());
    }

    #[test]
    fn ambiguous_names_are_rejected() {
        let b = StoryBook::builder(MethodTable::new("Host").method("x", ok))
            .story(StoryDefinition::new("x").step("x"))
            .build();
        assert!(matches!(compile(&b, "x"), Err(StoryError::Composition { .. })));
    }

    #[test]
    fn inlined_steps_inherit_the_nearest_protocol() {
        let b = StoryBook::builder(MethodTable::new("Host").method("one", ok).method("two", ok))
            .story(StoryDefinition::new("leaf").step("one"))
            .story(StoryDefinition::new("narrow").step("two").failures(["a"]))
            .story(StoryDefinition::new("parent").steps(["leaf", "narrow"]).failures(["a", "b"]))
            .build();
        let compiled = compile(&b, "parent").unwrap();
        assert_eq!(compiled.steps()[0].failures(), Some(&[json!("a"), json!("b")][..]));
        assert_eq!(compiled.steps()[1].failures(), Some(&[json!("a")][..]));
        // Compilada sola, `leaf` no tiene protocolo
        assert_eq!(compile(&b, "leaf").unwrap().steps()[0].failures(), None);
    }

    #[test]
    fn child_protocol_must_fit_inside_the_parent_one() {
        let b = StoryBook::builder(MethodTable::new("Host").method("one", ok))
            .story(StoryDefinition::new("child").step("one").failures(["boom"]))
            .story(StoryDefinition::new("parent").step("child").failures(["not_found"]))
            .build();
        match compile(&b, "parent") {
            Err(StoryError::Composition { story, reason }) => {
                assert_eq!(story, "parent");
                assert!(reason.contains("'child'"), "{reason}");
            }
            other => panic!("expected composition error, got {other:?}"),
        }
        assert!(compile(&b, "child").is_ok());
    }

    #[test]
    fn contract_origins_track_each_insertion() {
        let b = StoryBook::builder(MethodTable::new("Host").method("one", ok))
            .story(StoryDefinition::new("x")
                .step("one")
                .contract(Contract::new().require("foo", "present", crate::contract::predicates::not_null)))
            .story(StoryDefinition::new("twice").steps(["x", "x"]))
            .build();
        let compiled = compile(&b, "twice").unwrap();
        let first: &[usize] = &[1];
        let second: &[usize] = &[2];
        // Una sola inserción saltada no basta para descartar el requisito
        assert_eq!(compiled.contract_after_skips(&[first]).map(|c| c.len()), Some(1));
        assert_eq!(compiled.contract_after_skips(&[first, second]).map(|c| c.len()), Some(0));
    }

    #[test]
    fn unknown_story_is_reported() {
        assert_eq!(compile(&book(), "nope").unwrap_err(), StoryError::UnknownStory("nope".into()));
    }
}
