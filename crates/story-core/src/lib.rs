//! story-core: composición declarativa de historias y motor lineal.
//!
//! Una historia es una lista ordenada de referencias a steps. Cada referencia
//! resuelve a un método del objeto declarante, de uno de sus mixins, o a otra
//! historia que se expande en su lugar. El engine ejecuta la secuencia
//! aplanada sobre un único `Context`, se detiene en el primer fallo y, al
//! terminar, puede validar el contrato de la historia.
pub mod compile;
pub mod constants;
pub mod contract;
pub mod engine;
pub mod errors;
pub mod hashing;
pub mod macros;
pub mod model;
pub mod step;
pub mod story;

pub use contract::{predicates, Contract, Requirement, ValidationPolicy, Violation};
pub use engine::{EngineBuilder, EngineOptions, FailureCause, RunOutcome, StoryEngine};
pub use errors::StoryError;
pub use model::{Bindings, Context, ContextFactory, DefaultContextFactory, HistoryEntry, HistoryOutcome,
                RecordingContextFactory};
pub use step::{RunStatus, Step, StepIdentity, StepReturn, StepRunResult};
pub use story::{CompiledStory, MethodTable, StoryBook, StoryDefinition};

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	// Host con un mixin declarado como trait con métodos por defecto.
	struct Shop;

	trait Audit {
		fn audit(&self, ctx: &Context) -> StepReturn {
			Ok(StepRunResult::success_with([("audited", json!(ctx.len()))]))
		}
	}

	impl Audit for Shop {}

	impl Shop {
		fn price(&self, _ctx: &Context) -> StepReturn {
			Ok(StepRunResult::success_with([("price", json!(10))]))
		}

		fn tax(&self, ctx: &Context) -> StepReturn {
			let price: i64 = ctx.get_as("price")?;
			Ok(StepRunResult::success_with([("tax", json!(price / 5))]))
		}
	}

	fn book() -> StoryBook<Shop> {
		StoryBook::builder(method_table!(Shop { price, tax }))
			.mixin(method_table!(Shop as Audit { audit }))
			.story(StoryDefinition::new("quote").steps(["price", "tax"]))
			.story(StoryDefinition::new("checkout")
				.steps(["quote", "audit"])
				.contract(Contract::new().require("tax", "is_integer", predicates::is_integer)))
			.build()
	}

	#[test]
	fn macro_tables_resolve_own_and_mixin_methods() {
		let story = book().compile("checkout").expect("checkout compiles");
		let providers: Vec<&str> = story.steps().iter().map(|s| s.provider()).collect();
		assert_eq!(providers, vec!["Shop", "Shop", "Audit"]);

		let outcome = story.run(&Shop).expect("checkout runs");
		assert!(outcome.is_success());
		assert_eq!(outcome.context().get("tax").unwrap(), &json!(2));
		assert_eq!(outcome.context().get("audited").unwrap(), &json!(2));
	}

	#[test]
	fn compiled_stories_are_cached_per_definition() {
		let b = book();
		let first = b.compile("checkout").unwrap();
		let second = b.compile("checkout").unwrap();
		assert!(std::sync::Arc::ptr_eq(&first, &second));
		assert!(b.has_story("quote"));
		assert!(!b.has_story("audit"));
	}
}
