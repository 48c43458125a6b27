//! StoryFlow
//!
//! Este crate actúa como fachada de `story-core`:
//! - Re-exporta el núcleo (historias, compilador, engine, contratos).
//! - Expone `config` para construir el engine desde variables de entorno.

pub mod config;

pub use story_core::*;

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn facade_exposes_core_types() {
		let book = StoryBook::builder(MethodTable::new("Host").method("noop", |_: &(), _: &Context| {
			                                                      Ok(StepRunResult::success())
		                                                      }))
			.story(StoryDefinition::new("s").step("noop"))
			.build();
		let outcome = config::AppConfig::default().engine().run(&book.compile("s").unwrap(), &()).unwrap();
		assert!(outcome.is_success());
	}
}
