//! Core StoryEngine implementation

use log::{debug, error, warn};
use serde_json::Value;

use crate::engine::{EngineBuilder, EngineOptions, FailureCause, RunOutcome};
use crate::errors::StoryError;
use crate::model::{Bindings, Context, ContextFactory, DefaultContextFactory, HistoryOutcome};
use crate::step::{RunStatus, StepRunResult};
use crate::story::CompiledStory;

/// Motor de ejecución de historias compiladas.
///
/// Recorre la secuencia aplanada en orden, sobre un único `Context` creado
/// por la factory al inicio de cada invocación. Se detiene en el primer fallo.
/// No reintenta nada: un fallo siempre es terminal para la ejecución.
#[derive(Debug, Clone, Default)]
pub struct StoryEngine<F: ContextFactory = DefaultContextFactory> {
    factory: F,
    options: EngineOptions,
}

impl StoryEngine<DefaultContextFactory> {
    /// Engine con factory y opciones por defecto.
    #[inline]
    pub fn new() -> Self {
        Self::with_factory(DefaultContextFactory, EngineOptions::default())
    }

    #[inline]
    pub fn builder() -> EngineBuilder<DefaultContextFactory> {
        EngineBuilder::new()
    }
}

impl<F: ContextFactory> StoryEngine<F> {
    pub fn with_factory(factory: F, options: EngineOptions) -> Self {
        Self { factory, options }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Ejecuta `story` sobre `host` con un contexto vacío.
    pub fn run<T>(&self, story: &CompiledStory<T>, host: &T) -> Result<RunOutcome, StoryError> {
        self.run_with(story, host, Bindings::new())
    }

    /// Ejecuta `story` sobre `host`; `initial` se liga antes del primer step.
    ///
    /// `Ok(Failed)` es un fallo normal de negocio. `Err` es un defecto: un step
    /// devolvió `Err`, un resultado fuera de protocolo, o (con
    /// `enforce_contract`) el contexto final no cumple el contrato.
    pub fn run_with<T>(&self, story: &CompiledStory<T>, host: &T, initial: Bindings) -> Result<RunOutcome, StoryError> {
        let mut ctx = self.factory.create();
        for (name, value) in initial {
            ctx.bind(name, value)?;
        }
        let mut status = RunStatus::Start.advance(RunStatus::Running);
        debug!("run {} of story '{}' ({} steps)", ctx.run_id(), story.name(), story.len());

        let mut skipping: Option<&[usize]> = None;
        let mut skipped: Vec<&[usize]> = Vec::new();
        let mut value: Option<Value> = None;

        for step in story.steps() {
            if let Some(scope) = skipping {
                if step.scope().starts_with(scope) {
                    continue;
                }
                skipping = None;
            }

            let identity = step.identity();
            let result = step.invoke(host, &ctx)?;
            step.check_protocol(&result)?;
            debug!("run {}: step {} -> {}", ctx.run_id(), identity, result.variant());

            match result {
                StepRunResult::Success { outputs } => {
                    if let Some(name) = outputs.keys().find(|k| ctx.contains(k)).cloned() {
                        warn!("run {}: step {} re-binds '{}'", ctx.run_id(), identity, name);
                        ctx.record(identity.clone(), HistoryOutcome::Collision { name: name.clone() });
                        status = status.advance(RunStatus::Failed);
                        debug_assert!(status.is_terminal());
                        return Ok(RunOutcome::Failed { context: ctx,
                                                       step: identity.clone(),
                                                       cause: FailureCause::NameCollision { name } });
                    }
                    let bound: Vec<String> = outputs.keys().cloned().collect();
                    for (name, v) in outputs {
                        ctx.bind(name, v)?;
                    }
                    ctx.record(identity.clone(), HistoryOutcome::Success { bound });
                }
                StepRunResult::Failure { reason } => {
                    warn!("run {}: step {} failed{}",
                          ctx.run_id(),
                          identity,
                          reason.as_ref().map(|r| format!(" because {r}")).unwrap_or_default());
                    ctx.record(identity.clone(), HistoryOutcome::Failure { reason: reason.clone() });
                    status = status.advance(RunStatus::Failed);
                    debug_assert!(status.is_terminal());
                    return Ok(RunOutcome::Failed { context: ctx,
                                                   step: identity.clone(),
                                                   cause: FailureCause::Reason(reason) });
                }
                StepRunResult::Result { value: v } => {
                    ctx.record(identity.clone(), HistoryOutcome::Result { value: v.clone() });
                    value = Some(v);
                    break;
                }
                StepRunResult::Skip => {
                    ctx.record(identity.clone(), HistoryOutcome::Skip);
                    if !step.is_inlined() {
                        break;
                    }
                    skipping = Some(step.scope());
                    skipped.push(step.scope());
                }
            }
        }

        status = status.advance(RunStatus::Completed);
        debug!("run {} of story '{}' {:?}: {}", ctx.run_id(), story.name(), status, ctx.outcome_codes());
        self.enforce_contract(story, &ctx, &skipped)?;
        Ok(RunOutcome::Completed { context: ctx, value })
    }

    /// Valida el contrato efectivo. Los requisitos aportados sólo por
    /// historias anidadas que se saltaron no se exigen.
    fn enforce_contract<T>(&self, story: &CompiledStory<T>, ctx: &Context, skipped: &[&[usize]]) -> Result<(), StoryError> {
        if !self.options.enforce_contract {
            return Ok(());
        }
        let Some(contract) = story.contract_after_skips(skipped) else {
            return Ok(());
        };
        contract.validate_with(ctx, self.options.contract_policy)
                .inspect_err(|e| error!("run {} of story '{}' broke its contract: {}", ctx.run_id(), story.name(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::story::{MethodTable, StoryBook, StoryDefinition};
    use serde_json::json;

    struct Host;

    #[test]
    fn engine_runs_steps_in_order_and_binds_outputs() {
        let book = StoryBook::builder(MethodTable::new("Host")
            .method("first", |_: &Host, _: &Context| Ok(StepRunResult::success_with([("a", json!(1))])))
            .method("second", |_: &Host, ctx: &Context| {
                let a = ctx.get("a")?.as_i64().unwrap_or_default();
                Ok(StepRunResult::success_with([("b", json!(a + 1))]))
            }))
            .story(StoryDefinition::new("s").steps(["first", "second"]))
            .build();
        let story = book.compile("s").unwrap();

        let outcome = StoryEngine::new().run(&story, &Host).unwrap();
        assert!(outcome.is_success());
        assert_eq!(outcome.context().get("b").unwrap(), &json!(2));
        assert_eq!(outcome.context().outcome_codes(), "SS");
        assert_eq!(outcome.status(), RunStatus::Completed);
    }

    #[test]
    fn initial_bindings_are_visible_to_steps() {
        let book = StoryBook::builder(MethodTable::new("Host").method("echo", |_: &Host, ctx: &Context| {
                                                                   let v = ctx.get("input")?.clone();
                                                                   Ok(StepRunResult::success_with([("output", v)]))
                                                               }))
            .story(StoryDefinition::new("s").step("echo"))
            .build();
        let story = book.compile("s").unwrap();
        let initial: Bindings = [("input".to_string(), json!("hi"))].into_iter().collect();
        let outcome = story.run_with(&Host, initial).unwrap();
        assert_eq!(outcome.context().get("output").unwrap(), &json!("hi"));
    }
}
