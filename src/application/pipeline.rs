//! Step-list pipeline runner
//!
//! A pipeline is an ordered list of steps over a mutable per-run context.
//! The runner stops at the first error and maps it to a terminal outcome:
//! a declined gate becomes `Aborted`, anything else `Failed`.

use crate::domain::ports::{DeployEvent, DeployEventSink};
use crate::domain::value_objects::{Outcome, Stage};
use crate::error::{RolloutError, RolloutResult};

/// Context threaded through every step of a run
pub trait PipelineContext {
    /// Name reported in events and logs (target or branch)
    fn subject(&self) -> &str;

    fn events(&self) -> &dyn DeployEventSink;
}

pub type StepFn<C> = fn(&mut C) -> RolloutResult<()>;

pub struct Step<C> {
    pub stage: Stage,
    pub name: &'static str,
    pub run: StepFn<C>,
}

impl<C> Step<C> {
    pub fn new(stage: Stage, name: &'static str, run: StepFn<C>) -> Self {
        Self { stage, name, run }
    }
}

pub struct Pipeline<C> {
    steps: Vec<Step<C>>,
}

impl<C: PipelineContext> Pipeline<C> {
    pub fn new(steps: Vec<Step<C>>) -> Self {
        Self { steps }
    }

    pub fn stages(&self) -> Vec<Stage> {
        let mut stages: Vec<Stage> = Vec::new();
        for step in &self.steps {
            if stages.last() != Some(&step.stage) {
                stages.push(step.stage);
            }
        }
        stages
    }

    /// Run every step in order
    pub fn run(&self, ctx: &mut C) -> Outcome {
        let mut current: Option<Stage> = None;

        for step in &self.steps {
            if current != Some(step.stage) {
                current = Some(step.stage);
                tracing::info!(target_name = ctx.subject(), stage = %step.stage, "stage started");
                if ctx.events().wants_detailed_events() {
                    ctx.events().on_event(DeployEvent::StageStarted {
                        target: ctx.subject().to_string(),
                        stage: step.stage,
                    });
                }
            }

            tracing::debug!(target_name = ctx.subject(), step = step.name, "step");
            match (step.run)(ctx) {
                Ok(()) => {}
                Err(RolloutError::UserDeclined { gate, .. }) => {
                    tracing::warn!(target_name = ctx.subject(), gate = %gate, "declined by operator");
                    return Outcome::Aborted {
                        stage: step.stage,
                        reason: format!("declined: {gate}"),
                    };
                }
                Err(error) => {
                    tracing::error!(
                        target_name = ctx.subject(),
                        stage = %step.stage,
                        step = step.name,
                        error = %error,
                        "pipeline failed"
                    );
                    return Outcome::Failed {
                        stage: step.stage,
                        error,
                    };
                }
            }
        }

        Outcome::Done
    }
}
