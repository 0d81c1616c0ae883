// hubflow/src/pipeline/execution.rs

//! `Pipeline::run()`: executes steps in order and unwinds completed steps
//! through their compensations when a mandatory step fails.

use crate::core::context::Handler;
use crate::core::context_data::ContextData;
use crate::core::control::{PipelineControl, PipelineResult};
use crate::core::step::StepDef;
use crate::error::FlowError;
use crate::pipeline::definition::Pipeline;
use tracing::{event, instrument, span, Instrument, Level};

enum StepOutcome {
  Continue,
  Stop,
  Skipped,
}

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Executes the pipeline against `ctx_data`.
  ///
  /// On a mandatory step failure every previously completed step is
  /// compensated, last one first, and then the original error is returned.
  /// An optional step failure is logged and the run continues. A handler
  /// returning `PipelineControl::Stop` ends the run with
  /// `PipelineResult::Stopped` and compensates nothing.
  #[instrument(
        name = "Pipeline::run",
        skip_all,
        fields(
            context_type = %std::any::type_name::<TData>(),
            num_steps = self.steps.len(),
        ),
        err(Display)
    )]
  pub async fn run(&self, ctx_data: ContextData<TData>) -> Result<PipelineResult, Err> {
    event!(Level::DEBUG, "Pipeline execution starting.");
    let mut completed: Vec<&str> = Vec::with_capacity(self.steps.len());

    for (step_idx, step_def) in self.steps.iter().enumerate() {
      let step_span = span!(
        Level::INFO,
        "pipeline_step",
        step_name = step_def.name.as_str(),
        step_index = step_idx,
        optional = step_def.optional
      );

      match self.run_step(step_def, &ctx_data).instrument(step_span).await {
        Ok(StepOutcome::Continue) => completed.push(step_def.name.as_str()),
        Ok(StepOutcome::Skipped) => {}
        Ok(StepOutcome::Stop) => {
          event!(Level::INFO, step_name = %step_def.name, "Pipeline stopped by a handler.");
          return Ok(PipelineResult::Stopped);
        }
        Err(e) if step_def.optional => {
          event!(Level::WARN, step_name = %step_def.name, error = %e, "Optional step failed, continuing.");
        }
        Err(e) => {
          event!(Level::ERROR, step_name = %step_def.name, error = %e, "Step failed.");
          self.unwind(&completed, &ctx_data).await;
          return Err(e);
        }
      }
    }

    event!(Level::DEBUG, "Pipeline execution completed.");
    Ok(PipelineResult::Completed)
  }

  async fn run_step(&self, step_def: &StepDef, ctx_data: &ContextData<TData>) -> Result<StepOutcome, Err> {
    let name = step_def.name.as_str();
    let phases: [(&str, Option<&Vec<Handler<TData, Err>>>); 3] = [
      ("before", self.before.get(name)),
      ("on", self.on.get(name)),
      ("after", self.after.get(name)),
    ];

    if phases.iter().all(|(_, handlers)| handlers.map_or(true, |v| v.is_empty())) {
      if step_def.optional {
        event!(Level::DEBUG, "Optional step has no handlers, skipping.");
        return Ok(StepOutcome::Skipped);
      }
      return Err(Err::from(FlowError::HandlerMissing {
        step_name: step_def.name.clone(),
      }));
    }

    for (phase, handlers) in phases {
      let Some(handlers) = handlers else { continue };
      for (handler_idx, handler_fn) in handlers.iter().enumerate() {
        event!(Level::TRACE, phase = phase, handler_index = handler_idx, "Executing handler.");
        if handler_fn(ctx_data.clone()).await? == PipelineControl::Stop {
          return Ok(StepOutcome::Stop);
        }
      }
    }
    Ok(StepOutcome::Continue)
  }

  async fn unwind(&self, completed: &[&str], ctx_data: &ContextData<TData>) {
    for step_name in completed.iter().rev() {
      let Some(compensators) = self.compensations.get(*step_name) else {
        continue;
      };
      for compensate in compensators {
        match compensate(ctx_data.clone()).await {
          Ok(()) => event!(Level::INFO, %step_name, "Compensation applied."),
          Err(e) => event!(
            Level::ERROR,
            %step_name,
            error = %e,
            "Compensation failed; continuing rollback."
          ),
        }
      }
    }
  }
}
