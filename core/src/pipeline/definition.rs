// hubflow/src/pipeline/definition.rs

//! The `Pipeline<TData, Err>` struct and its structural methods.

use crate::core::context::{Compensator, Handler};
use crate::core::step::StepDef;
use crate::error::FlowError;
use std::collections::HashMap;

/// An ordered set of named steps over a root data type `TData`.
///
/// `Err` is the error type handlers return. It must be constructible from
/// `FlowError` so that engine-level failures (a mandatory step without
/// handlers) come back through the same channel as handler errors.
pub struct Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pub(crate) steps: Vec<StepDef>,

  pub(crate) before: HashMap<String, Vec<Handler<TData, Err>>>,
  pub(crate) on: HashMap<String, Vec<Handler<TData, Err>>>,
  pub(crate) after: HashMap<String, Vec<Handler<TData, Err>>>,

  pub(crate) compensations: HashMap<String, Vec<Compensator<TData, Err>>>,
}

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Creates a pipeline from `(step_name, optional)` pairs, in run order.
  pub fn new(step_defs: &[(&str, bool)]) -> Self {
    let mut steps: Vec<StepDef> = Vec::with_capacity(step_defs.len());
    for (name, optional) in step_defs {
      if steps.iter().any(|s| s.name == *name) {
        panic!("hubflow setup error: step '{}' declared twice.", name);
      }
      steps.push(StepDef::new(*name, *optional));
    }

    Self {
      steps,
      before: HashMap::new(),
      on: HashMap::new(),
      after: HashMap::new(),
      compensations: HashMap::new(),
    }
  }

  /// Step names in run order.
  pub fn step_names(&self) -> Vec<&str> {
    self.steps.iter().map(|s| s.name.as_str()).collect()
  }

  pub fn step(&self, step_name: &str) -> Option<&StepDef> {
    self.steps.iter().find(|s| s.name == step_name)
  }

  // A typo in a step name is a programming error, not a runtime condition.
  pub(crate) fn ensure_step_exists(&self, step_name: &str) {
    if self.step(step_name).is_none() {
      panic!(
        "hubflow setup error: step '{}' not found in pipeline definition.",
        step_name
      );
    }
  }
}
