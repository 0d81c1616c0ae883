// hubflow/src/core/step.rs

/// A named step in a pipeline.
///
/// An `optional` step is best effort: when it has no handlers it is skipped,
/// and when one of its handlers fails the error is logged and the run goes on
/// to the next step without compensating anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepDef {
  pub name: String,
  pub optional: bool,
}

impl StepDef {
  pub fn new(name: impl Into<String>, optional: bool) -> Self {
    Self {
      name: name.into(),
      optional,
    }
  }
}
