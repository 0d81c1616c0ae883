// hubflow/src/core/control.rs

//! Flow signals returned by handlers and by a whole pipeline run.

/// Returned by a handler to continue or halt the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineControl {
  Continue,
  /// Halt immediately. Nothing after this handler runs and no compensation
  /// is triggered: stopping is a deliberate outcome, not a failure.
  Stop,
}

/// Outcome of a pipeline run that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineResult {
  Completed,
  Stopped,
}
