// hubflow/src/lib.rs

//! Hubflow: small async workflow pipelines for multi-step client flows.
//!
//! A pipeline is an ordered list of named steps run against a shared
//! `ContextData<T>`. It supports:
//!  - `before` / `on` / `after` handlers per step.
//!  - Early stopping through `PipelineControl::Stop`.
//!  - Optional steps whose failure is logged and tolerated.
//!  - Compensations registered per step, run in reverse order for every
//!    completed step when a later mandatory step fails.
//!
//! There is no transaction manager here. Compensation is best effort: a
//! failing compensation is logged and the rollback moves on to the next one.

pub mod core;
pub mod error;
pub mod pipeline;

pub use crate::core::context::{Compensator, Handler};
pub use crate::core::context_data::ContextData;
pub use crate::core::control::{PipelineControl, PipelineResult};
pub use crate::core::step::StepDef;

pub use crate::pipeline::definition::Pipeline;

pub use crate::error::{FlowError, FlowResult};

/*
    Typical use:
    1. Define a context struct `MyCtx` holding the inputs, service handles and
       the values each step produces for the next.
    2. Create a `Pipeline<MyCtx, MyError>` with `(name, optional)` step pairs.
    3. Register async handlers with `.on_root()` (or `.before_root()` /
       `.after_root()`).
    4. For steps with remote side effects, register the undo with
       `.compensate_with()`.
    5. Run with `pipeline.run(ContextData::new(ctx)).await` and read results
       back out of the context.
*/
