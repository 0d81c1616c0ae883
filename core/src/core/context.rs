// hubflow/src/core/context.rs

//! Boxed handler types stored by a `Pipeline<TData, Err>`.

use crate::core::context_data::ContextData;
use crate::core::control::PipelineControl;
use std::future::Future;
use std::pin::Pin;

/// Boxed future returned by every stored handler.
pub type HandlerFuture<T, Err> = Pin<Box<dyn Future<Output = Result<T, Err>> + Send>>;

/// A step handler.
///
/// Receives a clone of the pipeline's `ContextData<TData>` and resolves to a
/// `PipelineControl` or the pipeline's error type.
///
/// Handlers must drop any lock guard taken on the context before their first
/// `.await`; `ContextData` locks are blocking.
pub type Handler<TData, Err> = Box<dyn Fn(ContextData<TData>) -> HandlerFuture<PipelineControl, Err> + Send + Sync>;

/// Undo action for a step that has already completed.
///
/// Compensations only run while unwinding after a mandatory step failed.
/// Their own errors are logged and never replace the error that caused the
/// unwind.
pub type Compensator<TData, Err> = Box<dyn Fn(ContextData<TData>) -> HandlerFuture<(), Err> + Send + Sync>;
