// tests/context_management_tests.rs
mod common;

use common::*;
use hubflow::{ContextData, Pipeline, PipelineControl};
use serial_test::serial;

#[tokio::test]
#[serial]
async fn test_context_data_is_shared_and_modified() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, TestError>::new(&[("step1_modify", false), ("step2_read_modify", false)]);

  pipeline.on_root("step1_modify", |ctx: ContextData<TestContext>| async move {
    let mut guard = ctx.write();
    guard.counter = 10;
    guard.message = "SetByStep1".to_string();
    Ok::<PipelineControl, TestError>(PipelineControl::Continue)
  });

  pipeline.on_root("step2_read_modify", |ctx: ContextData<TestContext>| async move {
    let mut guard = ctx.write();
    assert_eq!(guard.counter, 10);
    assert_eq!(guard.message, "SetByStep1");
    guard.counter += 5;
    guard.message.push_str("_ThenStep2");
    Ok::<PipelineControl, TestError>(PipelineControl::Continue)
  });

  let initial_ctx = ContextData::new(TestContext::default());
  pipeline.run(initial_ctx.clone()).await.unwrap();

  let final_guard = initial_ctx.read();
  assert_eq!(final_guard.counter, 15);
  assert_eq!(final_guard.message, "SetByStep1_ThenStep2");
}

#[tokio::test]
#[serial]
async fn test_context_data_clone_shares_data() {
  setup_tracing();
  let original_ctx = ContextData::new(TestContext {
    counter: 1,
    ..Default::default()
  });
  let cloned_ctx = original_ctx.clone();

  original_ctx.update(|c| c.counter = 5);
  assert_eq!(cloned_ctx.with(|c| c.counter), 5);

  cloned_ctx.update(|c| c.counter = 10);
  assert_eq!(original_ctx.read().counter, 10);
}

// Guards are scoped so none is alive at the await point.
#[tokio::test]
#[serial]
async fn test_context_data_locks_with_await() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, TestError>::new(&[("slow_step", false)]);
  pipeline.on_root("slow_step", |ctx: ContextData<TestContext>| async move {
    let initial_count = ctx.with(|c| c.counter);
    tokio::time::sleep(std::time::Duration::from_millis(1)).await;
    ctx.update(|c| {
      c.counter = initial_count + 1;
      c.steps_executed.push("slow_step".to_string());
    });
    Ok::<_, TestError>(PipelineControl::Continue)
  });

  let ctx = ContextData::new(TestContext::default());
  pipeline.run(ctx.clone()).await.unwrap();
  assert_eq!(ctx.read().counter, 1);
  assert_eq!(ctx.read().steps_executed, vec!["slow_step"]);
}

#[test]
fn test_context_data_default_uses_inner_default() {
  let ctx: ContextData<TestContext> = ContextData::default();
  assert_eq!(ctx.with(|c| c.counter), 0);
  assert!(ctx.with(|c| c.steps_executed.is_empty()));
}
