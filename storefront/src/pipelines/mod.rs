// storefront/src/pipelines/mod.rs

//! Workflow definitions for the commerce flows. Each service builds the
//! pipeline it drives once and shares it behind an `Arc`.

pub mod contexts;

pub mod cart_pipeline;
pub mod checkout_pipeline;
pub mod payment_pipeline;
