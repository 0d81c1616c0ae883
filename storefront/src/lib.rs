// storefront/src/lib.rs

//! Material Hub storefront client: catalog, cart, checkout, simulated
//! payment and order tracking against a remote store backend, plus the
//! profile, XP and preference plumbing around them.

pub mod busy;
pub mod config;
pub mod errors;
pub mod gateway;
pub mod models;
pub mod pipelines;
pub mod preferences;
pub mod services;
pub mod state;
pub mod tracking;

pub use errors::{AppError, Result};
pub use state::AppState;
