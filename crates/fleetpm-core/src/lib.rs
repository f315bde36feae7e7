//! Core types and the recurrence/status engine for fleet preventive
//! maintenance.
//!
//! The engine itself (projection, reconciliation, status) is pure and
//! synchronous. [`service`] drives it against any [`store::PmStore`]; this
//! crate is free of HTTP and database dependencies.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod annual;
pub mod clock;
pub mod enrich;
pub mod error;
pub mod fleet;
pub mod grid;
pub mod history;
pub mod month;
pub mod plan;
pub mod projection;
pub mod recurrence;
pub mod service;
pub mod status;
pub mod store;

pub use error::{Error, Result};
