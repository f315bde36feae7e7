//! JSON REST API for fleet preventive maintenance.
//!
//! Exposes an axum [`Router`] backed by any [`fleetpm_core::store::PmStore`].
//! Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", fleetpm_api::api_router(ApiState::new(store.clone())))
//! ```

pub mod annual;
pub mod error;
pub mod extract;
pub mod fleet;
pub mod history;
pub mod plans;

use std::sync::Arc;

use axum::{
  Router,
  routing::{delete, get, post, put},
};
use fleetpm_core::{
  clock::{Clock, SystemClock},
  status::StatusThresholds,
  store::PmStore,
};

pub use error::ApiError;

// ─── State ───────────────────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct ApiState<S> {
  pub store:      Arc<S>,
  /// Read once per request; every status in a response shares one "now".
  pub clock:      Arc<dyn Clock>,
  pub thresholds: StatusThresholds,
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self {
      store:      Arc::clone(&self.store),
      clock:      Arc::clone(&self.clock),
      thresholds: self.thresholds,
    }
  }
}

impl<S> ApiState<S> {
  /// State with the system clock and default thresholds.
  pub fn new(store: Arc<S>) -> Self {
    Self {
      store,
      clock: Arc::new(SystemClock),
      thresholds: StatusThresholds::default(),
    }
  }

  pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
    self.clock = Arc::new(clock);
    self
  }

  pub fn with_thresholds(mut self, thresholds: StatusThresholds) -> Self {
    self.thresholds = thresholds;
    self
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: ApiState<S>) -> Router<()>
where
  S: PmStore + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    // Plans
    .route("/plans", get(plans::list::<S>).post(plans::create::<S>))
    .route(
      "/plans/{id}",
      get(plans::get_one::<S>)
        .put(plans::update::<S>)
        .delete(plans::remove::<S>),
    )
    .route("/plans/{id}/service", post(plans::log_service::<S>))
    .route("/dashboard", get(plans::dashboard::<S>))
    // Annual grid
    .route("/plans/{id}/annual/{year}", get(annual::plan_grid::<S>))
    .route("/plans/{id}/annual/{year}/{month}", put(annual::edit_month::<S>))
    .route("/annual/{year}", get(annual::year_grids::<S>))
    // Fleet records
    .route(
      "/vehicles",
      get(fleet::list_vehicles::<S>).post(fleet::upsert_vehicle::<S>),
    )
    .route(
      "/repairs",
      get(fleet::list_repairs::<S>).post(fleet::create_repair::<S>),
    )
    // History
    .route("/history", get(history::list::<S>))
    .route("/history/{id}", delete(history::remove::<S>))
    .with_state(state)
}
