//! HTTP server assembly for fleet PM.
//!
//! Loads [`ServerConfig`] and mounts the JSON API from `fleetpm-api` under
//! `/api`, wrapped in request tracing.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use axum::{Router, routing::get};
use fleetpm_api::{ApiState, api_router};
use fleetpm_core::{status::StatusThresholds, store::PmStore};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `FLEETPM_*` environment variables. Every field has a default.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:            String,
  pub port:            u16,
  pub store_path:      PathBuf,
  /// A plan is `due` when its next date is at most this many days away.
  pub due_within_days: i64,
  /// A plan is `due` when its next mileage is at most this many km away.
  pub due_within_km:   i64,
}

impl Default for ServerConfig {
  fn default() -> Self {
    let thresholds = StatusThresholds::default();
    Self {
      host:            "127.0.0.1".to_string(),
      port:            8080,
      store_path:      PathBuf::from("~/.local/share/fleetpm/fleetpm.db"),
      due_within_days: thresholds.due_within_days,
      due_within_km:   thresholds.due_within_km,
    }
  }
}

impl ServerConfig {
  /// Layer the (optional) file at `path` under `FLEETPM_*` environment
  /// variables.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("FLEETPM"))
      .build()?
      .try_deserialize()
  }

  pub fn thresholds(&self) -> StatusThresholds {
    StatusThresholds {
      due_within_days: self.due_within_days,
      due_within_km:   self.due_within_km,
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router: `/health` plus the API under `/api`.
pub fn router<S>(store: Arc<S>, config: &ServerConfig) -> Router
where
  S: PmStore + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let state = ApiState::new(store).with_thresholds(config.thresholds());
  Router::new()
    .route("/health", get(|| async { "ok" }))
    .nest("/api", api_router(state))
    .layer(TraceLayer::new_for_http())
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Integration tests ────────────────────────────────────────────────────────
