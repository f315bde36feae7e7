//! Handlers for `/vehicles` and `/repairs`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/vehicles` | |
//! | `POST` | `/vehicles` | Body: [`Vehicle`]; insert or replace by plate |
//! | `GET`  | `/repairs?vehicle=<plate>` | `vehicle` is required |
//! | `POST` | `/repairs` | Body: [`NewRepair`]; 201 |

use axum::{
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use fleetpm_core::{
  fleet::{NewRepair, RepairRecord, Vehicle},
  store::PmStore,
};
use serde::Deserialize;

use crate::{
  ApiState,
  error::ApiError,
  extract::{Json, Query},
};

fn require_plate(plate: &str) -> Result<(), ApiError> {
  if plate.trim().is_empty() {
    return Err(ApiError::BadRequest("license plate must not be empty".into()));
  }
  Ok(())
}

// ─── Vehicles ─────────────────────────────────────────────────────────────────

/// `GET /vehicles`
pub async fn list_vehicles<S>(
  State(state): State<ApiState<S>>,
) -> Result<Json<Vec<Vehicle>>, ApiError>
where
  S: PmStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let vehicles = state.store.list_vehicles().await.map_err(ApiError::store)?;
  Ok(Json(vehicles))
}

/// `POST /vehicles`
pub async fn upsert_vehicle<S>(
  State(state): State<ApiState<S>>,
  Json(body): Json<Vehicle>,
) -> Result<Json<Vehicle>, ApiError>
where
  S: PmStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  require_plate(&body.license_plate)?;
  let vehicle = state.store.upsert_vehicle(body).await.map_err(ApiError::store)?;
  Ok(Json(vehicle))
}

// ─── Repairs ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RepairParams {
  pub vehicle: Option<String>,
}

/// `GET /repairs?vehicle=<plate>`
pub async fn list_repairs<S>(
  State(state): State<ApiState<S>>,
  Query(params): Query<RepairParams>,
) -> Result<Json<Vec<RepairRecord>>, ApiError>
where
  S: PmStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let plate = params
    .vehicle
    .ok_or_else(|| ApiError::BadRequest("`vehicle` query parameter is required".into()))?;
  require_plate(&plate)?;
  let repairs = state
    .store
    .list_repairs(&plate)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(repairs))
}

/// `POST /repairs`
pub async fn create_repair<S>(
  State(state): State<ApiState<S>>,
  Json(body): Json<NewRepair>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PmStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  body.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;
  let record = state.store.add_repair(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(record)))
}
