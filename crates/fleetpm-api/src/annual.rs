//! Handlers for the annual PM grid.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/plans/{id}/annual/{year}` | One plan's twelve cells |
//! | `PUT`  | `/plans/{id}/annual/{year}/{month}` | Body: `{"status": .., "service_log": ..}`; month is 0-11 |
//! | `GET`  | `/annual/{year}` | Every plan's grid; optional `?vehicle=<plate>` |

use axum::extract::State;
use fleetpm_core::{
  annual::{MonthStatus, ServiceLog},
  grid::AnnualGrid,
  month::MonthIndex,
  service::{self, EditResult},
  store::PmStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  ApiState,
  error::ApiError,
  extract::{Json, Path, Query},
  plans::VehicleFilter,
};

/// `GET /plans/{id}/annual/{year}`
pub async fn plan_grid<S>(
  State(state): State<ApiState<S>>,
  Path((id, year)): Path<(Uuid, i32)>,
) -> Result<Json<AnnualGrid>, ApiError>
where
  S: PmStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let grid = service::annual_grid(state.store.as_ref(), id, year).await?;
  Ok(Json(grid))
}

#[derive(Debug, Deserialize)]
pub struct EditMonthBody {
  pub status:      MonthStatus,
  /// Required when `status` is a completed variant.
  #[serde(default)]
  pub service_log: Option<ServiceLog>,
}

/// `PUT /plans/{id}/annual/{year}/{month}`
pub async fn edit_month<S>(
  State(state): State<ApiState<S>>,
  Path((id, year, month)): Path<(Uuid, i32, i64)>,
  Json(body): Json<EditMonthBody>,
) -> Result<Json<EditResult>, ApiError>
where
  S: PmStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let month = MonthIndex::try_from(month).map_err(|e| ApiError::BadRequest(e.to_string()))?;
  let result = service::edit_month(
    state.store.as_ref(),
    id,
    year,
    month,
    body.status,
    body.service_log,
  )
  .await?;
  Ok(Json(result))
}

/// `GET /annual/{year}[?vehicle=<plate>]`
pub async fn year_grids<S>(
  State(state): State<ApiState<S>>,
  Path(year): Path<i32>,
  Query(filter): Query<VehicleFilter>,
) -> Result<Json<Vec<AnnualGrid>>, ApiError>
where
  S: PmStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let grids =
    service::annual_grids(state.store.as_ref(), year, filter.vehicle.as_deref()).await?;
  Ok(Json(grids))
}
