//! Handlers for `/plans` and `/dashboard`.
//!
//! | Method   | Path                  | Notes |
//! |----------|-----------------------|-------|
//! | `GET`    | `/plans`              | Enriched; optional `?vehicle=<plate>` |
//! | `POST`   | `/plans`              | Body: [`NewPlan`]; 201 |
//! | `GET`    | `/plans/{id}`         | Enriched; 404 if not found |
//! | `PUT`    | `/plans/{id}`         | Body: [`NewPlan`] |
//! | `DELETE` | `/plans/{id}`         | 204; also drops the plan's overrides |
//! | `POST`   | `/plans/{id}/service` | Body: [`ServiceLog`]; 201 |
//! | `GET`    | `/dashboard`          | Status counts |

use axum::{
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use fleetpm_core::{
  annual::ServiceLog,
  enrich::{EnrichedPlan, StatusSummary},
  plan::{MaintenancePlan, NewPlan},
  service,
  store::PmStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  ApiState,
  error::ApiError,
  extract::{Json, Path, Query},
};

/// Optional `?vehicle=<plate>` filter shared by list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct VehicleFilter {
  pub vehicle: Option<String>,
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /plans[?vehicle=<plate>]`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
  Query(filter): Query<VehicleFilter>,
) -> Result<Json<Vec<EnrichedPlan>>, ApiError>
where
  S: PmStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let now = state.clock.now();
  let plans = service::enriched_plans(
    state.store.as_ref(),
    filter.vehicle.as_deref(),
    now,
    &state.thresholds,
  )
  .await?;
  Ok(Json(plans))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /plans`
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  Json(body): Json<NewPlan>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PmStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let plan = service::create_plan(state.store.as_ref(), body).await?;
  Ok((StatusCode::CREATED, Json(plan)))
}

// ─── Get / update / delete ────────────────────────────────────────────────────

/// `GET /plans/{id}`
pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<EnrichedPlan>, ApiError>
where
  S: PmStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let now = state.clock.now();
  let plan =
    service::enriched_plan(state.store.as_ref(), id, now, &state.thresholds).await?;
  Ok(Json(plan))
}

/// `PUT /plans/{id}`
pub async fn update<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<NewPlan>,
) -> Result<Json<MaintenancePlan>, ApiError>
where
  S: PmStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let plan = service::update_plan(state.store.as_ref(), id, body).await?;
  Ok(Json(plan))
}

/// `DELETE /plans/{id}`
pub async fn remove<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: PmStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  service::delete_plan(state.store.as_ref(), id).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Service log ──────────────────────────────────────────────────────────────

/// `POST /plans/{id}/service` — records the service and advances the plan's
/// anchors.
pub async fn log_service<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<ServiceLog>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PmStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let logged = service::log_service(state.store.as_ref(), id, body).await?;
  Ok((StatusCode::CREATED, Json(logged)))
}

// ─── Dashboard ────────────────────────────────────────────────────────────────

/// `GET /dashboard`
pub async fn dashboard<S>(
  State(state): State<ApiState<S>>,
) -> Result<Json<StatusSummary>, ApiError>
where
  S: PmStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let now = state.clock.now();
  let summary =
    service::dashboard(state.store.as_ref(), now, &state.thresholds).await?;
  Ok(Json(summary))
}
