//! Handlers for `/history`.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/history` | Optional `?plan_id=<uuid>&vehicle=<plate>` |
//! | `DELETE` | `/history/{id}` | 204; 404 if not found |

use axum::{
  extract::State,
  http::StatusCode,
};
use fleetpm_core::{
  history::{HistoryQuery, PmHistory},
  service,
  store::PmStore,
};
use uuid::Uuid;

use crate::{
  ApiState,
  error::ApiError,
  extract::{Json, Path, Query},
};

/// `GET /history`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
  Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<PmHistory>>, ApiError>
where
  S: PmStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let entries = state
    .store
    .list_history(&query)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(entries))
}

/// `DELETE /history/{id}`
pub async fn remove<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: PmStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  service::delete_history(state.store.as_ref(), id).await?;
  Ok(StatusCode::NO_CONTENT)
}
