//! Store-backed operations: load what the pure engine needs, run it, and
//! write the results back.
//!
//! Every mutation here is a single read-modify-write against the store with
//! no version check, so concurrent writers to the same override record race
//! and the last write wins.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
  Error,
  annual::{AnnualOverrides, MonthStatus, ServiceLog, apply_edit},
  enrich::{EnrichedPlan, StatusSummary, enrich_with},
  fleet::RepairRecord,
  grid::{AnnualGrid, build_grid, grid_from_parts},
  history::PmHistory,
  month::MonthIndex,
  plan::{MaintenancePlan, NewPlan},
  projection::project_year,
  status::StatusThresholds,
  store::PmStore,
};

#[derive(Debug, Error)]
pub enum ServiceError<E>
where
  E: std::error::Error + 'static,
{
  #[error(transparent)]
  Core(#[from] Error),

  #[error("{kind} not found: {id}")]
  NotFound { kind: &'static str, id: Uuid },

  #[error("store error: {0}")]
  Store(#[source] E),
}

impl<E> ServiceError<E>
where
  E: std::error::Error + 'static,
{
  fn plan_not_found(id: Uuid) -> Self {
    Self::NotFound { kind: "maintenance plan", id }
  }

  /// Whether the caller supplied invalid input.
  pub fn is_validation(&self) -> bool {
    matches!(self, Self::Core(e) if e.is_validation())
  }
}

pub type ServiceResult<T, E> = std::result::Result<T, ServiceError<E>>;

/// The grid after a month edit, plus the history entry the edit created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditResult {
  pub grid:    AnnualGrid,
  pub history: Option<PmHistory>,
}

/// The plan with its advanced anchors, plus the stored history entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggedService {
  pub plan:    MaintenancePlan,
  pub history: PmHistory,
}

async fn load_plan<S: PmStore>(
  store: &S,
  id: Uuid,
) -> ServiceResult<MaintenancePlan, S::Error> {
  store
    .get_plan(id)
    .await
    .map_err(ServiceError::Store)?
    .ok_or_else(|| ServiceError::plan_not_found(id))
}

// ─── Plans ───────────────────────────────────────────────────────────────────

pub async fn create_plan<S: PmStore>(
  store: &S,
  input: NewPlan,
) -> ServiceResult<MaintenancePlan, S::Error> {
  input.validate()?;
  let plan = store.add_plan(input).await.map_err(ServiceError::Store)?;
  info!(plan_id = %plan.plan_id, plate = %plan.vehicle_license_plate, "created plan");
  Ok(plan)
}

/// Replace the editable fields of plan `id`. Anchors set here are taken
/// verbatim, even if they move backwards.
pub async fn update_plan<S: PmStore>(
  store: &S,
  id: Uuid,
  input: NewPlan,
) -> ServiceResult<MaintenancePlan, S::Error> {
  input.validate()?;
  let mut plan = load_plan(store, id).await?;
  plan.apply(input);
  store
    .update_plan(plan)
    .await
    .map_err(ServiceError::Store)?
    .ok_or_else(|| ServiceError::plan_not_found(id))
}

pub async fn delete_plan<S: PmStore>(store: &S, id: Uuid) -> ServiceResult<(), S::Error> {
  if store.delete_plan(id).await.map_err(ServiceError::Store)? {
    info!(plan_id = %id, "deleted plan");
    Ok(())
  } else {
    Err(ServiceError::plan_not_found(id))
  }
}

// ─── Status ──────────────────────────────────────────────────────────────────

/// Enrich every plan (optionally for one vehicle) as of `now`. Repair
/// history is fetched once per vehicle.
pub async fn enriched_plans<S: PmStore>(
  store: &S,
  vehicle: Option<&str>,
  now: NaiveDateTime,
  thresholds: &StatusThresholds,
) -> ServiceResult<Vec<EnrichedPlan>, S::Error> {
  let plans = store.list_plans(vehicle).await.map_err(ServiceError::Store)?;

  let mut repairs: HashMap<String, Vec<RepairRecord>> = HashMap::new();
  let mut enriched = Vec::with_capacity(plans.len());
  for plan in &plans {
    let plate = &plan.vehicle_license_plate;
    if !repairs.contains_key(plate) {
      let records = store.list_repairs(plate).await.map_err(ServiceError::Store)?;
      repairs.insert(plate.clone(), records);
    }
    let records = repairs.get(plate).map(Vec::as_slice).unwrap_or_default();
    enriched.push(enrich_with(plan, records, now, thresholds));
  }
  Ok(enriched)
}

pub async fn enriched_plan<S: PmStore>(
  store: &S,
  id: Uuid,
  now: NaiveDateTime,
  thresholds: &StatusThresholds,
) -> ServiceResult<EnrichedPlan, S::Error> {
  let plan = load_plan(store, id).await?;
  let repairs = store
    .list_repairs(&plan.vehicle_license_plate)
    .await
    .map_err(ServiceError::Store)?;
  Ok(enrich_with(&plan, &repairs, now, thresholds))
}

pub async fn dashboard<S: PmStore>(
  store: &S,
  now: NaiveDateTime,
  thresholds: &StatusThresholds,
) -> ServiceResult<StatusSummary, S::Error> {
  let plans = enriched_plans(store, None, now, thresholds).await?;
  Ok(StatusSummary::from_plans(&plans))
}

// ─── Annual grid ─────────────────────────────────────────────────────────────

pub async fn annual_grid<S: PmStore>(
  store: &S,
  plan_id: Uuid,
  year: i32,
) -> ServiceResult<AnnualGrid, S::Error> {
  let plan = load_plan(store, plan_id).await?;
  let key = plan.annual_key(year);
  let overrides = store.get_annual(&key).await.map_err(ServiceError::Store)?;
  Ok(build_grid(&plan, year, overrides.as_ref()))
}

/// Grids for every plan in `year`, optionally for one vehicle.
pub async fn annual_grids<S: PmStore>(
  store: &S,
  year: i32,
  vehicle: Option<&str>,
) -> ServiceResult<Vec<AnnualGrid>, S::Error> {
  let plans = store.list_plans(vehicle).await.map_err(ServiceError::Store)?;
  let records = store.list_annual(year).await.map_err(ServiceError::Store)?;
  let overrides = AnnualOverrides::from_records(records);
  debug!(year, plans = plans.len(), overrides = overrides.len(), "building grids");

  Ok(
    plans
      .iter()
      .map(|plan| build_grid(plan, year, overrides.get(&plan.annual_key(year))))
      .collect(),
  )
}

/// Set `month` of `year` to `status` for one plan.
///
/// Validation runs before any write; a rejected edit leaves both the override
/// record and the history untouched.
pub async fn edit_month<S: PmStore>(
  store: &S,
  plan_id: Uuid,
  year: i32,
  month: MonthIndex,
  status: MonthStatus,
  log: Option<ServiceLog>,
) -> ServiceResult<EditResult, S::Error> {
  let plan = load_plan(store, plan_id).await?;
  let key = plan.annual_key(year);
  let existing = store.get_annual(&key).await.map_err(ServiceError::Store)?;
  let calculated = project_year(&plan, year);

  let outcome = apply_edit(
    &plan,
    existing.as_ref(),
    year,
    month,
    status,
    &calculated,
    log.as_ref(),
  )?;

  if let Some(record) = &outcome.annual {
    store
      .put_annual(record.clone())
      .await
      .map_err(ServiceError::Store)?;
  }

  let history = match outcome.history {
    Some(entry) => Some(store.append_history(entry).await.map_err(ServiceError::Store)?),
    None => None,
  };

  info!(
    plan_id = %plan_id,
    year,
    month = %month,
    status = %status,
    "edited month"
  );

  let overrides = outcome.annual.as_ref().or(existing.as_ref());
  Ok(EditResult {
    grid: grid_from_parts(&plan, year, &calculated, overrides),
    history,
  })
}

/// Record a completed service outside the grid and move the plan's anchors
/// forward to it.
pub async fn log_service<S: PmStore>(
  store: &S,
  plan_id: Uuid,
  log: ServiceLog,
) -> ServiceResult<LoggedService, S::Error> {
  let mut plan = load_plan(store, plan_id).await?;
  let entry = log.to_history(&plan, "service log")?;
  let (date, mileage) = (entry.service_date, entry.mileage);

  // The advanced plan must be storable before anything is written.
  let advanced = plan.advance_anchor(date, mileage);
  if advanced {
    plan.validate()?;
  }

  let history = store.append_history(entry).await.map_err(ServiceError::Store)?;

  if advanced {
    plan = store
      .update_plan(plan)
      .await
      .map_err(ServiceError::Store)?
      .ok_or_else(|| ServiceError::plan_not_found(plan_id))?;
    debug!(plan_id = %plan_id, %date, mileage, "advanced plan anchors");
  }

  info!(plan_id = %plan_id, history_id = %history.history_id, "logged service");
  Ok(LoggedService { plan, history })
}

// ─── History ─────────────────────────────────────────────────────────────────

pub async fn delete_history<S: PmStore>(store: &S, id: Uuid) -> ServiceResult<(), S::Error> {
  if store.delete_history(id).await.map_err(ServiceError::Store)? {
    Ok(())
  } else {
    Err(ServiceError::NotFound { kind: "history entry", id })
  }
}

#[cfg(test)]
mod tests;
