//! Service-layer tests against a throwaway in-memory store.

use std::{
  collections::HashMap,
  convert::Infallible,
  sync::{Mutex, MutexGuard},
};

use chrono::{NaiveDate, Utc};

use super::*;
use crate::{
  annual::{AnnualPlanKey, AnnualPmPlan},
  fleet::{NewRepair, Vehicle},
  history::{HistoryQuery, NewPmHistory},
  plan::FrequencyUnit,
  status::PlanStatus,
};

// ─── In-memory store ─────────────────────────────────────────────────────────

#[derive(Default)]
struct Inner {
  plans:    Vec<MaintenancePlan>,
  vehicles: Vec<Vehicle>,
  repairs:  Vec<RepairRecord>,
  annual:   HashMap<AnnualPlanKey, AnnualPmPlan>,
  history:  Vec<PmHistory>,
}

#[derive(Default)]
struct MemStore(Mutex<Inner>);

impl MemStore {
  fn lock(&self) -> MutexGuard<'_, Inner> { self.0.lock().unwrap() }
}

impl PmStore for MemStore {
  type Error = Infallible;

  async fn add_plan(&self, input: NewPlan) -> Result<MaintenancePlan, Infallible> {
    let plan = input.into_plan(Uuid::new_v4(), Utc::now());
    self.lock().plans.push(plan.clone());
    Ok(plan)
  }

  async fn get_plan(&self, id: Uuid) -> Result<Option<MaintenancePlan>, Infallible> {
    Ok(self.lock().plans.iter().find(|p| p.plan_id == id).cloned())
  }

  async fn list_plans<'a>(
    &'a self,
    vehicle: Option<&'a str>,
  ) -> Result<Vec<MaintenancePlan>, Infallible> {
    Ok(
      self
        .lock()
        .plans
        .iter()
        .filter(|p| vehicle.is_none_or(|v| p.vehicle_license_plate == v))
        .cloned()
        .collect(),
    )
  }

  async fn update_plan(
    &self,
    mut plan: MaintenancePlan,
  ) -> Result<Option<MaintenancePlan>, Infallible> {
    let mut inner = self.lock();
    let Some(slot) = inner.plans.iter_mut().find(|p| p.plan_id == plan.plan_id) else {
      return Ok(None);
    };
    plan.updated_at = Utc::now();
    *slot = plan.clone();
    Ok(Some(plan))
  }

  async fn delete_plan(&self, id: Uuid) -> Result<bool, Infallible> {
    let mut inner = self.lock();
    let before = inner.plans.len();
    inner.plans.retain(|p| p.plan_id != id);
    inner.annual.retain(|k, _| k.maintenance_plan_id != id);
    Ok(inner.plans.len() != before)
  }

  async fn upsert_vehicle(&self, vehicle: Vehicle) -> Result<Vehicle, Infallible> {
    let mut inner = self.lock();
    inner.vehicles.retain(|v| v.license_plate != vehicle.license_plate);
    inner.vehicles.push(vehicle.clone());
    Ok(vehicle)
  }

  async fn list_vehicles(&self) -> Result<Vec<Vehicle>, Infallible> {
    Ok(self.lock().vehicles.clone())
  }

  async fn add_repair(&self, input: NewRepair) -> Result<RepairRecord, Infallible> {
    let record = input.into_record(Uuid::new_v4(), Utc::now());
    self.lock().repairs.push(record.clone());
    Ok(record)
  }

  async fn list_repairs<'a>(&'a self, plate: &'a str) -> Result<Vec<RepairRecord>, Infallible> {
    Ok(
      self
        .lock()
        .repairs
        .iter()
        .filter(|r| r.vehicle_license_plate == plate)
        .cloned()
        .collect(),
    )
  }

  async fn get_annual<'a>(
    &'a self,
    key: &'a AnnualPlanKey,
  ) -> Result<Option<AnnualPmPlan>, Infallible> {
    Ok(self.lock().annual.get(key).cloned())
  }

  async fn put_annual(&self, record: AnnualPmPlan) -> Result<(), Infallible> {
    self.lock().annual.insert(record.key(), record);
    Ok(())
  }

  async fn list_annual(&self, year: i32) -> Result<Vec<AnnualPmPlan>, Infallible> {
    Ok(self.lock().annual.values().filter(|a| a.year == year).cloned().collect())
  }

  async fn append_history(&self, input: NewPmHistory) -> Result<PmHistory, Infallible> {
    let entry = input.into_history(Uuid::new_v4(), Utc::now());
    self.lock().history.push(entry.clone());
    Ok(entry)
  }

  async fn list_history<'a>(
    &'a self,
    query: &'a HistoryQuery,
  ) -> Result<Vec<PmHistory>, Infallible> {
    Ok(
      self
        .lock()
        .history
        .iter()
        .filter(|h| query.plan_id.is_none_or(|id| h.maintenance_plan_id == id))
        .filter(|h| {
          query
            .vehicle
            .as_deref()
            .is_none_or(|v| h.vehicle_license_plate == v)
        })
        .cloned()
        .collect(),
    )
  }

  async fn delete_history(&self, id: Uuid) -> Result<bool, Infallible> {
    let mut inner = self.lock();
    let before = inner.history.len();
    inner.history.retain(|h| h.history_id != id);
    Ok(inner.history.len() != before)
  }
}

// ─── Fixtures ────────────────────────────────────────────────────────────────

const PLATE: &str = "1ขก-2290";

fn date(y: i32, m: u32, d: u32) -> NaiveDate { NaiveDate::from_ymd_opt(y, m, d).unwrap() }

fn now(y: i32, m: u32, d: u32) -> NaiveDateTime { date(y, m, d).and_hms_opt(8, 0, 0).unwrap() }

fn m(index: u8) -> MonthIndex { MonthIndex::new(index).unwrap() }

fn new_plan(plate: &str) -> NewPlan {
  NewPlan {
    vehicle_license_plate: plate.into(),
    plan_name:             "Oil change".into(),
    last_service_date:     date(2024, 1, 15),
    frequency_value:       3,
    frequency_unit:        FrequencyUnit::Months,
    last_service_mileage:  40_000,
    mileage_frequency:     5_000,
  }
}

fn log(service_date: Option<NaiveDate>, mileage: Option<i64>) -> ServiceLog {
  ServiceLog {
    service_date,
    mileage,
    technician_id: Some("  tech-7 ".into()),
    notes: Some("filter replaced".into()),
  }
}

// ─── Plans ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_rejects_invalid_plan_before_writing() {
  let store = MemStore::default();
  let mut input = new_plan(PLATE);
  input.frequency_value = 0;

  let err = create_plan(&store, input).await.unwrap_err();
  assert!(err.is_validation());
  assert!(store.lock().plans.is_empty());
}

#[tokio::test]
async fn update_and_delete_report_missing_plans() {
  let store = MemStore::default();
  let err = update_plan(&store, Uuid::new_v4(), new_plan(PLATE)).await.unwrap_err();
  assert!(matches!(err, ServiceError::NotFound { .. }));
  let err = delete_plan(&store, Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(err, ServiceError::NotFound { .. }));
}

#[tokio::test]
async fn update_replaces_editable_fields() {
  let store = MemStore::default();
  let plan = create_plan(&store, new_plan(PLATE)).await.unwrap();

  let mut input = new_plan(PLATE);
  input.plan_name = "Oil and filter".into();
  input.frequency_unit = FrequencyUnit::Weeks;
  let updated = update_plan(&store, plan.plan_id, input).await.unwrap();

  assert_eq!(updated.plan_id, plan.plan_id);
  assert_eq!(updated.plan_name, "Oil and filter");
  assert_eq!(updated.frequency_unit, FrequencyUnit::Weeks);
  assert_eq!(updated.created_at, plan.created_at);
}

// ─── Status ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn enriched_plans_use_each_vehicles_own_repairs() {
  let store = MemStore::default();
  create_plan(&store, new_plan(PLATE)).await.unwrap();
  create_plan(&store, new_plan("OTHER-1")).await.unwrap();
  store
    .add_repair(NewRepair {
      vehicle_license_plate: PLATE.into(),
      repair_date:           None,
      mileage:               Some(44_200),
      description:           "brake pads".into(),
    })
    .await
    .unwrap();

  let thresholds = StatusThresholds::default();
  let plans = enriched_plans(&store, None, now(2024, 2, 1), &thresholds)
    .await
    .unwrap();
  assert_eq!(plans.len(), 2);

  let ours = plans
    .iter()
    .find(|p| p.plan.vehicle_license_plate == PLATE)
    .unwrap();
  assert_eq!(ours.current_mileage, Some(44_200));
  assert_eq!(ours.km_until_next_service, Some(800));
  assert_eq!(ours.status, PlanStatus::Due);

  let theirs = plans
    .iter()
    .find(|p| p.plan.vehicle_license_plate == "OTHER-1")
    .unwrap();
  assert_eq!(theirs.current_mileage, None);
  assert_eq!(theirs.status, PlanStatus::Ok);

  let only_ours = enriched_plans(&store, Some(PLATE), now(2024, 2, 1), &thresholds)
    .await
    .unwrap();
  assert_eq!(only_ours.len(), 1);
}

#[tokio::test]
async fn dashboard_counts_statuses() {
  let store = MemStore::default();
  create_plan(&store, new_plan(PLATE)).await.unwrap();
  let mut late = new_plan("LATE-9");
  late.last_service_date = date(2023, 1, 1);
  create_plan(&store, late).await.unwrap();

  let summary = dashboard(&store, now(2024, 2, 1), &StatusThresholds::default())
    .await
    .unwrap();
  assert_eq!(summary.total, 2);
  assert_eq!(summary.ok, 1);
  assert_eq!(summary.overdue, 1);
}

#[tokio::test]
async fn enriched_plan_missing_is_not_found() {
  let store = MemStore::default();
  let err = enriched_plan(&store, Uuid::new_v4(), now(2024, 1, 1), &StatusThresholds::default())
    .await
    .unwrap_err();
  assert!(matches!(err, ServiceError::NotFound { kind: "maintenance plan", .. }));
}

// ─── Grid edits ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn completing_a_month_stores_override_and_history() {
  let store = MemStore::default();
  let plan = create_plan(&store, new_plan(PLATE)).await.unwrap();

  let result = edit_month(
    &store,
    plan.plan_id,
    2024,
    m(3),
    MonthStatus::Completed,
    Some(log(Some(date(2024, 4, 12)), Some(45_100))),
  )
  .await
  .unwrap();

  assert_eq!(result.grid.cell(m(3)).effective, MonthStatus::Completed);
  assert_eq!(result.grid.cell(m(6)).effective, MonthStatus::Planned);
  let history = result.history.unwrap();
  assert_eq!(history.technician_id.as_deref(), Some("tech-7"));
  assert_eq!(history.target_service_date, Some(date(2024, 4, 15)));
  assert_eq!(history.target_mileage, Some(45_000));

  let inner = store.lock();
  assert_eq!(inner.history.len(), 1);
  let record = inner.annual.get(&plan.annual_key(2024)).unwrap();
  assert_eq!(record.manual(m(3)), Some(MonthStatus::Completed));
  // Grid edits never move the plan's anchors.
  assert_eq!(inner.plans[0].last_service_date, date(2024, 1, 15));
}

#[tokio::test]
async fn rejected_completion_writes_nothing() {
  let store = MemStore::default();
  let plan = create_plan(&store, new_plan(PLATE)).await.unwrap();

  let err = edit_month(
    &store,
    plan.plan_id,
    2024,
    m(5),
    MonthStatus::Completed,
    Some(log(None, Some(45_000))),
  )
  .await
  .unwrap_err();

  assert!(err.is_validation());
  let inner = store.lock();
  assert!(inner.annual.is_empty());
  assert!(inner.history.is_empty());
}

#[tokio::test]
async fn clearing_a_calculated_month_suppresses_it() {
  let store = MemStore::default();
  let plan = create_plan(&store, new_plan(PLATE)).await.unwrap();

  let result = edit_month(&store, plan.plan_id, 2024, m(6), MonthStatus::None, None)
    .await
    .unwrap();
  assert_eq!(result.grid.cell(m(6)).effective, MonthStatus::None);
  assert_eq!(result.grid.cell(m(6)).manual, Some(MonthStatus::None));
  assert!(result.history.is_none());

  let grid = annual_grid(&store, plan.plan_id, 2024).await.unwrap();
  assert_eq!(grid, result.grid);
}

#[tokio::test]
async fn clearing_a_blank_month_without_record_writes_nothing() {
  let store = MemStore::default();
  let plan = create_plan(&store, new_plan(PLATE)).await.unwrap();

  let result = edit_month(&store, plan.plan_id, 2024, m(1), MonthStatus::None, None)
    .await
    .unwrap();
  assert_eq!(result.grid.cell(m(1)).manual, None);
  assert!(store.lock().annual.is_empty());
}

#[tokio::test]
async fn annual_grids_join_overrides_by_key() {
  let store = MemStore::default();
  let a = create_plan(&store, new_plan(PLATE)).await.unwrap();
  let b = create_plan(&store, new_plan("OTHER-1")).await.unwrap();
  edit_month(&store, a.plan_id, 2024, m(3), MonthStatus::None, None)
    .await
    .unwrap();

  let grids = annual_grids(&store, 2024, None).await.unwrap();
  assert_eq!(grids.len(), 2);
  let ga = grids.iter().find(|g| g.key.maintenance_plan_id == a.plan_id).unwrap();
  let gb = grids.iter().find(|g| g.key.maintenance_plan_id == b.plan_id).unwrap();
  assert_eq!(ga.cell(m(3)).effective, MonthStatus::None);
  assert_eq!(gb.cell(m(3)).effective, MonthStatus::Planned);

  // Overrides for another year do not leak.
  let next_year = annual_grids(&store, 2025, Some(PLATE)).await.unwrap();
  assert_eq!(next_year.len(), 1);
  assert!(next_year[0].months.iter().all(|c| c.manual.is_none()));
}

// ─── Service log ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn logging_service_advances_anchors() {
  let store = MemStore::default();
  let plan = create_plan(&store, new_plan(PLATE)).await.unwrap();

  let logged = log_service(&store, plan.plan_id, log(Some(date(2024, 4, 20)), Some(45_300)))
    .await
    .unwrap();
  assert_eq!(logged.plan.last_service_date, date(2024, 4, 20));
  assert_eq!(logged.plan.last_service_mileage, 45_300);
  assert_eq!(logged.history.target_service_date, Some(date(2024, 4, 15)));

  let stored = store.get_plan(plan.plan_id).await.unwrap().unwrap();
  assert_eq!(stored.next_service_date(), Some(date(2024, 7, 20)));
  assert_eq!(stored.next_service_mileage(), 50_300);
}

#[tokio::test]
async fn logging_an_older_service_keeps_anchors() {
  let store = MemStore::default();
  let plan = create_plan(&store, new_plan(PLATE)).await.unwrap();

  let logged = log_service(&store, plan.plan_id, log(Some(date(2023, 12, 1)), Some(39_000)))
    .await
    .unwrap();
  assert_eq!(logged.plan.last_service_date, date(2024, 1, 15));
  assert_eq!(logged.plan.last_service_mileage, 40_000);
  assert_eq!(store.lock().history.len(), 1);
}

#[tokio::test]
async fn logging_service_requires_mileage() {
  let store = MemStore::default();
  let plan = create_plan(&store, new_plan(PLATE)).await.unwrap();

  let err = log_service(&store, plan.plan_id, log(Some(date(2024, 4, 20)), None))
    .await
    .unwrap_err();
  assert!(matches!(err, ServiceError::Core(Error::MissingServiceMileage(_))));
  assert!(store.lock().history.is_empty());
}

#[tokio::test]
async fn logging_service_on_degenerate_plan_is_rejected_before_writing() {
  let store = MemStore::default();
  let plan = create_plan(&store, new_plan(PLATE)).await.unwrap();
  store.lock().plans[0].frequency_value = 0;

  let err = log_service(&store, plan.plan_id, log(Some(date(2024, 6, 1)), Some(45_300)))
    .await
    .unwrap_err();
  assert!(matches!(err, ServiceError::Core(Error::InvalidFrequency(0))));
  assert!(err.is_validation());

  let inner = store.lock();
  assert!(inner.history.is_empty());
  assert_eq!(inner.plans[0].last_service_date, plan.last_service_date);
}

#[tokio::test]
async fn deleting_history_twice_is_not_found() {
  let store = MemStore::default();
  let plan = create_plan(&store, new_plan(PLATE)).await.unwrap();
  let logged = log_service(&store, plan.plan_id, log(Some(date(2024, 2, 1)), Some(41_000)))
    .await
    .unwrap();

  delete_history(&store, logged.history.history_id).await.unwrap();
  let err = delete_history(&store, logged.history.history_id).await.unwrap_err();
  assert!(matches!(err, ServiceError::NotFound { kind: "history entry", .. }));
}
