//! The `PmStore` trait: persistence for plans, overrides, history and the
//! fleet records the engine reads.
//!
//! The trait is implemented by storage backends (e.g. `fleetpm-store-sqlite`).
//! The service layer and the HTTP API depend on this abstraction, not on any
//! concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  annual::{AnnualPlanKey, AnnualPmPlan},
  fleet::{NewRepair, RepairRecord, Vehicle},
  history::{HistoryQuery, NewPmHistory, PmHistory},
  plan::{MaintenancePlan, NewPlan},
};

/// Abstraction over a fleet PM store backend.
///
/// Service history is append-only apart from operator deletion. Override
/// records are replaced whole; the caller performs the read-modify-write.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait PmStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Plans ─────────────────────────────────────────────────────────────

  /// Validate and persist a new plan. Identity and timestamps are assigned
  /// by the store.
  fn add_plan(
    &self,
    input: NewPlan,
  ) -> impl Future<Output = Result<MaintenancePlan, Self::Error>> + Send + '_;

  /// Retrieve a plan by UUID. Returns `None` if not found.
  fn get_plan(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<MaintenancePlan>, Self::Error>> + Send + '_;

  /// List plans, optionally for a single vehicle, ordered by plate then name.
  fn list_plans<'a>(
    &'a self,
    vehicle: Option<&'a str>,
  ) -> impl Future<Output = Result<Vec<MaintenancePlan>, Self::Error>> + Send + 'a;

  /// Overwrite a stored plan. `updated_at` is refreshed by the store. Returns
  /// `None` if the plan does not exist.
  fn update_plan(
    &self,
    plan: MaintenancePlan,
  ) -> impl Future<Output = Result<Option<MaintenancePlan>, Self::Error>> + Send + '_;

  /// Delete a plan together with its override records. History entries are
  /// kept. Returns whether a plan was removed.
  fn delete_plan(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Vehicles ──────────────────────────────────────────────────────────

  fn upsert_vehicle(
    &self,
    vehicle: Vehicle,
  ) -> impl Future<Output = Result<Vehicle, Self::Error>> + Send + '_;

  fn list_vehicles(
    &self,
  ) -> impl Future<Output = Result<Vec<Vehicle>, Self::Error>> + Send + '_;

  // ── Repairs ───────────────────────────────────────────────────────────

  /// Persist a repair record. `created_at` is set by the store.
  fn add_repair(
    &self,
    input: NewRepair,
  ) -> impl Future<Output = Result<RepairRecord, Self::Error>> + Send + '_;

  /// All repair records for `plate`, oldest first.
  fn list_repairs<'a>(
    &'a self,
    plate: &'a str,
  ) -> impl Future<Output = Result<Vec<RepairRecord>, Self::Error>> + Send + 'a;

  // ── Annual overrides ──────────────────────────────────────────────────

  fn get_annual<'a>(
    &'a self,
    key: &'a AnnualPlanKey,
  ) -> impl Future<Output = Result<Option<AnnualPmPlan>, Self::Error>> + Send + 'a;

  /// Insert or replace the record for `record.key()`.
  fn put_annual(
    &self,
    record: AnnualPmPlan,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Every override record for `year`.
  fn list_annual(
    &self,
    year: i32,
  ) -> impl Future<Output = Result<Vec<AnnualPmPlan>, Self::Error>> + Send + '_;

  // ── History ───────────────────────────────────────────────────────────

  /// Append a service event. `recorded_at` is set by the store.
  fn append_history(
    &self,
    input: NewPmHistory,
  ) -> impl Future<Output = Result<PmHistory, Self::Error>> + Send + '_;

  /// History entries matching `query`, most recent service first.
  fn list_history<'a>(
    &'a self,
    query: &'a HistoryQuery,
  ) -> impl Future<Output = Result<Vec<PmHistory>, Self::Error>> + Send + 'a;

  /// Returns whether an entry was removed.
  fn delete_history(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}
