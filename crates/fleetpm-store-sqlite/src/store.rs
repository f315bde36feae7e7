//! [`SqliteStore`] — the SQLite implementation of [`PmStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use tracing::debug;
use uuid::Uuid;

use fleetpm_core::{
  annual::{AnnualPlanKey, AnnualPmPlan},
  fleet::{NewRepair, RepairRecord, Vehicle},
  history::{HistoryQuery, NewPmHistory, PmHistory},
  plan::{MaintenancePlan, NewPlan},
  store::PmStore,
};

use crate::{
  encode::{
    HISTORY_COLUMNS, PLAN_COLUMNS, RawAnnual, RawHistory, RawPlan, RawRepair,
    encode_date, encode_dt, encode_months, encode_uuid, vehicle_from_row,
  },
  schema::SCHEMA,
  Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A fleet PM store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Write every column of `plan` over the row with the same id. Returns the
  /// number of rows changed.
  async fn write_plan(&self, plan: &MaintenancePlan) -> Result<usize> {
    let id_str        = encode_uuid(plan.plan_id);
    let plate         = plan.vehicle_license_plate.clone();
    let name          = plan.plan_name.clone();
    let last_date_str = encode_date(plan.last_service_date);
    let freq_value    = plan.frequency_value;
    let freq_unit     = plan.frequency_unit.as_str();
    let last_mileage  = plan.last_service_mileage;
    let mileage_freq  = plan.mileage_frequency;
    let updated_str   = encode_dt(plan.updated_at);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE maintenance_plans SET
             vehicle_license_plate = ?2, plan_name = ?3, last_service_date = ?4,
             frequency_value = ?5, frequency_unit = ?6,
             last_service_mileage = ?7, mileage_frequency = ?8, updated_at = ?9
           WHERE plan_id = ?1",
          rusqlite::params![
            id_str,
            plate,
            name,
            last_date_str,
            freq_value,
            freq_unit,
            last_mileage,
            mileage_freq,
            updated_str,
          ],
        )?)
      })
      .await?;
    Ok(changed)
  }
}

// ─── PmStore impl ────────────────────────────────────────────────────────────

impl PmStore for SqliteStore {
  type Error = crate::Error;

  // ── Plans ─────────────────────────────────────────────────────────────────

  async fn add_plan(&self, input: NewPlan) -> Result<MaintenancePlan> {
    input.validate()?;
    let plan = input.into_plan(Uuid::new_v4(), Utc::now());

    let id_str        = encode_uuid(plan.plan_id);
    let plate         = plan.vehicle_license_plate.clone();
    let name          = plan.plan_name.clone();
    let last_date_str = encode_date(plan.last_service_date);
    let freq_value    = plan.frequency_value;
    let freq_unit     = plan.frequency_unit.as_str();
    let last_mileage  = plan.last_service_mileage;
    let mileage_freq  = plan.mileage_frequency;
    let created_str   = encode_dt(plan.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO maintenance_plans (
             plan_id, vehicle_license_plate, plan_name, last_service_date,
             frequency_value, frequency_unit, last_service_mileage,
             mileage_frequency, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
          rusqlite::params![
            id_str,
            plate,
            name,
            last_date_str,
            freq_value,
            freq_unit,
            last_mileage,
            mileage_freq,
            created_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(plan)
  }

  async fn get_plan(&self, id: Uuid) -> Result<Option<MaintenancePlan>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawPlan> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {PLAN_COLUMNS} FROM maintenance_plans WHERE plan_id = ?1"),
            rusqlite::params![id_str],
            RawPlan::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawPlan::into_plan).transpose()
  }

  async fn list_plans(&self, vehicle: Option<&str>) -> Result<Vec<MaintenancePlan>> {
    let plate = vehicle.map(str::to_owned);

    let raws: Vec<RawPlan> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {PLAN_COLUMNS} FROM maintenance_plans
           WHERE ?1 IS NULL OR vehicle_license_plate = ?1
           ORDER BY vehicle_license_plate, plan_name, created_at"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![plate], RawPlan::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPlan::into_plan).collect()
  }

  async fn update_plan(&self, mut plan: MaintenancePlan) -> Result<Option<MaintenancePlan>> {
    plan.validate()?;
    plan.updated_at = Utc::now();
    if self.write_plan(&plan).await? == 0 {
      return Ok(None);
    }
    Ok(Some(plan))
  }

  async fn delete_plan(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);

    let (plans, overrides) = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let overrides = tx.execute(
          "DELETE FROM annual_pm_plans WHERE maintenance_plan_id = ?1",
          rusqlite::params![id_str],
        )?;
        let plans = tx.execute(
          "DELETE FROM maintenance_plans WHERE plan_id = ?1",
          rusqlite::params![id_str],
        )?;
        tx.commit()?;
        Ok((plans, overrides))
      })
      .await?;

    debug!(plan_id = %id, plans, overrides, "deleted plan rows");
    Ok(plans > 0)
  }

  // ── Vehicles ──────────────────────────────────────────────────────────────

  async fn upsert_vehicle(&self, vehicle: Vehicle) -> Result<Vehicle> {
    let v = vehicle.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO vehicles (license_plate, make, model, description)
           VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT (license_plate) DO UPDATE SET
             make = excluded.make,
             model = excluded.model,
             description = excluded.description",
          rusqlite::params![v.license_plate, v.make, v.model, v.description],
        )?;
        Ok(())
      })
      .await?;

    Ok(vehicle)
  }

  async fn list_vehicles(&self) -> Result<Vec<Vehicle>> {
    let vehicles = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT license_plate, make, model, description FROM vehicles
           ORDER BY license_plate",
        )?;
        let rows = stmt
          .query_map([], vehicle_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(vehicles)
  }

  // ── Repairs ───────────────────────────────────────────────────────────────

  async fn add_repair(&self, input: NewRepair) -> Result<RepairRecord> {
    input.validate()?;
    let record = input.into_record(Uuid::new_v4(), Utc::now());

    let id_str      = encode_uuid(record.repair_id);
    let plate       = record.vehicle_license_plate.clone();
    let date_str    = record.repair_date.map(encode_date);
    let mileage     = record.mileage;
    let description = record.description.clone();
    let created_str = encode_dt(record.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO repair_records (
             repair_id, vehicle_license_plate, repair_date, mileage,
             description, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, plate, date_str, mileage, description, created_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(record)
  }

  async fn list_repairs(&self, plate: &str) -> Result<Vec<RepairRecord>> {
    let plate = plate.to_owned();

    let raws: Vec<RawRepair> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT repair_id, vehicle_license_plate, repair_date, mileage,
                  description, created_at
           FROM repair_records
           WHERE vehicle_license_plate = ?1
           ORDER BY created_at, repair_id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![plate], RawRepair::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRepair::into_record).collect()
  }

  // ── Annual overrides ──────────────────────────────────────────────────────

  async fn get_annual(&self, key: &AnnualPlanKey) -> Result<Option<AnnualPmPlan>> {
    let plate   = key.vehicle_license_plate.clone();
    let plan_id = encode_uuid(key.maintenance_plan_id);
    let year    = key.year;

    let raw: Option<RawAnnual> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT vehicle_license_plate, maintenance_plan_id, year, months_json
             FROM annual_pm_plans
             WHERE vehicle_license_plate = ?1 AND maintenance_plan_id = ?2 AND year = ?3",
            rusqlite::params![plate, plan_id, year],
            RawAnnual::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawAnnual::into_annual).transpose()
  }

  async fn put_annual(&self, record: AnnualPmPlan) -> Result<()> {
    let months_json = encode_months(&record.months)?;
    let plan_id     = encode_uuid(record.maintenance_plan_id);
    let plate       = record.vehicle_license_plate;
    let year        = record.year;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO annual_pm_plans (
             vehicle_license_plate, maintenance_plan_id, year, months_json
           ) VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT (vehicle_license_plate, maintenance_plan_id, year)
           DO UPDATE SET months_json = excluded.months_json",
          rusqlite::params![plate, plan_id, year, months_json],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn list_annual(&self, year: i32) -> Result<Vec<AnnualPmPlan>> {
    let raws: Vec<RawAnnual> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT vehicle_license_plate, maintenance_plan_id, year, months_json
           FROM annual_pm_plans
           WHERE year = ?1
           ORDER BY vehicle_license_plate, maintenance_plan_id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![year], RawAnnual::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAnnual::into_annual).collect()
  }

  // ── History ───────────────────────────────────────────────────────────────

  async fn append_history(&self, input: NewPmHistory) -> Result<PmHistory> {
    let entry = input.into_history(Uuid::new_v4(), Utc::now());

    let id_str          = encode_uuid(entry.history_id);
    let plan_id_str     = encode_uuid(entry.maintenance_plan_id);
    let plate           = entry.vehicle_license_plate.clone();
    let plan_name       = entry.plan_name.clone();
    let service_str     = encode_date(entry.service_date);
    let mileage         = entry.mileage;
    let technician_id   = entry.technician_id.clone();
    let target_date_str = entry.target_service_date.map(encode_date);
    let target_mileage  = entry.target_mileage;
    let notes           = entry.notes.clone();
    let recorded_str    = encode_dt(entry.recorded_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO pm_history (
             history_id, maintenance_plan_id, vehicle_license_plate, plan_name,
             service_date, mileage, technician_id, target_service_date,
             target_mileage, notes, recorded_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
          rusqlite::params![
            id_str,
            plan_id_str,
            plate,
            plan_name,
            service_str,
            mileage,
            technician_id,
            target_date_str,
            target_mileage,
            notes,
            recorded_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(entry)
  }

  async fn list_history(&self, query: &HistoryQuery) -> Result<Vec<PmHistory>> {
    let plan_id = query.plan_id.map(encode_uuid);
    let plate   = query.vehicle.clone();

    let raws: Vec<RawHistory> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {HISTORY_COLUMNS} FROM pm_history
           WHERE (?1 IS NULL OR maintenance_plan_id = ?1)
             AND (?2 IS NULL OR vehicle_license_plate = ?2)
           ORDER BY service_date DESC, recorded_at DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![plan_id, plate], RawHistory::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawHistory::into_history).collect()
  }

  async fn delete_history(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);

    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM pm_history WHERE history_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;
    Ok(removed > 0)
  }
}
