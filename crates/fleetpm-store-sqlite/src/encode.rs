//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 UTC strings so that they sort
//! lexically. Calendar dates are `YYYY-MM-DD`. Override months are compact
//! JSON. UUIDs are stored as hyphenated lowercase strings.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use fleetpm_core::{
  annual::{AnnualPmPlan, MonthStatus},
  fleet::{RepairRecord, Vehicle},
  history::PmHistory,
  month::MonthIndex,
  plan::{FrequencyUnit, MaintenancePlan},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Override months ─────────────────────────────────────────────────────────

pub fn encode_months(months: &BTreeMap<MonthIndex, MonthStatus>) -> Result<String> {
  Ok(serde_json::to_string(months)?)
}

pub fn decode_months(s: &str) -> Result<BTreeMap<MonthIndex, MonthStatus>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list shared by every `maintenance_plans` query, in [`RawPlan`]
/// order.
pub const PLAN_COLUMNS: &str = "plan_id, vehicle_license_plate, plan_name, \
   last_service_date, frequency_value, frequency_unit, last_service_mileage, \
   mileage_frequency, created_at, updated_at";

/// Raw values read directly from a `maintenance_plans` row.
pub struct RawPlan {
  pub plan_id:               String,
  pub vehicle_license_plate: String,
  pub plan_name:             String,
  pub last_service_date:     String,
  pub frequency_value:       i32,
  pub frequency_unit:        String,
  pub last_service_mileage:  i64,
  pub mileage_frequency:     i64,
  pub created_at:            String,
  pub updated_at:            String,
}

impl RawPlan {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      plan_id:               row.get(0)?,
      vehicle_license_plate: row.get(1)?,
      plan_name:             row.get(2)?,
      last_service_date:     row.get(3)?,
      frequency_value:       row.get(4)?,
      frequency_unit:        row.get(5)?,
      last_service_mileage:  row.get(6)?,
      mileage_frequency:     row.get(7)?,
      created_at:            row.get(8)?,
      updated_at:            row.get(9)?,
    })
  }

  /// Stored plans are decoded without validation; a degenerate frequency is
  /// representable and handled by the engine.
  pub fn into_plan(self) -> Result<MaintenancePlan> {
    Ok(MaintenancePlan {
      plan_id:               decode_uuid(&self.plan_id)?,
      vehicle_license_plate: self.vehicle_license_plate,
      plan_name:             self.plan_name,
      last_service_date:     decode_date(&self.last_service_date)?,
      frequency_value:       self.frequency_value,
      frequency_unit:        self.frequency_unit.parse::<FrequencyUnit>()?,
      last_service_mileage:  self.last_service_mileage,
      mileage_frequency:     self.mileage_frequency,
      created_at:            decode_dt(&self.created_at)?,
      updated_at:            decode_dt(&self.updated_at)?,
    })
  }
}

pub fn vehicle_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Vehicle> {
  Ok(Vehicle {
    license_plate: row.get(0)?,
    make:          row.get(1)?,
    model:         row.get(2)?,
    description:   row.get(3)?,
  })
}

/// Raw values read directly from a `repair_records` row.
pub struct RawRepair {
  pub repair_id:             String,
  pub vehicle_license_plate: String,
  pub repair_date:           Option<String>,
  pub mileage:               Option<i64>,
  pub description:           String,
  pub created_at:            String,
}

impl RawRepair {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      repair_id:             row.get(0)?,
      vehicle_license_plate: row.get(1)?,
      repair_date:           row.get(2)?,
      mileage:               row.get(3)?,
      description:           row.get(4)?,
      created_at:            row.get(5)?,
    })
  }

  pub fn into_record(self) -> Result<RepairRecord> {
    Ok(RepairRecord {
      repair_id:             decode_uuid(&self.repair_id)?,
      vehicle_license_plate: self.vehicle_license_plate,
      repair_date:           self.repair_date.as_deref().map(decode_date).transpose()?,
      mileage:               self.mileage,
      description:           self.description,
      created_at:            decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read directly from an `annual_pm_plans` row.
pub struct RawAnnual {
  pub vehicle_license_plate: String,
  pub maintenance_plan_id:   String,
  pub year:                  i32,
  pub months_json:           String,
}

impl RawAnnual {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      vehicle_license_plate: row.get(0)?,
      maintenance_plan_id:   row.get(1)?,
      year:                  row.get(2)?,
      months_json:           row.get(3)?,
    })
  }

  pub fn into_annual(self) -> Result<AnnualPmPlan> {
    Ok(AnnualPmPlan {
      vehicle_license_plate: self.vehicle_license_plate,
      maintenance_plan_id:   decode_uuid(&self.maintenance_plan_id)?,
      year:                  self.year,
      months:                decode_months(&self.months_json)?,
    })
  }
}

/// Column list shared by every `pm_history` query, in [`RawHistory`] order.
pub const HISTORY_COLUMNS: &str = "history_id, maintenance_plan_id, \
   vehicle_license_plate, plan_name, service_date, mileage, technician_id, \
   target_service_date, target_mileage, notes, recorded_at";

/// Raw values read directly from a `pm_history` row.
pub struct RawHistory {
  pub history_id:            String,
  pub maintenance_plan_id:   String,
  pub vehicle_license_plate: String,
  pub plan_name:             String,
  pub service_date:          String,
  pub mileage:               i64,
  pub technician_id:         Option<String>,
  pub target_service_date:   Option<String>,
  pub target_mileage:        Option<i64>,
  pub notes:                 String,
  pub recorded_at:           String,
}

impl RawHistory {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      history_id:            row.get(0)?,
      maintenance_plan_id:   row.get(1)?,
      vehicle_license_plate: row.get(2)?,
      plan_name:             row.get(3)?,
      service_date:          row.get(4)?,
      mileage:               row.get(5)?,
      technician_id:         row.get(6)?,
      target_service_date:   row.get(7)?,
      target_mileage:        row.get(8)?,
      notes:                 row.get(9)?,
      recorded_at:           row.get(10)?,
    })
  }

  pub fn into_history(self) -> Result<PmHistory> {
    Ok(PmHistory {
      history_id:            decode_uuid(&self.history_id)?,
      maintenance_plan_id:   decode_uuid(&self.maintenance_plan_id)?,
      vehicle_license_plate: self.vehicle_license_plate,
      plan_name:             self.plan_name,
      service_date:          decode_date(&self.service_date)?,
      mileage:               self.mileage,
      technician_id:         self.technician_id,
      target_service_date:   self
        .target_service_date
        .as_deref()
        .map(decode_date)
        .transpose()?,
      target_mileage:        self.target_mileage,
      notes:                 self.notes,
      recorded_at:           decode_dt(&self.recorded_at)?,
    })
  }
}
