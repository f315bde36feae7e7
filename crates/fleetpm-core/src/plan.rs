//! Maintenance plans — one recurring obligation for one vehicle.
//!
//! A plan carries two independent recurrence rules: a calendar rule
//! (`frequency_value` × `frequency_unit`) anchored on `last_service_date`, and
//! a distance rule (`mileage_frequency`) anchored on `last_service_mileage`.

use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, annual::AnnualPlanKey, recurrence};

// ─── Frequency unit ──────────────────────────────────────────────────────────

/// The calendar unit of a plan's time rule. Closed set; anything else is a
/// configuration error.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum FrequencyUnit {
  Days,
  Weeks,
  Months,
}

impl FrequencyUnit {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Days => "days",
      Self::Weeks => "weeks",
      Self::Months => "months",
    }
  }
}

impl fmt::Display for FrequencyUnit {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for FrequencyUnit {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "days" => Ok(Self::Days),
      "weeks" => Ok(Self::Weeks),
      "months" => Ok(Self::Months),
      _ => Err(Error::UnknownFrequencyUnit(s.to_owned())),
    }
  }
}

// ─── Plan ────────────────────────────────────────────────────────────────────

/// A persisted maintenance plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenancePlan {
  pub plan_id:               Uuid,
  /// Natural key of the vehicle. Several plans may share a plate.
  pub vehicle_license_plate: String,
  pub plan_name:             String,
  /// Time anchor.
  pub last_service_date:     NaiveDate,
  /// Signed so that degenerate rules can still be loaded and represented.
  pub frequency_value:       i32,
  pub frequency_unit:        FrequencyUnit,
  /// Distance anchor (odometer reading at last service).
  pub last_service_mileage:  i64,
  pub mileage_frequency:     i64,
  pub created_at:            DateTime<Utc>,
  pub updated_at:            DateTime<Utc>,
}

impl MaintenancePlan {
  /// Next due date, or `None` when the time rule is degenerate.
  pub fn next_service_date(&self) -> Option<NaiveDate> {
    recurrence::next_occurrence(
      self.last_service_date,
      self.frequency_value,
      self.frequency_unit,
    )
  }

  pub fn next_service_mileage(&self) -> i64 {
    recurrence::next_mileage(self.last_service_mileage, self.mileage_frequency)
  }

  /// The override-record key for this plan in `year`.
  pub fn annual_key(&self, year: i32) -> AnnualPlanKey {
    AnnualPlanKey {
      vehicle_license_plate: self.vehicle_license_plate.clone(),
      maintenance_plan_id:   self.plan_id,
      year,
    }
  }

  /// Move the anchors forward after a recorded service. Each anchor only
  /// moves if the new value is later/higher than the current one, so logging
  /// an old service never rewinds the plan. Returns whether anything changed.
  pub fn advance_anchor(&mut self, service_date: NaiveDate, mileage: i64) -> bool {
    let mut changed = false;
    if service_date > self.last_service_date {
      self.last_service_date = service_date;
      changed = true;
    }
    if mileage > self.last_service_mileage {
      self.last_service_mileage = mileage;
      changed = true;
    }
    changed
  }

  /// Replace every user-editable field with those from `input`.
  pub fn apply(&mut self, input: NewPlan) {
    self.vehicle_license_plate = input.vehicle_license_plate;
    self.plan_name = input.plan_name;
    self.last_service_date = input.last_service_date;
    self.frequency_value = input.frequency_value;
    self.frequency_unit = input.frequency_unit;
    self.last_service_mileage = input.last_service_mileage;
    self.mileage_frequency = input.mileage_frequency;
  }

  /// Re-run plan-editor validation against a stored plan.
  pub fn validate(&self) -> Result<()> {
    validate_fields(
      &self.vehicle_license_plate,
      &self.plan_name,
      self.frequency_value,
      self.mileage_frequency,
    )
  }
}

// ─── NewPlan ─────────────────────────────────────────────────────────────────

/// Input to [`crate::store::PmStore::add_plan`]. Identity and timestamps are
/// assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPlan {
  pub vehicle_license_plate: String,
  pub plan_name:             String,
  pub last_service_date:     NaiveDate,
  pub frequency_value:       i32,
  pub frequency_unit:        FrequencyUnit,
  pub last_service_mileage:  i64,
  pub mileage_frequency:     i64,
}

impl NewPlan {
  /// Plan-editor validation. Configuration errors are fatal here so they
  /// never reach the projector.
  pub fn validate(&self) -> Result<()> {
    validate_fields(
      &self.vehicle_license_plate,
      &self.plan_name,
      self.frequency_value,
      self.mileage_frequency,
    )
  }

  /// Materialise a plan with the given identity. Used by stores.
  pub fn into_plan(self, plan_id: Uuid, now: DateTime<Utc>) -> MaintenancePlan {
    MaintenancePlan {
      plan_id,
      vehicle_license_plate: self.vehicle_license_plate,
      plan_name: self.plan_name,
      last_service_date: self.last_service_date,
      frequency_value: self.frequency_value,
      frequency_unit: self.frequency_unit,
      last_service_mileage: self.last_service_mileage,
      mileage_frequency: self.mileage_frequency,
      created_at: now,
      updated_at: now,
    }
  }
}

fn validate_fields(
  plate: &str,
  name: &str,
  frequency_value: i32,
  mileage_frequency: i64,
) -> Result<()> {
  if plate.trim().is_empty() {
    return Err(Error::EmptyLicensePlate);
  }
  if name.trim().is_empty() {
    return Err(Error::EmptyPlanName);
  }
  if frequency_value <= 0 {
    return Err(Error::InvalidFrequency(frequency_value));
  }
  if mileage_frequency <= 0 {
    return Err(Error::InvalidMileageFrequency(mileage_frequency));
  }
  Ok(())
}
