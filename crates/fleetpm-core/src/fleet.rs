//! Vehicles and repair records — the collaborators the engine reads from.
//!
//! Vehicles are only joined for display. Repair records matter to the engine
//! solely for the odometer readings they carry.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// A vehicle in the fleet, keyed by its license plate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
  pub license_plate: String,
  #[serde(default)]
  pub make:          Option<String>,
  #[serde(default)]
  pub model:         Option<String>,
  #[serde(default)]
  pub description:   Option<String>,
}

/// A repair job logged against a vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairRecord {
  pub repair_id:             Uuid,
  pub vehicle_license_plate: String,
  pub repair_date:           Option<NaiveDate>,
  /// Odometer reading noted on the job, when the mechanic wrote one down.
  pub mileage:               Option<i64>,
  pub description:           String,
  /// Store-assigned; decides which reading is "latest".
  pub created_at:            DateTime<Utc>,
}

/// Input to [`crate::store::PmStore::add_repair`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRepair {
  pub vehicle_license_plate: String,
  #[serde(default)]
  pub repair_date:           Option<NaiveDate>,
  #[serde(default)]
  pub mileage:               Option<i64>,
  #[serde(default)]
  pub description:           String,
}

impl NewRepair {
  /// Reject blank plates and negative odometer readings.
  pub fn validate(&self) -> Result<()> {
    if self.vehicle_license_plate.trim().is_empty() {
      return Err(Error::EmptyLicensePlate);
    }
    match self.mileage {
      Some(mileage) if mileage < 0 => Err(Error::NegativeMileage(mileage)),
      _ => Ok(()),
    }
  }

  pub fn into_record(self, repair_id: Uuid, created_at: DateTime<Utc>) -> RepairRecord {
    RepairRecord {
      repair_id,
      vehicle_license_plate: self.vehicle_license_plate,
      repair_date: self.repair_date,
      mileage: self.mileage,
      description: self.description,
      created_at,
    }
  }
}
