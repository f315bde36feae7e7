//! Service history — the append-only log of maintenance actually performed.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A recorded service event. Never updated after it is written; an operator
/// may delete it outright.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PmHistory {
  pub history_id:            Uuid,
  pub maintenance_plan_id:   Uuid,
  pub vehicle_license_plate: String,
  /// Copied from the plan at the time of service so renames don't rewrite
  /// the past.
  pub plan_name:             String,
  pub service_date:          NaiveDate,
  pub mileage:               i64,
  pub technician_id:         Option<String>,
  /// The due date this service satisfied, if one was known.
  pub target_service_date:   Option<NaiveDate>,
  /// The due odometer reading this service satisfied.
  pub target_mileage:        Option<i64>,
  pub notes:                 String,
  pub recorded_at:           DateTime<Utc>,
}

/// Input to [`crate::store::PmStore::append_history`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPmHistory {
  pub maintenance_plan_id:   Uuid,
  pub vehicle_license_plate: String,
  pub plan_name:             String,
  pub service_date:          NaiveDate,
  pub mileage:               i64,
  pub technician_id:         Option<String>,
  pub target_service_date:   Option<NaiveDate>,
  pub target_mileage:        Option<i64>,
  pub notes:                 String,
}

impl NewPmHistory {
  pub fn into_history(self, history_id: Uuid, recorded_at: DateTime<Utc>) -> PmHistory {
    PmHistory {
      history_id,
      maintenance_plan_id: self.maintenance_plan_id,
      vehicle_license_plate: self.vehicle_license_plate,
      plan_name: self.plan_name,
      service_date: self.service_date,
      mileage: self.mileage,
      technician_id: self.technician_id,
      target_service_date: self.target_service_date,
      target_mileage: self.target_mileage,
      notes: self.notes,
      recorded_at,
    }
  }
}

/// Parameters for [`crate::store::PmStore::list_history`]. Empty means all.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryQuery {
  pub plan_id: Option<Uuid>,
  pub vehicle: Option<String>,
}
