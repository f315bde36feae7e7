//! Manual month overrides and their reconciliation with the projection.
//!
//! An [`AnnualPmPlan`] is sparse: a month appears in `months` only when the
//! user deviated from what the projection would show. The displayed status is
//! always re-derived from the stored overrides plus a fresh projection.

use std::{
  collections::{BTreeMap, HashMap},
  fmt,
  str::FromStr,
};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  history::NewPmHistory,
  month::MonthIndex,
  plan::MaintenancePlan,
  projection::CalculatedMonths,
};

// ─── MonthStatus ─────────────────────────────────────────────────────────────

/// The state of one grid cell.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum MonthStatus {
  /// No activity. Stored explicitly only to suppress a calculated month.
  #[default]
  None,
  Planned,
  /// Done, in a month that was due.
  Completed,
  /// Done out of cycle.
  CompletedUnplanned,
}

impl MonthStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::None => "none",
      Self::Planned => "planned",
      Self::Completed => "completed",
      Self::CompletedUnplanned => "completed_unplanned",
    }
  }

  /// Whether this status records work that was actually carried out.
  pub fn is_completed(self) -> bool {
    matches!(self, Self::Completed | Self::CompletedUnplanned)
  }
}

impl fmt::Display for MonthStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for MonthStatus {
  type Err = String;

  fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
    match s {
      "none" => Ok(Self::None),
      "planned" => Ok(Self::Planned),
      "completed" => Ok(Self::Completed),
      "completed_unplanned" => Ok(Self::CompletedUnplanned),
      other => Err(format!("unknown month status: {other:?}")),
    }
  }
}

// ─── Key and record ──────────────────────────────────────────────────────────

/// Compound natural key of an override record.
#[derive(
  Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct AnnualPlanKey {
  pub vehicle_license_plate: String,
  pub maintenance_plan_id:   Uuid,
  pub year:                  i32,
}

/// Manual overrides for one (vehicle, plan, year).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnualPmPlan {
  pub vehicle_license_plate: String,
  pub maintenance_plan_id:   Uuid,
  pub year:                  i32,
  #[serde(default)]
  pub months:                BTreeMap<MonthIndex, MonthStatus>,
}

impl AnnualPmPlan {
  pub fn new(key: AnnualPlanKey) -> Self {
    Self {
      vehicle_license_plate: key.vehicle_license_plate,
      maintenance_plan_id:   key.maintenance_plan_id,
      year:                  key.year,
      months:                BTreeMap::new(),
    }
  }

  pub fn key(&self) -> AnnualPlanKey {
    AnnualPlanKey {
      vehicle_license_plate: self.vehicle_license_plate.clone(),
      maintenance_plan_id:   self.maintenance_plan_id,
      year:                  self.year,
    }
  }

  pub fn manual(&self, month: MonthIndex) -> Option<MonthStatus> {
    self.months.get(&month).copied()
  }
}

/// Override records indexed by their natural key.
#[derive(Debug, Clone, Default)]
pub struct AnnualOverrides {
  by_key: HashMap<AnnualPlanKey, AnnualPmPlan>,
}

impl AnnualOverrides {
  /// Index `records`. If two records share a key, the later one wins.
  pub fn from_records(records: impl IntoIterator<Item = AnnualPmPlan>) -> Self {
    let by_key = records
      .into_iter()
      .map(|record| (record.key(), record))
      .collect();
    Self { by_key }
  }

  pub fn get(&self, key: &AnnualPlanKey) -> Option<&AnnualPmPlan> {
    self.by_key.get(key)
  }

  pub fn len(&self) -> usize { self.by_key.len() }

  pub fn is_empty(&self) -> bool { self.by_key.is_empty() }
}

// ─── Reconciliation ──────────────────────────────────────────────────────────

/// The status a month displays. A manual value always wins verbatim.
pub fn effective_status(manual: Option<MonthStatus>, calculated: bool) -> MonthStatus {
  match manual {
    Some(status) => status,
    None if calculated => MonthStatus::Planned,
    None => MonthStatus::None,
  }
}

/// Details of a service carried out, supplied when a month is marked
/// completed. Date and mileage are optional here so that their absence can be
/// reported as a validation error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceLog {
  pub service_date:  Option<NaiveDate>,
  pub mileage:       Option<i64>,
  #[serde(default)]
  pub technician_id: Option<String>,
  #[serde(default)]
  pub notes:         Option<String>,
}

impl ServiceLog {
  /// Check the log is complete and build the history entry it implies for
  /// `plan`. `context` names the action in error messages.
  pub fn to_history(
    &self,
    plan: &MaintenancePlan,
    context: &'static str,
  ) -> Result<NewPmHistory> {
    let service_date = self.service_date.ok_or(Error::MissingServiceDate(context))?;
    let mileage = self.mileage.ok_or(Error::MissingServiceMileage(context))?;
    Ok(NewPmHistory {
      maintenance_plan_id: plan.plan_id,
      vehicle_license_plate: plan.vehicle_license_plate.clone(),
      plan_name: plan.plan_name.clone(),
      service_date,
      mileage,
      technician_id: self
        .technician_id
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_owned),
      target_service_date: plan.next_service_date(),
      target_mileage: Some(plan.next_service_mileage()),
      notes: self.notes.as_deref().unwrap_or_default().trim().to_owned(),
    })
  }
}

/// What a month edit wants written back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOutcome {
  /// The override record to store, or `None` when nothing needs writing.
  pub annual:  Option<AnnualPmPlan>,
  /// The history entry to append, for completed statuses only.
  pub history: Option<NewPmHistory>,
}

/// Apply a user's edit of `month` in `year` to the existing overrides.
///
/// Validation happens before anything is produced: marking a month completed
/// without a service date or mileage fails and yields no outcome at all.
pub fn apply_edit(
  plan: &MaintenancePlan,
  existing: Option<&AnnualPmPlan>,
  year: i32,
  month: MonthIndex,
  new_status: MonthStatus,
  calculated: &CalculatedMonths,
  log: Option<&ServiceLog>,
) -> Result<EditOutcome> {
  let history = if new_status.is_completed() {
    let log = log.ok_or(Error::MissingServiceDate(new_status.as_str()))?;
    Some(log.to_history(plan, new_status.as_str())?)
  } else {
    None
  };

  // Clearing a month that the projection would leave blank anyway is a
  // removal; clearing a calculated month must be stored to hide the dot.
  let remove = new_status == MonthStatus::None && !calculated.contains(month);

  let annual = match existing {
    None if remove => None,
    existing => {
      let mut record = existing
        .cloned()
        .unwrap_or_else(|| AnnualPmPlan::new(plan.annual_key(year)));
      if remove {
        record.months.remove(&month);
      } else {
        record.months.insert(month, new_status);
      }
      Some(record)
    }
  };

  tracing::debug!(
    plan_id = %plan.plan_id,
    year,
    %month,
    status = new_status.as_str(),
    removed = remove,
    "applied month edit"
  );

  Ok(EditOutcome { annual, history })
}

#[cfg(test)]
mod tests {
  use chrono::Utc;

  use super::*;
  use crate::{
    plan::{FrequencyUnit, NewPlan},
    projection::project_year,
  };

  fn plan() -> MaintenancePlan {
    NewPlan {
      vehicle_license_plate: "กท-5521".into(),
      plan_name:             "Oil change".into(),
      last_service_date:     NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
      frequency_value:       3,
      frequency_unit:        FrequencyUnit::Months,
      last_service_mileage:  40_000,
      mileage_frequency:     10_000,
    }
    .into_plan(Uuid::new_v4(), Utc::now())
  }

  fn m(index: u8) -> MonthIndex { MonthIndex::new(index).unwrap() }

  fn full_log() -> ServiceLog {
    ServiceLog {
      service_date:  NaiveDate::from_ymd_opt(2024, 6, 3),
      mileage:       Some(49_800),
      technician_id: Some("tech-7".into()),
      notes:         Some("  replaced filter ".into()),
    }
  }

  #[test]
  fn manual_value_always_wins() {
    for manual in [
      MonthStatus::None,
      MonthStatus::Planned,
      MonthStatus::Completed,
      MonthStatus::CompletedUnplanned,
    ] {
      assert_eq!(effective_status(Some(manual), true), manual);
      assert_eq!(effective_status(Some(manual), false), manual);
    }
  }

  #[test]
  fn defers_to_projection_without_override() {
    assert_eq!(effective_status(None, true), MonthStatus::Planned);
    assert_eq!(effective_status(None, false), MonthStatus::None);
    // Idempotent.
    assert_eq!(effective_status(None, true), effective_status(None, true));
  }

  #[test]
  fn completing_without_service_date_is_rejected() {
    let p = plan();
    let calculated = project_year(&p, 2024);
    let log = ServiceLog { service_date: None, ..full_log() };

    let err = apply_edit(&p, None, 2024, m(5), MonthStatus::Completed, &calculated, Some(&log))
      .unwrap_err();
    assert!(matches!(err, Error::MissingServiceDate("completed")));
    assert!(err.is_validation());
  }

  #[test]
  fn completing_without_log_or_mileage_is_rejected() {
    let p = plan();
    let calculated = project_year(&p, 2024);

    let err = apply_edit(&p, None, 2024, m(5), MonthStatus::Completed, &calculated, None)
      .unwrap_err();
    assert!(matches!(err, Error::MissingServiceDate(_)));

    let log = ServiceLog { mileage: None, ..full_log() };
    let err = apply_edit(
      &p,
      None,
      2024,
      m(5),
      MonthStatus::CompletedUnplanned,
      &calculated,
      Some(&log),
    )
    .unwrap_err();
    assert!(matches!(err, Error::MissingServiceMileage("completed_unplanned")));
  }

  #[test]
  fn clearing_calculated_month_stores_explicit_none() {
    let p = plan();
    let calculated = project_year(&p, 2024);
    assert!(calculated.contains(m(6)));

    let outcome =
      apply_edit(&p, None, 2024, m(6), MonthStatus::None, &calculated, None).unwrap();
    let record = outcome.annual.expect("record created");
    assert_eq!(record.manual(m(6)), Some(MonthStatus::None));
    assert_eq!(
      effective_status(record.manual(m(6)), calculated.contains(m(6))),
      MonthStatus::None
    );
    assert!(outcome.history.is_none());
  }

  #[test]
  fn clearing_uncalculated_month_removes_the_key() {
    let p = plan();
    let calculated = project_year(&p, 2024);
    let mut existing = AnnualPmPlan::new(p.annual_key(2024));
    existing.months.insert(m(5), MonthStatus::Planned);
    existing.months.insert(m(6), MonthStatus::None);

    let outcome =
      apply_edit(&p, Some(&existing), 2024, m(5), MonthStatus::None, &calculated, None)
        .unwrap();
    let record = outcome.annual.unwrap();
    assert_eq!(record.manual(m(5)), None);
    assert_eq!(record.manual(m(6)), Some(MonthStatus::None));
  }

  #[test]
  fn no_op_removal_does_not_create_a_record() {
    let p = plan();
    let calculated = project_year(&p, 2024);
    let outcome =
      apply_edit(&p, None, 2024, m(5), MonthStatus::None, &calculated, None).unwrap();
    assert_eq!(outcome, EditOutcome { annual: None, history: None });
  }

  #[test]
  fn completing_creates_override_and_history() {
    let p = plan();
    let calculated = project_year(&p, 2024);
    let outcome = apply_edit(
      &p,
      None,
      2024,
      m(5),
      MonthStatus::Completed,
      &calculated,
      Some(&full_log()),
    )
    .unwrap();

    let record = outcome.annual.unwrap();
    assert_eq!(record.key(), p.annual_key(2024));
    assert_eq!(record.manual(m(5)), Some(MonthStatus::Completed));
    // Manual always wins, whatever the projection says.
    assert_eq!(effective_status(record.manual(m(5)), false), MonthStatus::Completed);
    assert_eq!(effective_status(record.manual(m(5)), true), MonthStatus::Completed);

    let history = outcome.history.unwrap();
    assert_eq!(history.maintenance_plan_id, p.plan_id);
    assert_eq!(history.mileage, 49_800);
    assert_eq!(history.technician_id.as_deref(), Some("tech-7"));
    assert_eq!(history.notes, "replaced filter");
    assert_eq!(history.target_service_date, NaiveDate::from_ymd_opt(2024, 4, 15));
    assert_eq!(history.target_mileage, Some(50_000));
  }

  #[test]
  fn planned_edit_has_no_history() {
    let p = plan();
    let calculated = project_year(&p, 2024);
    let outcome = apply_edit(
      &p,
      None,
      2024,
      m(1),
      MonthStatus::Planned,
      &calculated,
      Some(&full_log()),
    )
    .unwrap();
    assert!(outcome.history.is_none());
    assert_eq!(outcome.annual.unwrap().manual(m(1)), Some(MonthStatus::Planned));
  }

  #[test]
  fn overrides_index_by_natural_key() {
    let p = plan();
    let mut first = AnnualPmPlan::new(p.annual_key(2024));
    first.months.insert(m(0), MonthStatus::Planned);
    let mut second = AnnualPmPlan::new(p.annual_key(2024));
    second.months.insert(m(1), MonthStatus::Completed);
    let other_year = AnnualPmPlan::new(p.annual_key(2025));

    let index = AnnualOverrides::from_records([first, second.clone(), other_year]);
    assert_eq!(index.len(), 2);
    assert_eq!(index.get(&p.annual_key(2024)), Some(&second));
    assert!(index.get(&p.annual_key(2023)).is_none());
  }

  #[test]
  fn months_serialise_as_sparse_map() {
    let p = plan();
    let mut record = AnnualPmPlan::new(p.annual_key(2024));
    record.months.insert(m(5), MonthStatus::CompletedUnplanned);
    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["months"]["5"], "completed_unplanned");
    let back: AnnualPmPlan = serde_json::from_value(json).unwrap();
    assert_eq!(back, record);
  }
}
