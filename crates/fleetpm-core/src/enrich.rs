//! Live status for list and dashboard views.
//!
//! An [`EnrichedPlan`] is never stored. It is a pure function of the plan,
//! the vehicle's repair records and the instant it was computed at.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::{
  fleet::RepairRecord,
  plan::MaintenancePlan,
  status::{self, PlanStatus, StatusThresholds},
};

/// A plan together with its computed due values and status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedPlan {
  #[serde(flatten)]
  pub plan:                    MaintenancePlan,
  pub status:                  PlanStatus,
  /// `None` when the plan's time rule is degenerate.
  pub next_service_date:       Option<NaiveDate>,
  pub days_until_next_service: Option<i64>,
  /// Latest odometer reading; `None` if the vehicle has no repair history
  /// with a mileage.
  pub current_mileage:         Option<i64>,
  pub next_service_mileage:    i64,
  pub km_until_next_service:   Option<i64>,
}

/// Odometer reading from the most recently created repair record for `plate`
/// that has one. Records sharing a `created_at` resolve to the highest
/// reading.
pub fn current_mileage(plate: &str, repairs: &[RepairRecord]) -> Option<i64> {
  repairs
    .iter()
    .filter(|r| r.vehicle_license_plate == plate)
    .filter_map(|r| r.mileage.map(|mileage| (r.created_at, mileage)))
    .max()
    .map(|(_, mileage)| mileage)
}

/// Enrich with the default thresholds.
pub fn enrich(
  plan: &MaintenancePlan,
  repairs: &[RepairRecord],
  now: NaiveDateTime,
) -> EnrichedPlan {
  enrich_with(plan, repairs, now, &StatusThresholds::default())
}

pub fn enrich_with(
  plan: &MaintenancePlan,
  repairs: &[RepairRecord],
  now: NaiveDateTime,
  thresholds: &StatusThresholds,
) -> EnrichedPlan {
  let next_service_date = plan.next_service_date();
  let days_until_next_service =
    next_service_date.map(|date| status::days_until(date, now));
  let current_mileage = current_mileage(&plan.vehicle_license_plate, repairs);
  let next_service_mileage = plan.next_service_mileage();
  let km_until_next_service =
    current_mileage.map(|current| next_service_mileage.saturating_sub(current));

  EnrichedPlan {
    plan: plan.clone(),
    status: thresholds.classify(days_until_next_service, km_until_next_service),
    next_service_date,
    days_until_next_service,
    current_mileage,
    next_service_mileage,
    km_until_next_service,
  }
}

// ─── Dashboard ───────────────────────────────────────────────────────────────

/// Plan counts per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSummary {
  pub total:   usize,
  pub ok:      usize,
  pub due:     usize,
  pub overdue: usize,
}

impl StatusSummary {
  pub fn from_plans<'a>(plans: impl IntoIterator<Item = &'a EnrichedPlan>) -> Self {
    plans.into_iter().fold(Self::default(), |mut acc, p| {
      acc.total += 1;
      match p.status {
        PlanStatus::Ok => acc.ok += 1,
        PlanStatus::Due => acc.due += 1,
        PlanStatus::Overdue => acc.overdue += 1,
      }
      acc
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::{DateTime, TimeZone, Utc};
  use uuid::Uuid;

  use super::*;
  use crate::{fleet::NewRepair, plan::{FrequencyUnit, NewPlan}};

  const PLATE: &str = "3กฌ-8812";

  fn plan(anchor: NaiveDate) -> MaintenancePlan {
    NewPlan {
      vehicle_license_plate: PLATE.into(),
      plan_name:             "Tyre rotation".into(),
      last_service_date:     anchor,
      frequency_value:       6,
      frequency_unit:        FrequencyUnit::Months,
      last_service_mileage:  20_000,
      mileage_frequency:     10_000,
    }
    .into_plan(Uuid::new_v4(), Utc::now())
  }

  fn ts(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, day, hour, 0, 0).unwrap()
  }

  fn repair(plate: &str, mileage: Option<i64>, created_at: DateTime<Utc>) -> RepairRecord {
    NewRepair {
      vehicle_license_plate: plate.into(),
      repair_date:           None,
      mileage,
      description:           "job".into(),
    }
    .into_record(Uuid::new_v4(), created_at)
  }

  fn now(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(9, 0, 0).unwrap()
  }

  #[test]
  fn latest_mileage_uses_creation_time_not_repair_date() {
    let mut old = repair(PLATE, Some(31_000), ts(1, 8));
    old.repair_date = NaiveDate::from_ymd_opt(2024, 5, 30);
    let newer = repair(PLATE, Some(29_500), ts(2, 8));
    assert_eq!(current_mileage(PLATE, &[old, newer]), Some(29_500));
  }

  #[test]
  fn latest_mileage_skips_records_without_reading_and_other_vehicles() {
    let repairs = [
      repair(PLATE, Some(25_000), ts(1, 8)),
      repair(PLATE, None, ts(3, 8)),
      repair("other", Some(90_000), ts(4, 8)),
    ];
    assert_eq!(current_mileage(PLATE, &repairs), Some(25_000));
    assert_eq!(current_mileage("nobody", &repairs), None);
  }

  #[test]
  fn creation_time_ties_resolve_to_highest_mileage() {
    let a = repair(PLATE, Some(27_000), ts(5, 10));
    let b = repair(PLATE, Some(27_400), ts(5, 10));
    assert_eq!(current_mileage(PLATE, &[a.clone(), b.clone()]), Some(27_400));
    assert_eq!(current_mileage(PLATE, &[b, a]), Some(27_400));
  }

  #[test]
  fn no_repair_history_leaves_distance_unknown() {
    let p = plan(NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
    let e = enrich(&p, &[], now(2024, 3, 1));
    assert_eq!(e.current_mileage, None);
    assert_eq!(e.km_until_next_service, None);
    assert_eq!(e.next_service_mileage, 30_000);
    assert_eq!(e.next_service_date, NaiveDate::from_ymd_opt(2024, 7, 10));
    assert_eq!(e.days_until_next_service, Some(131));
    assert_eq!(e.status, PlanStatus::Ok);
  }

  #[test]
  fn distance_signal_can_raise_urgency() {
    let p = plan(NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
    let repairs = [repair(PLATE, Some(29_000), ts(1, 8))];
    let e = enrich(&p, &repairs, now(2024, 3, 1));
    assert_eq!(e.km_until_next_service, Some(1_000));
    assert_eq!(e.status, PlanStatus::Due);

    let repairs = [repair(PLATE, Some(30_010), ts(1, 8))];
    let e = enrich(&p, &repairs, now(2024, 3, 1));
    assert_eq!(e.km_until_next_service, Some(-10));
    assert_eq!(e.status, PlanStatus::Overdue);
  }

  #[test]
  fn extreme_odometer_reading_saturates() {
    let p = plan(NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
    let repairs = [repair(PLATE, Some(i64::MIN), ts(1, 8))];
    let e = enrich(&p, &repairs, now(2024, 3, 1));
    assert_eq!(e.km_until_next_service, Some(i64::MAX));
    assert_eq!(e.status, PlanStatus::Ok);
  }

  #[test]
  fn time_signal_alone() {
    let p = plan(NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
    assert_eq!(enrich(&p, &[], now(2024, 6, 20)).status, PlanStatus::Due);
    assert_eq!(enrich(&p, &[], now(2024, 7, 10)).days_until_next_service, Some(0));
    assert_eq!(enrich(&p, &[], now(2024, 7, 11)).status, PlanStatus::Overdue);
  }

  #[test]
  fn degenerate_rule_has_no_next_date() {
    let mut p = plan(NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
    p.frequency_value = 0;
    let e = enrich(&p, &[], now(2024, 3, 1));
    assert_eq!(e.next_service_date, None);
    assert_eq!(e.days_until_next_service, None);
    assert_eq!(e.status, PlanStatus::Ok);
  }

  #[test]
  fn enrichment_is_repeatable() {
    let p = plan(NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
    let repairs = [repair(PLATE, Some(28_700), ts(1, 8))];
    let at = now(2024, 6, 1);
    assert_eq!(enrich(&p, &repairs, at), enrich(&p, &repairs, at));
  }

  #[test]
  fn summary_counts_each_status() {
    let base = plan(NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
    let at = now(2024, 3, 1);
    let ok = enrich(&base, &[], at);
    let due = enrich(&base, &[repair(PLATE, Some(29_000), ts(1, 8))], at);
    let overdue = enrich(&base, &[repair(PLATE, Some(31_000), ts(1, 8))], at);

    let summary = StatusSummary::from_plans([&ok, &due, &overdue, &ok]);
    assert_eq!(summary, StatusSummary { total: 4, ok: 2, due: 1, overdue: 1 });
  }

  #[test]
  fn flattens_plan_fields_in_json() {
    let p = plan(NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
    let json = serde_json::to_value(enrich(&p, &[], now(2024, 3, 1))).unwrap();
    assert_eq!(json["plan_name"], "Tyre rotation");
    assert_eq!(json["status"], "ok");
    assert!(json["km_until_next_service"].is_null());
  }
}
