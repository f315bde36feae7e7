//! Traffic-light status derived from the time and distance signals.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Urgency of a plan. Ordered from least to most urgent.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
  Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum PlanStatus {
  Ok,
  Due,
  Overdue,
}

impl PlanStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Ok => "ok",
      Self::Due => "due",
      Self::Overdue => "overdue",
    }
  }
}

/// How close a signal must be to its due point to count as `due`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusThresholds {
  pub due_within_days: i64,
  pub due_within_km:   i64,
}

impl Default for StatusThresholds {
  fn default() -> Self {
    Self {
      due_within_days: 30,
      due_within_km:   1500,
    }
  }
}

impl StatusThresholds {
  /// Combine both signals; overdue beats due beats ok.
  ///
  /// An absent signal (`None`) never contributes urgency. It is not treated
  /// as zero.
  pub fn classify(&self, days_until: Option<i64>, km_until: Option<i64>) -> PlanStatus {
    let overdue =
      days_until.is_some_and(|d| d < 0) || km_until.is_some_and(|km| km < 0);
    if overdue {
      return PlanStatus::Overdue;
    }
    let due = days_until.is_some_and(|d| d <= self.due_within_days)
      || km_until.is_some_and(|km| km <= self.due_within_km);
    if due { PlanStatus::Due } else { PlanStatus::Ok }
  }
}

/// Classify with the default thresholds (30 days, 1500 km).
pub fn compute_status(days_until: i64, km_until: Option<i64>) -> PlanStatus {
  StatusThresholds::default().classify(Some(days_until), km_until)
}

/// Whole days from `now` until local midnight of `target`, rounded up.
pub fn days_until(target: NaiveDate, now: NaiveDateTime) -> i64 {
  let millis = (target.and_time(NaiveTime::MIN) - now).num_milliseconds();
  millis.div_euclid(MILLIS_PER_DAY) + i64::from(millis.rem_euclid(MILLIS_PER_DAY) != 0)
}
