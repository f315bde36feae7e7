//! Single-step recurrence arithmetic.
//!
//! Month arithmetic follows chrono's `checked_add_months`: when the anchor's
//! day-of-month does not exist in the target month, the result is clamped to
//! the last day of that month (Jan 31 + 1 month = Feb 29 in 2024).

use chrono::{Days, Months, NaiveDate};

use crate::plan::FrequencyUnit;

/// Next due date after `anchor`, or `None` ("no further occurrences") when
/// `value` is not a positive integer or the result leaves chrono's range.
pub fn next_occurrence(
  anchor: NaiveDate,
  value: i32,
  unit: FrequencyUnit,
) -> Option<NaiveDate> {
  if value <= 0 {
    return None;
  }
  step(anchor, value, unit)
}

/// Advance `anchor` by exactly one rule step without validating `value`.
///
/// Zero and negative values produce a non-advancing or backwards step; the
/// annual projector relies on seeing those to detect degenerate rules.
pub fn step(anchor: NaiveDate, value: i32, unit: FrequencyUnit) -> Option<NaiveDate> {
  match unit {
    FrequencyUnit::Days => shift_days(anchor, i64::from(value)),
    FrequencyUnit::Weeks => shift_days(anchor, i64::from(value) * 7),
    FrequencyUnit::Months => {
      let months = Months::new(value.unsigned_abs());
      if value >= 0 {
        anchor.checked_add_months(months)
      } else {
        anchor.checked_sub_months(months)
      }
    }
  }
}

/// Odometer reading at which the distance rule falls due.
pub fn next_mileage(last_service_mileage: i64, mileage_frequency: i64) -> i64 {
  last_service_mileage.saturating_add(mileage_frequency)
}

fn shift_days(anchor: NaiveDate, days: i64) -> Option<NaiveDate> {
  let delta = Days::new(days.unsigned_abs());
  if days >= 0 {
    anchor.checked_add_days(delta)
  } else {
    anchor.checked_sub_days(delta)
  }
}
