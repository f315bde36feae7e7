//! Annual projection: which months of a year a plan's time rule lands in.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{
  month::MonthIndex,
  plan::{FrequencyUnit, MaintenancePlan},
  recurrence,
};

/// The months of one year in which at least one recurrence falls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CalculatedMonths(BTreeSet<MonthIndex>);

impl CalculatedMonths {
  pub fn contains(&self, month: MonthIndex) -> bool { self.0.contains(&month) }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn len(&self) -> usize { self.0.len() }

  pub fn iter(&self) -> impl Iterator<Item = MonthIndex> + '_ {
    self.0.iter().copied()
  }
}

impl FromIterator<MonthIndex> for CalculatedMonths {
  fn from_iter<I: IntoIterator<Item = MonthIndex>>(iter: I) -> Self {
    Self(iter.into_iter().collect())
  }
}

/// Project `plan`'s time rule across `year`.
pub fn project_year(plan: &MaintenancePlan, year: i32) -> CalculatedMonths {
  project(
    plan.last_service_date,
    plan.frequency_value,
    plan.frequency_unit,
    year,
  )
}

/// Walk forward from `anchor` one step at a time, marking every month of
/// `year` that a recurrence lands in. The anchor itself is never marked.
///
/// A step that fails to move the cursor strictly forward ends the walk, so
/// zero or negative values return whatever was found before the stall.
pub fn project(
  anchor: NaiveDate,
  value: i32,
  unit: FrequencyUnit,
  year: i32,
) -> CalculatedMonths {
  let mut months = BTreeSet::new();
  let mut cursor = anchor;

  loop {
    if cursor.year() == year && cursor > anchor {
      months.insert(MonthIndex::of(cursor));
    }

    let previous = cursor;
    let Some(next) = recurrence::step(cursor, value, unit) else {
      break;
    };
    if next <= previous {
      tracing::warn!(
        %anchor,
        value,
        unit = unit.as_str(),
        "recurrence rule does not advance; stopping projection"
      );
      break;
    }

    cursor = next;
    if cursor.year() > year {
      break;
    }
  }

  CalculatedMonths(months)
}
