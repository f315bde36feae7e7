//! The annual grid read model: twelve reconciled cells for one plan and year.

use serde::{Deserialize, Serialize};

use crate::{
  annual::{AnnualPlanKey, AnnualPmPlan, MonthStatus, effective_status},
  month::MonthIndex,
  plan::MaintenancePlan,
  projection::{CalculatedMonths, project_year},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthCell {
  pub month:      MonthIndex,
  /// The projection puts an occurrence in this month.
  pub calculated: bool,
  /// The stored override, if any.
  pub manual:     Option<MonthStatus>,
  pub effective:  MonthStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnualGrid {
  #[serde(flatten)]
  pub key:       AnnualPlanKey,
  pub plan_name: String,
  pub months:    Vec<MonthCell>,
}

impl AnnualGrid {
  pub fn cell(&self, month: MonthIndex) -> &MonthCell {
    &self.months[usize::from(month.get())]
  }
}

/// Project `plan` over `year` and reconcile every month with `overrides`.
pub fn build_grid(
  plan: &MaintenancePlan,
  year: i32,
  overrides: Option<&AnnualPmPlan>,
) -> AnnualGrid {
  let calculated = project_year(plan, year);
  grid_from_parts(plan, year, &calculated, overrides)
}

/// Reconcile an already-computed projection. The grid always has twelve
/// cells, in calendar order.
pub fn grid_from_parts(
  plan: &MaintenancePlan,
  year: i32,
  calculated: &CalculatedMonths,
  overrides: Option<&AnnualPmPlan>,
) -> AnnualGrid {
  let months = MonthIndex::all()
    .map(|month| {
      let is_calculated = calculated.contains(month);
      let manual = overrides.and_then(|o| o.manual(month));
      MonthCell {
        month,
        calculated: is_calculated,
        manual,
        effective: effective_status(manual, is_calculated),
      }
    })
    .collect();

  AnnualGrid {
    key: plan.annual_key(year),
    plan_name: plan.plan_name.clone(),
    months,
  }
}
