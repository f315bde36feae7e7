//! Plain-text rendering of API responses.

use fleetpm_core::{
  annual::MonthStatus,
  enrich::{EnrichedPlan, StatusSummary},
  grid::AnnualGrid,
  history::PmHistory,
  month::MonthIndex,
};

/// Left-aligned columns separated by two spaces. Widths count characters, not
/// bytes, so non-Latin plates line up.
fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
  let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
  for row in rows {
    for (width, cell) in widths.iter_mut().zip(row) {
      *width = (*width).max(cell.chars().count());
    }
  }

  let mut out = vec![table_line(headers.iter().copied(), &widths)];
  out.extend(rows.iter().map(|row| table_line(row.iter().map(String::as_str), &widths)));
  out.join("\n")
}

fn table_line<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
  let padded: Vec<String> = cells
    .zip(widths)
    .map(|(cell, &width)| {
      let pad = width.saturating_sub(cell.chars().count());
      format!("{cell}{}", " ".repeat(pad))
    })
    .collect();
  padded.join("  ").trim_end().to_owned()
}

fn or_dash<T: ToString>(value: Option<T>) -> String {
  value.map_or_else(|| "-".to_owned(), |v| v.to_string())
}

pub fn plans(plans: &[EnrichedPlan]) -> String {
  if plans.is_empty() {
    return "no maintenance plans".to_owned();
  }
  let rows: Vec<Vec<String>> = plans
    .iter()
    .map(|p| {
      vec![
        p.plan.plan_id.to_string(),
        p.plan.vehicle_license_plate.clone(),
        p.plan.plan_name.clone(),
        p.status.as_str().to_uppercase(),
        or_dash(p.next_service_date),
        or_dash(p.days_until_next_service),
        p.next_service_mileage.to_string(),
        or_dash(p.km_until_next_service),
      ]
    })
    .collect();
  table(
    &["ID", "VEHICLE", "PLAN", "STATUS", "NEXT DATE", "DAYS", "NEXT KM", "KM LEFT"],
    &rows,
  )
}

pub fn summary(s: &StatusSummary) -> String {
  format!(
    "{} plans: {} ok, {} due, {} overdue",
    s.total, s.ok, s.due, s.overdue
  )
}

fn cell_symbol(status: MonthStatus) -> &'static str {
  match status {
    MonthStatus::None => ".",
    MonthStatus::Planned => "o",
    MonthStatus::Completed => "x",
    MonthStatus::CompletedUnplanned => "+",
  }
}

/// One row of month names and one row of cell symbols. Cells carrying a
/// manual override are marked with `*`.
pub fn grid(grid: &AnnualGrid) -> String {
  let names: Vec<String> = MonthIndex::all().map(|m| format!("{:<4}", m.short_name())).collect();
  let cells: Vec<String> = grid
    .months
    .iter()
    .map(|c| {
      let marker = if c.manual.is_some() { "*" } else { " " };
      format!("{}{marker}  ", cell_symbol(c.effective))
    })
    .collect();

  format!(
    "{} · {} · {}\n{}\n{}\n\n. none  o planned  x completed  + unplanned  * manual",
    grid.key.vehicle_license_plate,
    grid.plan_name,
    grid.key.year,
    names.concat().trim_end(),
    cells.concat().trim_end(),
  )
}

pub fn history(entries: &[PmHistory]) -> String {
  if entries.is_empty() {
    return "no service history".to_owned();
  }
  let rows: Vec<Vec<String>> = entries
    .iter()
    .map(|h| {
      vec![
        h.service_date.to_string(),
        h.vehicle_license_plate.clone(),
        h.plan_name.clone(),
        h.mileage.to_string(),
        or_dash(h.target_service_date),
        or_dash(h.technician_id.as_deref()),
        h.notes.clone(),
      ]
    })
    .collect();
  table(
    &["DATE", "VEHICLE", "PLAN", "KM", "TARGET", "TECH", "NOTES"],
    &rows,
  )
}
