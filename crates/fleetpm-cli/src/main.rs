//! `fleetpm` — command-line client for the fleet PM server.
//!
//! # Usage
//!
//! ```
//! fleetpm --url http://localhost:8080 plans --vehicle 3AB-1234
//! fleetpm grid 6f1c…-uuid 2024
//! fleetpm mark 6f1c…-uuid 2024 4 completed --date 2024-04-12 --mileage 45100
//! ```

mod client;
mod render;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use client::{ApiClient, ApiConfig};
use fleetpm_core::{
  annual::{MonthStatus, ServiceLog},
  month::MonthIndex,
};
use serde::Deserialize;
use uuid::Uuid;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "fleetpm", about = "Fleet preventive-maintenance client")]
struct Args {
  /// Path to a TOML config file (url).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the fleetpm server (default: http://localhost:8080).
  #[arg(long, env = "FLEETPM_URL")]
  url: Option<String>,

  #[command(subcommand)]
  command: Command,
}

/// Details of a completed service.
#[derive(clap::Args, Debug)]
struct ServiceArgs {
  /// Date the work was done (YYYY-MM-DD).
  #[arg(long)]
  date: Option<NaiveDate>,

  /// Odometer reading at service.
  #[arg(long)]
  mileage: Option<i64>,

  #[arg(long)]
  technician: Option<String>,

  #[arg(long)]
  notes: Option<String>,
}

impl ServiceArgs {
  fn into_log(self) -> ServiceLog {
    ServiceLog {
      service_date:  self.date,
      mileage:       self.mileage,
      technician_id: self.technician,
      notes:         self.notes,
    }
  }

  fn is_empty(&self) -> bool {
    self.date.is_none()
      && self.mileage.is_none()
      && self.technician.is_none()
      && self.notes.is_none()
  }
}

#[derive(Subcommand, Debug)]
enum Command {
  /// List plans with their live status.
  Plans {
    #[arg(long)]
    vehicle: Option<String>,
  },
  /// Count plans per status.
  Dashboard,
  /// Show one plan's annual grid.
  Grid { plan_id: Uuid, year: i32 },
  /// Set a month's status in the annual grid.
  Mark {
    plan_id: Uuid,
    year:    i32,
    /// Calendar month, 1-12.
    #[arg(value_parser = clap::value_parser!(u8).range(1..=12))]
    month:   u8,
    /// none | planned | completed | completed_unplanned
    status:  MonthStatus,
    #[command(flatten)]
    service: ServiceArgs,
  },
  /// Record a service and advance the plan's next due point.
  Service {
    plan_id: Uuid,
    #[command(flatten)]
    service: ServiceArgs,
  },
  /// List recorded services.
  History {
    #[arg(long)]
    plan: Option<Uuid>,
    #[arg(long)]
    vehicle: Option<String>,
  },
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url: String,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  // Load config file if provided.
  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let api_config = ApiConfig {
    base_url: args
      .url
      .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
      .unwrap_or_else(|| "http://localhost:8080".to_string()),
  };

  let client = ApiClient::new(api_config)?;
  let output = run(&client, args.command).await?;
  println!("{output}");
  Ok(())
}

async fn run(client: &ApiClient, command: Command) -> Result<String> {
  Ok(match command {
    Command::Plans { vehicle } => render::plans(&client.list_plans(vehicle.as_deref()).await?),
    Command::Dashboard => render::summary(&client.dashboard().await?),
    Command::Grid { plan_id, year } => render::grid(&client.grid(plan_id, year).await?),
    Command::Mark { plan_id, year, month, status, service } => {
      let month = MonthIndex::new(month - 1)?;
      let log = (!service.is_empty()).then(|| service.into_log());
      let result = client
        .mark_month(plan_id, year, month, status, log.as_ref())
        .await?;
      match result.history {
        Some(h) => format!(
          "{}\nrecorded service on {} at {} km",
          render::grid(&result.grid),
          h.service_date,
          h.mileage
        ),
        None => render::grid(&result.grid),
      }
    }
    Command::Service { plan_id, service } => {
      let logged = client.log_service(plan_id, &service.into_log()).await?;
      format!(
        "recorded service on {} at {} km\nnext due: {} or {} km",
        logged.history.service_date,
        logged.history.mileage,
        logged
          .plan
          .next_service_date()
          .map_or_else(|| "-".to_owned(), |d| d.to_string()),
        logged.plan.next_service_mileage(),
      )
    }
    Command::History { plan, vehicle } => {
      render::history(&client.history(plan, vehicle.as_deref()).await?)
    }
  })
}
