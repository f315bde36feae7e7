//! Async HTTP client wrapping the fleetpm JSON API.

use anyhow::{Context, Result, anyhow};
use fleetpm_core::{
  annual::{MonthStatus, ServiceLog},
  enrich::{EnrichedPlan, StatusSummary},
  grid::AnnualGrid,
  history::PmHistory,
  month::MonthIndex,
  service::{EditResult, LoggedService},
};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Connection settings for the fleetpm API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
}

/// Async HTTP client for the fleetpm JSON REST API.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

#[derive(Deserialize)]
struct ErrorBody {
  error: String,
}

#[derive(Serialize)]
struct EditMonthBody<'a> {
  status:      MonthStatus,
  #[serde(skip_serializing_if = "Option::is_none")]
  service_log: Option<&'a ServiceLog>,
}

/// Turn a non-2xx response into an error carrying the server's message.
async fn check(resp: Response, what: &str) -> Result<Response> {
  let status = resp.status();
  if status.is_success() {
    return Ok(resp);
  }
  let message = resp
    .json::<ErrorBody>()
    .await
    .map(|b| b.error)
    .unwrap_or_default();
  Err(anyhow!("{what} → {status} {message}"))
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!(
      "{}/api{}",
      self.config.base_url.trim_end_matches('/'),
      path
    )
  }

  // ── Plans ─────────────────────────────────────────────────────────────────

  /// `GET /api/plans[?vehicle=<plate>]`
  pub async fn list_plans(&self, vehicle: Option<&str>) -> Result<Vec<EnrichedPlan>> {
    let mut req = self.client.get(self.url("/plans"));
    if let Some(plate) = vehicle {
      req = req.query(&[("vehicle", plate)]);
    }
    let resp = req.send().await.context("GET /plans failed")?;
    check(resp, "GET /plans")
      .await?
      .json()
      .await
      .context("deserialising plans")
  }

  /// `GET /api/dashboard`
  pub async fn dashboard(&self) -> Result<StatusSummary> {
    let resp = self
      .client
      .get(self.url("/dashboard"))
      .send()
      .await
      .context("GET /dashboard failed")?;
    check(resp, "GET /dashboard")
      .await?
      .json()
      .await
      .context("deserialising dashboard")
  }

  /// `POST /api/plans/{id}/service`
  pub async fn log_service(&self, plan_id: Uuid, log: &ServiceLog) -> Result<LoggedService> {
    let path = format!("/plans/{plan_id}/service");
    let resp = self
      .client
      .post(self.url(&path))
      .json(log)
      .send()
      .await
      .with_context(|| format!("POST {path} failed"))?;
    check(resp, &format!("POST {path}"))
      .await?
      .json()
      .await
      .context("deserialising service log result")
  }

  // ── Annual grid ───────────────────────────────────────────────────────────

  /// `GET /api/plans/{id}/annual/{year}`
  pub async fn grid(&self, plan_id: Uuid, year: i32) -> Result<AnnualGrid> {
    let path = format!("/plans/{plan_id}/annual/{year}");
    let resp = self
      .client
      .get(self.url(&path))
      .send()
      .await
      .with_context(|| format!("GET {path} failed"))?;
    check(resp, &format!("GET {path}"))
      .await?
      .json()
      .await
      .context("deserialising grid")
  }

  /// `PUT /api/plans/{id}/annual/{year}/{month}`
  pub async fn mark_month(
    &self,
    plan_id: Uuid,
    year: i32,
    month: MonthIndex,
    status: MonthStatus,
    log: Option<&ServiceLog>,
  ) -> Result<EditResult> {
    let path = format!("/plans/{plan_id}/annual/{year}/{month}");
    let resp = self
      .client
      .put(self.url(&path))
      .json(&EditMonthBody { status, service_log: log })
      .send()
      .await
      .with_context(|| format!("PUT {path} failed"))?;
    check(resp, &format!("PUT {path}"))
      .await?
      .json()
      .await
      .context("deserialising edit result")
  }

  // ── History ───────────────────────────────────────────────────────────────

  /// `GET /api/history[?plan_id=<id>][&vehicle=<plate>]`
  pub async fn history(
    &self,
    plan_id: Option<Uuid>,
    vehicle: Option<&str>,
  ) -> Result<Vec<PmHistory>> {
    let mut query: Vec<(&str, String)> = Vec::new();
    if let Some(id) = plan_id {
      query.push(("plan_id", id.to_string()));
    }
    if let Some(plate) = vehicle {
      query.push(("vehicle", plate.to_owned()));
    }
    let resp = self
      .client
      .get(self.url("/history"))
      .query(&query)
      .send()
      .await
      .context("GET /history failed")?;
    check(resp, "GET /history")
      .await?
      .json()
      .await
      .context("deserialising history")
  }
}
