//! Wall-clock capability.
//!
//! Status classification depends on "now". Callers pass the instant in
//! explicitly; long-lived components hold a [`Clock`] and read it once per
//! request so a single response is computed against a single instant.

use chrono::{Local, NaiveDateTime};

/// A source of local wall-clock time.
pub trait Clock: Send + Sync {
  fn now(&self) -> NaiveDateTime;
}

/// Reads the host's local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> NaiveDateTime { Local::now().naive_local() }
}

/// Always returns the same instant. Used by tests and replays.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
  fn now(&self) -> NaiveDateTime { self.0 }
}
