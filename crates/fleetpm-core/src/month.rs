//! Zero-based month index (0 = January).

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A month of the year, 0–11. Serialised as a bare integer.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
  Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct MonthIndex(u8);

impl MonthIndex {
  pub const JANUARY: Self = Self(0);
  pub const DECEMBER: Self = Self(11);

  pub fn new(index: u8) -> Result<Self> {
    if index < 12 {
      Ok(Self(index))
    } else {
      Err(Error::InvalidMonth(i64::from(index)))
    }
  }

  /// The month `date` falls in.
  pub fn of(date: NaiveDate) -> Self {
    // `month0` is always 0..=11.
    Self(date.month0() as u8)
  }

  pub fn get(self) -> u8 { self.0 }

  /// All twelve months in calendar order.
  pub fn all() -> impl Iterator<Item = Self> { (0..12).map(Self) }

  pub fn short_name(self) -> &'static str {
    const NAMES: [&str; 12] = [
      "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct",
      "Nov", "Dec",
    ];
    NAMES[usize::from(self.0)]
  }
}

impl TryFrom<u8> for MonthIndex {
  type Error = Error;

  fn try_from(value: u8) -> Result<Self> { Self::new(value) }
}

impl TryFrom<i64> for MonthIndex {
  type Error = Error;

  fn try_from(value: i64) -> Result<Self> {
    u8::try_from(value)
      .map_err(|_| Error::InvalidMonth(value))
      .and_then(Self::new)
  }
}

impl From<MonthIndex> for u8 {
  fn from(month: MonthIndex) -> Self { month.0 }
}

impl fmt::Display for MonthIndex {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}
