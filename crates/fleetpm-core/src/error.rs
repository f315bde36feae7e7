//! Error types for `fleetpm-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("frequency value must be a positive integer, got {0}")]
  InvalidFrequency(i32),

  #[error("unknown frequency unit: {0:?}")]
  UnknownFrequencyUnit(String),

  #[error("mileage frequency must be a positive distance, got {0}")]
  InvalidMileageFrequency(i64),

  #[error("license plate must not be empty")]
  EmptyLicensePlate,

  #[error("plan name must not be empty")]
  EmptyPlanName,

  #[error("month index out of range (expected 0-11): {0}")]
  InvalidMonth(i64),

  #[error("{0}: a service date is required")]
  MissingServiceDate(&'static str),

  #[error("{0}: a service mileage is required")]
  MissingServiceMileage(&'static str),

  #[error("odometer reading must not be negative, got {0}")]
  NegativeMileage(i64),
}

impl Error {
  /// Whether the error stems from bad caller input (configuration or
  /// validation) rather than from missing data or infrastructure.
  pub fn is_validation(&self) -> bool {
    matches!(
      self,
      Self::InvalidFrequency(_)
        | Self::UnknownFrequencyUnit(_)
        | Self::InvalidMileageFrequency(_)
        | Self::EmptyLicensePlate
        | Self::EmptyPlanName
        | Self::InvalidMonth(_)
        | Self::MissingServiceDate(_)
        | Self::MissingServiceMileage(_)
        | Self::NegativeMileage(_)
    )
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
