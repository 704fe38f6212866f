//! Vehicle classes and the owner/vehicle values captured at entry.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate raw strings before the allocation service touches storage.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

const OWNER_NAME_MAX: usize = 100;
const MOBILE_MIN: usize = 7;
const MOBILE_MAX: usize = 15;
const PLATE_MAX: usize = 16;

/// Vehicle class a slot is typed to.
///
/// Serialised using the lot's short codes (`2W`, `4W`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
pub enum VehicleClass {
    /// Motorcycles and scooters.
    #[serde(rename = "2W")]
    TwoWheeler,
    /// Cars and other four-wheeled vehicles.
    #[serde(rename = "4W")]
    FourWheeler,
}

impl VehicleClass {
    /// Every class, in catalogue order.
    pub const ALL: [Self; 2] = [Self::TwoWheeler, Self::FourWheeler];

    /// Short code used in slot ids and storage.
    pub fn code(self) -> &'static str {
        match self {
            Self::TwoWheeler => "2W",
            Self::FourWheeler => "4W",
        }
    }
}

impl fmt::Display for VehicleClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Raised when a vehicle class code is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown vehicle class '{0}'; expected 2W or 4W")]
pub struct UnknownVehicleClass(pub String);

impl FromStr for VehicleClass {
    type Err = UnknownVehicleClass;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "2W" => Ok(Self::TwoWheeler),
            "4W" => Ok(Self::FourWheeler),
            _ => Err(UnknownVehicleClass(s.to_owned())),
        }
    }
}

/// Validation failures for owner and vehicle values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VehicleValidationError {
    #[error("owner name must not be empty")]
    EmptyOwnerName,
    #[error("owner name must be at most {max} characters")]
    OwnerNameTooLong { max: usize },
    #[error("mobile number must be {min}-{max} digits with an optional leading '+'")]
    InvalidMobile { min: usize, max: usize },
    #[error("plate number must not be empty")]
    EmptyPlate,
    #[error("plate number must be at most {max} characters")]
    PlateTooLong { max: usize },
    #[error("plate number may only contain letters, digits and '-'")]
    InvalidPlateCharacters,
}

/// Registration plate, normalised to trimmed uppercase.
///
/// # Examples
/// ```
/// use lotkeeper::domain::PlateNumber;
///
/// let plate = PlateNumber::new(" ka05cd5678 ").unwrap();
/// assert_eq!(plate.as_ref(), "KA05CD5678");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlateNumber(String);

impl PlateNumber {
    /// Validate and normalise a raw plate string.
    pub fn new(raw: &str) -> Result<Self, VehicleValidationError> {
        let normalised = raw.trim().to_ascii_uppercase();
        if normalised.is_empty() {
            return Err(VehicleValidationError::EmptyPlate);
        }
        if normalised.chars().count() > PLATE_MAX {
            return Err(VehicleValidationError::PlateTooLong { max: PLATE_MAX });
        }
        if !normalised
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(VehicleValidationError::InvalidPlateCharacters);
        }
        Ok(Self(normalised))
    }
}

impl AsRef<str> for PlateNumber {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for PlateNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Vehicle owner's name as entered by the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerName(String);

impl OwnerName {
    /// Validate a trimmed, non-empty owner name.
    pub fn new(raw: &str) -> Result<Self, VehicleValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(VehicleValidationError::EmptyOwnerName);
        }
        if trimmed.chars().count() > OWNER_NAME_MAX {
            return Err(VehicleValidationError::OwnerNameTooLong {
                max: OWNER_NAME_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for OwnerName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Owner's contact number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MobileNumber(String);

impl MobileNumber {
    /// Validate a mobile number: digits only, optional leading `+`.
    pub fn new(raw: &str) -> Result<Self, VehicleValidationError> {
        let trimmed = raw.trim();
        let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);
        let valid_length = (MOBILE_MIN..=MOBILE_MAX).contains(&digits.len());
        if !valid_length || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(VehicleValidationError::InvalidMobile {
                min: MOBILE_MIN,
                max: MOBILE_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for MobileNumber {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}
