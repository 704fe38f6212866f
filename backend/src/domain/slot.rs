//! Parking slots and the fixed slot catalogue.

use std::fmt;
use std::str::FromStr;

use super::{SessionId, VehicleClass};

/// Validation errors raised while parsing slot identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SlotIdValidationError {
    /// The id does not follow `<CLASS>-<NN>`.
    #[error("slot id '{0}' must look like 2W-01 or 4W-12")]
    Malformed(String),
    /// Slot numbers start at 1.
    #[error("slot id '{0}' must use a slot number of at least 1")]
    ZeroNumber(String),
}

/// Identifier of a physical slot, rendered as `<CLASS>-<NN>`.
///
/// The vehicle class is part of the identifier so a slot can never change
/// class after creation.
///
/// ## Invariants
/// - `number` is at least 1.
/// - The rendered form zero-pads the number to two digits.
///
/// # Examples
/// ```
/// use lotkeeper::domain::{SlotId, VehicleClass};
///
/// let id: SlotId = "2W-07".parse().unwrap();
/// assert_eq!(id.vehicle_class(), VehicleClass::TwoWheeler);
/// assert_eq!(id.number(), 7);
/// assert_eq!(id.to_string(), "2W-07");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotId {
    vehicle_class: VehicleClass,
    number: u32,
}

impl SlotId {
    /// Build the id of slot `number` for `vehicle_class`.
    pub fn new(vehicle_class: VehicleClass, number: u32) -> Result<Self, SlotIdValidationError> {
        if number == 0 {
            return Err(SlotIdValidationError::ZeroNumber(format!(
                "{vehicle_class}-00"
            )));
        }
        Ok(Self {
            vehicle_class,
            number,
        })
    }

    /// Class of vehicle the slot accepts.
    pub fn vehicle_class(&self) -> VehicleClass {
        self.vehicle_class
    }

    /// One-based slot number within its class.
    pub fn number(&self) -> u32 {
        self.number
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.vehicle_class, self.number)
    }
}

impl FromStr for SlotId {
    type Err = SlotIdValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || SlotIdValidationError::Malformed(s.to_owned());
        let (class, digits) = s.trim().split_once('-').ok_or_else(malformed)?;
        let vehicle_class = class.parse::<VehicleClass>().map_err(|_| malformed())?;
        if digits.len() < 2 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(malformed());
        }
        let number = digits.parse::<u32>().map_err(|_| malformed())?;
        if number == 0 {
            return Err(SlotIdValidationError::ZeroNumber(s.to_owned()));
        }
        // Reject non-canonical padding such as `2W-007`.
        if format!("{number:02}") != digits {
            return Err(malformed());
        }
        Ok(Self {
            vehicle_class,
            number,
        })
    }
}

/// A parking slot and its current occupant.
///
/// Occupancy is stored as the occupying session id, so `occupied()` can never
/// disagree with `session_id()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    id: SlotId,
    occupant: Option<SessionId>,
}

impl Slot {
    /// A free slot.
    pub fn vacant(id: SlotId) -> Self {
        Self { id, occupant: None }
    }

    /// Rebuild a slot from stored state.
    pub fn from_parts(id: SlotId, occupant: Option<SessionId>) -> Self {
        Self { id, occupant }
    }

    pub fn id(&self) -> SlotId {
        self.id
    }

    pub fn vehicle_class(&self) -> VehicleClass {
        self.id.vehicle_class()
    }

    pub fn occupied(&self) -> bool {
        self.occupant.is_some()
    }

    /// Session currently parked in this slot.
    pub fn session_id(&self) -> Option<&SessionId> {
        self.occupant.as_ref()
    }

    pub(crate) fn set_occupant(&mut self, occupant: Option<SessionId>) {
        self.occupant = occupant;
    }
}

/// Number of slots to create per vehicle class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotCounts {
    pub two_wheeler: u32,
    pub four_wheeler: u32,
}

impl SlotCounts {
    /// Slot counts used by the reference deployment.
    pub const REFERENCE: Self = Self {
        two_wheeler: 30,
        four_wheeler: 30,
    };

    /// Count configured for `vehicle_class`.
    pub fn for_class(&self, vehicle_class: VehicleClass) -> u32 {
        match vehicle_class {
            VehicleClass::TwoWheeler => self.two_wheeler,
            VehicleClass::FourWheeler => self.four_wheeler,
        }
    }

    /// Every slot implied by these counts, vacant, in natural order.
    ///
    /// # Examples
    /// ```
    /// use lotkeeper::domain::SlotCounts;
    ///
    /// let slots = SlotCounts { two_wheeler: 2, four_wheeler: 1 }.catalogue();
    /// let ids: Vec<String> = slots.iter().map(|s| s.id().to_string()).collect();
    /// assert_eq!(ids, ["2W-01", "2W-02", "4W-01"]);
    /// ```
    pub fn catalogue(&self) -> Vec<Slot> {
        VehicleClass::ALL
            .into_iter()
            .flat_map(|class| {
                (1..=self.for_class(class)).map(move |number| {
                    Slot::vacant(SlotId {
                        vehicle_class: class,
                        number,
                    })
                })
            })
            .collect()
    }
}

impl Default for SlotCounts {
    fn default() -> Self {
        Self::REFERENCE
    }
}
