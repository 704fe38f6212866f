//! Parking sessions: one vehicle's stay from entry to settled exit.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{MobileNumber, OwnerName, PlateNumber, SlotId, VehicleClass};

const SESSION_ID_MAX: usize = 64;

/// Raised when a session identifier cannot be accepted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionIdValidationError {
    #[error("session id must not be empty")]
    Empty,
    #[error("session id must be at most {max} characters")]
    TooLong { max: usize },
    #[error("session id may only contain letters, digits and '-'")]
    InvalidCharacters,
}

/// Identifier of a parking session.
///
/// Derived ids take the form `<PLATE>-<YYYYMMDDHHMMSS>`, with a `-<n>` suffix
/// when the same plate re-enters within one second.
///
/// # Examples
/// ```
/// use chrono::{TimeZone, Utc};
/// use lotkeeper::domain::{PlateNumber, SessionId};
///
/// let plate = PlateNumber::new("KA05CD5678").unwrap();
/// let entry = Utc.with_ymd_and_hms(2024, 3, 1, 9, 15, 0).unwrap();
/// assert_eq!(
///     SessionId::derive(&plate, entry, 0).as_ref(),
///     "KA05CD5678-20240301091500"
/// );
/// assert_eq!(
///     SessionId::derive(&plate, entry, 2).as_ref(),
///     "KA05CD5678-20240301091500-2"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(String);

impl SessionId {
    /// Build the id for `plate` entering at `entry`.
    ///
    /// `attempt` zero yields the bare form; later attempts append a suffix.
    pub fn derive(plate: &PlateNumber, entry: DateTime<Utc>, attempt: u32) -> Self {
        let stamp = entry.format("%Y%m%d%H%M%S");
        if attempt == 0 {
            Self(format!("{plate}-{stamp}"))
        } else {
            Self(format!("{plate}-{stamp}-{attempt}"))
        }
    }

    /// Validate an externally supplied id.
    pub fn parse(raw: &str) -> Result<Self, SessionIdValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(SessionIdValidationError::Empty);
        }
        if trimmed.len() > SESSION_ID_MAX {
            return Err(SessionIdValidationError::TooLong {
                max: SESSION_ID_MAX,
            });
        }
        if !trimmed.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(SessionIdValidationError::InvalidCharacters);
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SessionId {
    type Err = SessionIdValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// How the driver paid at exit. Recorded only; nothing is charged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    QrCode,
}

impl PaymentMethod {
    /// Storage code.
    pub fn code(self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::QrCode => "qr_code",
        }
    }

    /// Wording used on the exit receipt.
    pub fn receipt_label(self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::QrCode => "QR code",
        }
    }
}

/// Raised when a stored or submitted payment value is unknown.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown payment value '{0}'")]
pub struct UnknownPaymentValue(pub String);

impl FromStr for PaymentMethod {
    type Err = UnknownPaymentValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cash" => Ok(Self::Cash),
            "qr_code" => Ok(Self::QrCode),
            other => Err(UnknownPaymentValue(other.to_owned())),
        }
    }
}

/// Settlement state of a closed session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    #[default]
    Completed,
}

impl PaymentStatus {
    pub fn code(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = UnknownPaymentValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            other => Err(UnknownPaymentValue(other.to_owned())),
        }
    }
}

/// Values recorded when a session is settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionClosure {
    pub exit_time: DateTime<Utc>,
    pub fee: u64,
    pub duration_hours: u32,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
}

/// Input for opening a session.
#[derive(Debug, Clone)]
pub struct ParkingSessionDraft {
    pub id: SessionId,
    pub owner_name: OwnerName,
    pub owner_mobile: MobileNumber,
    pub plate: PlateNumber,
    pub vehicle_class: VehicleClass,
    pub slot_id: SlotId,
    pub entry_time: DateTime<Utc>,
}

/// Raised when stored session state breaks the session invariants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParkingSessionValidationError {
    #[error("exit time {exit} precedes entry time {entry}")]
    ExitBeforeEntry {
        entry: DateTime<Utc>,
        exit: DateTime<Utc>,
    },
    #[error("slot {slot_id} does not accept {vehicle_class} vehicles")]
    SlotClassMismatch {
        slot_id: SlotId,
        vehicle_class: VehicleClass,
    },
}

/// A parking session, active until `closure` is recorded.
///
/// ## Invariants
/// - `slot_id` is typed to the session's vehicle class.
/// - When closed, `exit_time >= entry_time`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParkingSession {
    id: SessionId,
    owner_name: OwnerName,
    owner_mobile: MobileNumber,
    plate: PlateNumber,
    vehicle_class: VehicleClass,
    slot_id: SlotId,
    entry_time: DateTime<Utc>,
    closure: Option<SessionClosure>,
}

impl ParkingSession {
    /// Open a new active session.
    pub fn open(draft: ParkingSessionDraft) -> Result<Self, ParkingSessionValidationError> {
        Self::restore(draft, None)
    }

    /// Rebuild a session from stored state, checking its invariants.
    pub fn restore(
        draft: ParkingSessionDraft,
        closure: Option<SessionClosure>,
    ) -> Result<Self, ParkingSessionValidationError> {
        if draft.slot_id.vehicle_class() != draft.vehicle_class {
            return Err(ParkingSessionValidationError::SlotClassMismatch {
                slot_id: draft.slot_id,
                vehicle_class: draft.vehicle_class,
            });
        }
        if let Some(closure) = &closure {
            if closure.exit_time < draft.entry_time {
                return Err(ParkingSessionValidationError::ExitBeforeEntry {
                    entry: draft.entry_time,
                    exit: closure.exit_time,
                });
            }
        }
        let ParkingSessionDraft {
            id,
            owner_name,
            owner_mobile,
            plate,
            vehicle_class,
            slot_id,
            entry_time,
        } = draft;
        Ok(Self {
            id,
            owner_name,
            owner_mobile,
            plate,
            vehicle_class,
            slot_id,
            entry_time,
            closure,
        })
    }

    /// Record the exit. Fails if the session is already closed or the exit
    /// precedes the entry; the session is left untouched on failure.
    pub fn close(&mut self, closure: SessionClosure) -> Result<(), SessionCloseError> {
        if self.closure.is_some() {
            return Err(SessionCloseError::AlreadyClosed);
        }
        if closure.exit_time < self.entry_time {
            return Err(SessionCloseError::Invalid(
                ParkingSessionValidationError::ExitBeforeEntry {
                    entry: self.entry_time,
                    exit: closure.exit_time,
                },
            ));
        }
        self.closure = Some(closure);
        Ok(())
    }

    /// Drop a recorded closure, returning the session to the active state.
    pub fn reopen(&mut self) {
        self.closure = None;
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn owner_name(&self) -> &OwnerName {
        &self.owner_name
    }

    pub fn owner_mobile(&self) -> &MobileNumber {
        &self.owner_mobile
    }

    pub fn plate(&self) -> &PlateNumber {
        &self.plate
    }

    pub fn vehicle_class(&self) -> VehicleClass {
        self.vehicle_class
    }

    pub fn slot_id(&self) -> SlotId {
        self.slot_id
    }

    pub fn entry_time(&self) -> DateTime<Utc> {
        self.entry_time
    }

    pub fn closure(&self) -> Option<&SessionClosure> {
        self.closure.as_ref()
    }

    /// Whether the vehicle is still parked.
    pub fn is_active(&self) -> bool {
        self.closure.is_none()
    }

    pub fn exit_time(&self) -> Option<DateTime<Utc>> {
        self.closure.as_ref().map(|c| c.exit_time)
    }

    /// Recorded fee; zero while active.
    pub fn fee(&self) -> u64 {
        self.closure.as_ref().map_or(0, |c| c.fee)
    }
}

/// Raised by [`ParkingSession::close`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionCloseError {
    #[error("session is already closed")]
    AlreadyClosed,
    #[error(transparent)]
    Invalid(#[from] ParkingSessionValidationError),
}
