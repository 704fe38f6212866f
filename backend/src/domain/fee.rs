//! Time-based parking fees.
//!
//! Pure functions only: callers pass the entry and exit instants and receive
//! a quote. Durations round up to whole hours with a one-hour minimum.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::VehicleClass;

const SECONDS_PER_HOUR: i64 = 3600;

/// Hourly rates per vehicle class, in whole currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeSchedule {
    pub two_wheeler_rate: u64,
    pub four_wheeler_rate: u64,
}

impl FeeSchedule {
    /// Rates charged by the reference deployment.
    pub const REFERENCE: Self = Self {
        two_wheeler_rate: 30,
        four_wheeler_rate: 60,
    };

    /// Hourly rate for `vehicle_class`.
    pub fn rate_for(&self, vehicle_class: VehicleClass) -> u64 {
        match vehicle_class {
            VehicleClass::TwoWheeler => self.two_wheeler_rate,
            VehicleClass::FourWheeler => self.four_wheeler_rate,
        }
    }
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self::REFERENCE
    }
}

/// Fee and billed duration for a stay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeeQuote {
    #[schema(example = 60)]
    pub fee: u64,
    #[schema(example = 2)]
    pub duration_hours: u32,
}

/// Raised when a fee cannot be computed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeeError {
    #[error("exit time {exit} precedes entry time {entry}")]
    NegativeDuration {
        entry: DateTime<Utc>,
        exit: DateTime<Utc>,
    },
    #[error("stay from {entry} to {exit} is too long to bill")]
    Overflow {
        entry: DateTime<Utc>,
        exit: DateTime<Utc>,
    },
}

/// Compute the fee for a stay of `vehicle_class` from `entry` to `exit`.
///
/// Sub-second precision is dropped before rounding up to whole hours, and any
/// stay (including zero seconds) bills at least one hour.
///
/// # Examples
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use lotkeeper::domain::{FeeSchedule, VehicleClass, compute_fee};
///
/// let entry = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
/// let quote = compute_fee(
///     &FeeSchedule::REFERENCE,
///     VehicleClass::TwoWheeler,
///     entry,
///     entry + Duration::minutes(90),
/// )
/// .unwrap();
/// assert_eq!((quote.fee, quote.duration_hours), (60, 2));
/// ```
pub fn compute_fee(
    schedule: &FeeSchedule,
    vehicle_class: VehicleClass,
    entry: DateTime<Utc>,
    exit: DateTime<Utc>,
) -> Result<FeeQuote, FeeError> {
    let seconds = (exit - entry).num_seconds();
    if seconds < 0 {
        return Err(FeeError::NegativeDuration { entry, exit });
    }
    let overflow = || FeeError::Overflow { entry, exit };
    let rounded = seconds
        .checked_add(SECONDS_PER_HOUR - 1)
        .ok_or_else(overflow)?
        / SECONDS_PER_HOUR;
    let duration_hours = u32::try_from(rounded.max(1)).map_err(|_| overflow())?;
    let fee = u64::from(duration_hours)
        .checked_mul(schedule.rate_for(vehicle_class))
        .ok_or_else(overflow)?;
    Ok(FeeQuote {
        fee,
        duration_hours,
    })
}

#[cfg(test)]
mod tests {
    //! Regression coverage for fee rounding and rates.
    use super::*;
    use chrono::{Duration, TimeZone};
    use rstest::{fixture, rstest};

    #[fixture]
    fn entry() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    #[rstest]
    #[case(Duration::zero(), VehicleClass::TwoWheeler, 1, 30)]
    #[case(Duration::seconds(1), VehicleClass::TwoWheeler, 1, 30)]
    #[case(Duration::milliseconds(999), VehicleClass::FourWheeler, 1, 60)]
    #[case(Duration::hours(1), VehicleClass::FourWheeler, 1, 60)]
    #[case(Duration::seconds(3601), VehicleClass::FourWheeler, 2, 120)]
    #[case(Duration::seconds(3661), VehicleClass::TwoWheeler, 2, 60)]
    #[case(Duration::seconds(1), VehicleClass::FourWheeler, 1, 60)]
    #[case(Duration::minutes(90), VehicleClass::TwoWheeler, 2, 60)]
    #[case(Duration::hours(24), VehicleClass::FourWheeler, 24, 1440)]
    fn rounds_up_to_whole_hours(
        entry: DateTime<Utc>,
        #[case] stay: Duration,
        #[case] class: VehicleClass,
        #[case] hours: u32,
        #[case] fee: u64,
    ) {
        let quote = compute_fee(&FeeSchedule::REFERENCE, class, entry, entry + stay)
            .expect("valid range");
        assert_eq!(quote, FeeQuote {
            fee,
            duration_hours: hours
        });
    }

    #[rstest]
    fn rejects_exit_before_entry(entry: DateTime<Utc>) {
        let result = compute_fee(
            &FeeSchedule::REFERENCE,
            VehicleClass::TwoWheeler,
            entry,
            entry - Duration::seconds(1),
        );
        assert!(matches!(result, Err(FeeError::NegativeDuration { .. })));
    }

    #[rstest]
    fn is_deterministic(entry: DateTime<Utc>) {
        let exit = entry + Duration::minutes(137);
        let first = compute_fee(&FeeSchedule::REFERENCE, VehicleClass::FourWheeler, entry, exit);
        let second = compute_fee(&FeeSchedule::REFERENCE, VehicleClass::FourWheeler, entry, exit);
        assert_eq!(first, second);
    }

    #[rstest]
    fn custom_schedule_applies(entry: DateTime<Utc>) {
        let schedule = FeeSchedule {
            two_wheeler_rate: 15,
            four_wheeler_rate: 45,
        };
        let quote = compute_fee(
            &schedule,
            VehicleClass::TwoWheeler,
            entry,
            entry + Duration::hours(3),
        )
        .expect("valid range");
        assert_eq!(quote.fee, 45);
    }

    #[rstest]
    fn reports_overflow_for_absurd_rates(entry: DateTime<Utc>) {
        let schedule = FeeSchedule {
            two_wheeler_rate: u64::MAX,
            four_wheeler_rate: u64::MAX,
        };
        let result = compute_fee(
            &schedule,
            VehicleClass::FourWheeler,
            entry,
            entry + Duration::hours(2),
        );
        assert!(matches!(result, Err(FeeError::Overflow { .. })));
    }
}
