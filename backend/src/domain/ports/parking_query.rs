//! Driving port for parking lot reads.
//!
//! Reads never take the keyed mutation locks; they see whatever the stores
//! hold at the time of the call.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{FeeQuote, ParkingError, ParkingSession, Slot, SlotId, VehicleClass};

/// Default number of history rows returned per page.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;
/// Upper bound applied to requested history page sizes.
pub const MAX_HISTORY_LIMIT: usize = 500;

/// Page of parking history to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryPage {
    pub limit: usize,
    pub offset: usize,
}

impl HistoryPage {
    /// Build a page, clamping `limit` to [`MAX_HISTORY_LIMIT`].
    pub fn new(limit: Option<usize>, offset: Option<usize>) -> Self {
        Self {
            limit: limit
                .unwrap_or(DEFAULT_HISTORY_LIMIT)
                .min(MAX_HISTORY_LIMIT),
            offset: offset.unwrap_or(0),
        }
    }
}

impl Default for HistoryPage {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Totals for one vehicle class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClassOccupancy {
    pub vehicle_class: VehicleClass,
    pub total: u32,
    pub available: u32,
    pub occupied: u32,
}

/// Lot-wide occupancy, one entry per vehicle class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OccupancySummary {
    pub classes: Vec<ClassOccupancy>,
}

impl OccupancySummary {
    /// Tally occupancy from a full slot listing.
    pub fn from_slots(slots: &[Slot]) -> Self {
        let classes = VehicleClass::ALL
            .into_iter()
            .map(|vehicle_class| {
                let (total, occupied) = slots
                    .iter()
                    .filter(|slot| slot.vehicle_class() == vehicle_class)
                    .fold((0_u32, 0_u32), |(total, occupied), slot| {
                        (
                            total.saturating_add(1),
                            occupied.saturating_add(u32::from(slot.occupied())),
                        )
                    });
                ClassOccupancy {
                    vehicle_class,
                    total,
                    available: total - occupied,
                    occupied,
                }
            })
            .collect();
        Self { classes }
    }
}

/// Driving port for parking lot reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ParkingQuery: Send + Sync {
    async fn list_available_slots(
        &self,
        vehicle_class: VehicleClass,
    ) -> Result<Vec<SlotId>, ParkingError>;

    async fn list_all_slots(&self) -> Result<Vec<Slot>, ParkingError>;

    /// Active sessions, oldest entry first.
    async fn list_active_vehicles(&self) -> Result<Vec<ParkingSession>, ParkingError>;

    /// Preview the fee for an active session as of now. Changes nothing.
    async fn quote_exit(&self, session_id: &str) -> Result<FeeQuote, ParkingError>;

    /// Closed sessions, most recent exit first.
    async fn list_history(&self, page: HistoryPage) -> Result<Vec<ParkingSession>, ParkingError>;

    async fn occupancy_summary(&self) -> Result<OccupancySummary, ParkingError>;
}
