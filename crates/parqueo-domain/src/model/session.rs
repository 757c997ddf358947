//! Parking session model

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use parqueo_types::{Plate, VehicleType};

/// Lifecycle state of a session.
///
/// Exit time and cost only exist on `Closed`, so "Active with an exit time"
/// or "Closed without a cost" cannot be represented.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum SessionState {
    Active,
    Closed {
        /// Wall-clock exit time, same day as entry.
        exit_time: NaiveTime,
        cost: f64,
    },
}

/// One parking visit, entry to exit.
///
/// Invariant (enforced by the session repository): at most one Active
/// session per plate at any time. Plate, entry time, exit time and cost are
/// frozen once the session is Closed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParkingSession {
    pub id: Uuid,
    pub plate: Plate,
    pub vehicle_type: VehicleType,
    /// Wall-clock entry time; no date component.
    pub entry_time: NaiveTime,
    pub state: SessionState,
    /// Persisted entry photos for this session.
    pub photo_count: u32,
    pub created_at: DateTime<Utc>,
}

impl ParkingSession {
    /// Open a new Active session at the given entry time.
    pub fn open(plate: Plate, vehicle_type: VehicleType, entry_time: NaiveTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            plate,
            vehicle_type,
            entry_time,
            state: SessionState::Active,
            photo_count: 0,
            created_at: Utc::now(),
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, SessionState::Active)
    }

    pub fn exit_time(&self) -> Option<NaiveTime> {
        match self.state {
            SessionState::Active => None,
            SessionState::Closed { exit_time, .. } => Some(exit_time),
        }
    }

    pub fn cost(&self) -> Option<f64> {
        match self.state {
            SessionState::Active => None,
            SessionState::Closed { cost, .. } => Some(cost),
        }
    }
}
