//! Session reconciliation state machine
//!
//! Maps a detected (or absent) plate plus burst metadata onto session
//! creation, reuse, or attachment, and drives the Active → Closed exit
//! transition. The per-plate uniqueness itself lives in the repository
//! (`find_or_create_active` / `create`); this service sequences the calls.

use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use parqueo_types::{Error, PhotoAngle, RecognitionResult, Result, VehicleType};

use crate::model::{ParkingSession, SessionState};
use crate::repository::SessionRepository;
use crate::service::tariff::{self, Quote};

/// A burst captures up to three angle photos for one entry event.
pub const MAX_BURST_PHOTOS: u32 = 3;

/// How long a resolved burst stays attachable for follow-up angles.
pub const DEFAULT_BURST_WINDOW_SECS: i64 = 120;

/// Marker for the burst currently being ingested. Camera requests arrive as
/// independent units of work, so this is persisted between them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Burst {
    pub session_id: Uuid,
    /// Photos persisted for this burst so far, ≤ [`MAX_BURST_PHOTOS`].
    pub photo_count: u32,
    pub started_at: DateTime<Utc>,
}

impl Burst {
    pub fn is_live(&self, now: DateTime<Utc>, window_secs: i64) -> bool {
        now.signed_duration_since(self.started_at) <= Duration::seconds(window_secs)
    }
}

/// Outcome of reconciling one ingested photo.
#[derive(Debug, Clone)]
pub enum Reconciliation {
    /// First-angle photo resolved a session. `created` is false when an
    /// Active session for the plate was reused.
    Resolved {
        session: ParkingSession,
        created: bool,
    },
    /// Follow-up angle attached to the burst's session.
    Attached { session: ParkingSession },
    /// No session could be resolved; the photo must not be persisted and
    /// the caller is told synchronously.
    Unresolved,
}

pub struct SessionReconciler<'a> {
    sessions: &'a dyn SessionRepository,
    burst_window_secs: i64,
}

impl<'a> SessionReconciler<'a> {
    pub fn new(sessions: &'a dyn SessionRepository) -> Self {
        Self {
            sessions,
            burst_window_secs: DEFAULT_BURST_WINDOW_SECS,
        }
    }

    pub fn with_burst_window(mut self, secs: i64) -> Self {
        self.burst_window_secs = secs;
        self
    }

    /// Reconcile one entry photo against the session store, updating the
    /// burst marker in place.
    pub fn reconcile_entry_photo(
        &self,
        angle: PhotoAngle,
        recognition: &RecognitionResult,
        vehicle_type: VehicleType,
        entry_time: NaiveTime,
        now: DateTime<Utc>,
        burst: &mut Option<Burst>,
    ) -> Result<Reconciliation> {
        if !angle.is_entry() {
            return Err(Error::Validation(format!(
                "not an entry angle: {}",
                angle
            )));
        }

        if angle.is_first_angle() {
            return self.reconcile_first_angle(recognition, vehicle_type, entry_time, now, burst);
        }
        self.reconcile_follow_up(now, burst)
    }

    fn reconcile_first_angle(
        &self,
        recognition: &RecognitionResult,
        vehicle_type: VehicleType,
        entry_time: NaiveTime,
        now: DateTime<Utc>,
        burst: &mut Option<Burst>,
    ) -> Result<Reconciliation> {
        let plate = match &recognition.plate {
            Some(plate) => plate.clone(),
            None => {
                // A first angle without a validated plate aborts the burst;
                // the photo stays unpersisted for manual handling.
                *burst = None;
                return Ok(Reconciliation::Unresolved);
            }
        };

        let candidate = ParkingSession::open(plate, vehicle_type, entry_time);
        let (session, created) = self.sessions.find_or_create_active(candidate)?;

        let photo_count = session.photo_count + 1;
        self.sessions.set_photo_count(session.id, photo_count)?;

        *burst = Some(Burst {
            session_id: session.id,
            photo_count: 1,
            started_at: now,
        });

        let mut session = session;
        session.photo_count = photo_count;
        Ok(Reconciliation::Resolved { session, created })
    }

    fn reconcile_follow_up(
        &self,
        now: DateTime<Utc>,
        burst: &mut Option<Burst>,
    ) -> Result<Reconciliation> {
        let live = match burst {
            Some(b) if b.is_live(now, self.burst_window_secs) => b,
            _ => {
                // Stale or absent burst: a follow-up angle never creates a
                // session on its own.
                *burst = None;
                return Ok(Reconciliation::Unresolved);
            }
        };

        let session = match self.sessions.find_by_id(live.session_id)? {
            Some(s) if s.is_active() => s,
            _ => {
                *burst = None;
                return Ok(Reconciliation::Unresolved);
            }
        };

        if live.photo_count >= MAX_BURST_PHOTOS {
            return Ok(Reconciliation::Unresolved);
        }
        live.photo_count += 1;

        let photo_count = session.photo_count + 1;
        self.sessions.set_photo_count(session.id, photo_count)?;

        let mut session = session;
        session.photo_count = photo_count;
        Ok(Reconciliation::Attached { session })
    }

    /// Register a manual entry. The repository's uniqueness constraint
    /// turns a duplicate Active plate into a `Conflict`.
    pub fn register_manual_entry(
        &self,
        session: ParkingSession,
    ) -> Result<ParkingSession> {
        self.sessions.create(&session)?;
        Ok(session)
    }

    /// Register an exit: the session must exist and be Active, the duration
    /// strictly positive. Cost and state change are one atomic repository
    /// write.
    pub fn register_exit(
        &self,
        id: Uuid,
        exit_time: NaiveTime,
        hourly_rate: f64,
    ) -> Result<(ParkingSession, Quote)> {
        let session = self
            .sessions
            .find_by_id(id)?
            .ok_or_else(|| Error::NotFound(format!("session {}", id)))?;

        if let SessionState::Closed { .. } = session.state {
            return Err(Error::Conflict(format!("session {} is already closed", id)));
        }

        let quote = tariff::quote(session.entry_time, exit_time, hourly_rate)?;
        let closed = self.sessions.update_on_close(id, exit_time, quote.cost)?;
        Ok((closed, quote))
    }
}
