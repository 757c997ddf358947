//! Repository trait definitions for data persistence

use chrono::NaiveTime;
use uuid::Uuid;

use parqueo_types::{Plate, Result};

use crate::model::{ParkingSession, Photo, TariffConfig};

/// Filters for session listing.
#[derive(Debug, Clone, Default)]
pub struct SessionFilter {
    pub active: Option<bool>,
    /// Substring match on the plate.
    pub plate_contains: Option<String>,
    pub limit: Option<usize>,
}

/// Repository for parking sessions.
///
/// Implementations own the one-Active-session-per-plate invariant:
/// `create` must reject a duplicate Active plate with `Error::Conflict`,
/// and `find_or_create_active` must run the plate lookup and the insert as
/// one atomic step so two near-simultaneous bursts cannot race into two
/// sessions.
pub trait SessionRepository {
    /// Insert a new Active session. Fails with `Conflict` if an Active
    /// session already exists for the plate.
    fn create(&self, session: &ParkingSession) -> Result<()>;

    fn find_active_by_plate(&self, plate: &Plate) -> Result<Option<ParkingSession>>;

    fn find_by_id(&self, id: Uuid) -> Result<Option<ParkingSession>>;

    /// Atomic find-or-insert keyed by plate. Returns the session and
    /// whether it was created by this call.
    fn find_or_create_active(&self, candidate: ParkingSession)
        -> Result<(ParkingSession, bool)>;

    /// Atomically transition Active → Closed, recording exit time and cost
    /// in the same write. Fails with `NotFound` for an unknown id and with
    /// `Conflict` if the session is already Closed, identically on every
    /// retry.
    fn update_on_close(&self, id: Uuid, exit_time: NaiveTime, cost: f64)
        -> Result<ParkingSession>;

    fn set_photo_count(&self, id: Uuid, photo_count: u32) -> Result<()>;

    fn find_all(&self, filter: &SessionFilter) -> Result<Vec<ParkingSession>>;
}

/// Repository for entry photos.
pub trait PhotoRepository {
    fn insert(&self, photo: &Photo) -> Result<()>;

    /// Entry photos of a session, ordered by angle.
    fn list_entry_by_session(&self, session_id: Uuid) -> Result<Vec<Photo>>;

    fn find_by_id(&self, id: Uuid) -> Result<Option<Photo>>;

    /// Replace the detected plate and confidence on a photo. The owning
    /// session is untouched.
    fn update_plate(&self, id: Uuid, plate: &Plate, confidence: f32) -> Result<Photo>;

    /// Remove a photo record, returning it so the caller can clean up the
    /// stored asset.
    fn delete(&self, id: Uuid) -> Result<Photo>;
}

/// Repository for the canonical tariff record.
pub trait TariffRepository {
    /// Most recently written tariff, if any has been configured.
    fn current(&self) -> Result<Option<TariffConfig>>;

    /// Overwrite the canonical record.
    fn write(&self, config: &TariffConfig) -> Result<()>;
}
