//! Session lifecycle use cases: manual entry, exit billing, listing,
//! photo review and correction.

use chrono::NaiveTime;
use uuid::Uuid;

use parqueo_domain::model::{ParkingSession, Photo};
use parqueo_domain::repository::{
    PhotoRepository, SessionFilter, SessionRepository, TariffRepository,
};
use parqueo_domain::service::{Quote, SessionReconciler};
use parqueo_infra::PhotoAssetStore;
use parqueo_types::{Plate, VehicleType};

use crate::app::{ServiceError, ServiceResult};

/// Closed session together with the quote that priced it.
#[derive(Debug, Clone)]
pub struct ExitReceipt {
    pub session: ParkingSession,
    pub quote: Quote,
}

pub struct SessionService<'a> {
    sessions: &'a dyn SessionRepository,
    photos: &'a dyn PhotoRepository,
    tariffs: &'a dyn TariffRepository,
    assets: &'a PhotoAssetStore,
}

impl<'a> SessionService<'a> {
    pub fn new(
        sessions: &'a dyn SessionRepository,
        photos: &'a dyn PhotoRepository,
        tariffs: &'a dyn TariffRepository,
        assets: &'a PhotoAssetStore,
    ) -> Self {
        Self {
            sessions,
            photos,
            tariffs,
            assets,
        }
    }

    /// Open a session by hand, bypassing recognition. Fails with a conflict
    /// when the plate already has an Active session.
    pub fn manual_entry(
        &self,
        plate: Plate,
        vehicle_type: VehicleType,
        entry_time: NaiveTime,
    ) -> ServiceResult<ParkingSession> {
        let reconciler = SessionReconciler::new(self.sessions);
        let session = reconciler
            .register_manual_entry(ParkingSession::open(plate, vehicle_type, entry_time))?;
        log::info!("manual entry opened session {}", session.id);
        Ok(session)
    }

    /// Close a session at `exit_time`, billing by the configured hourly
    /// rate. Exit requires a configured tariff.
    pub fn register_exit(&self, id: Uuid, exit_time: NaiveTime) -> ServiceResult<ExitReceipt> {
        let tariff = self
            .tariffs
            .current()?
            .ok_or_else(|| ServiceError::NotFound("no tariff configured".to_string()))?;

        let reconciler = SessionReconciler::new(self.sessions);
        let (session, quote) = reconciler.register_exit(id, exit_time, tariff.hourly_rate)?;
        log::info!(
            "session {} closed: {} min, {} billed hours, cost {}",
            session.id,
            quote.elapsed_minutes,
            quote.billed_hours,
            quote.cost
        );
        Ok(ExitReceipt { session, quote })
    }

    pub fn find_active_by_plate(&self, plate: &Plate) -> ServiceResult<Option<ParkingSession>> {
        Ok(self.sessions.find_active_by_plate(plate)?)
    }

    pub fn find_by_id(&self, id: Uuid) -> ServiceResult<ParkingSession> {
        self.sessions
            .find_by_id(id)?
            .ok_or_else(|| ServiceError::NotFound(format!("session {}", id)))
    }

    pub fn list_sessions(&self, filter: &SessionFilter) -> ServiceResult<Vec<ParkingSession>> {
        Ok(self.sessions.find_all(filter)?)
    }

    /// Entry photos of a session, ordered by angle.
    pub fn entry_photos(&self, session_id: Uuid) -> ServiceResult<Vec<Photo>> {
        if self.sessions.find_by_id(session_id)?.is_none() {
            return Err(ServiceError::NotFound(format!("session {}", session_id)));
        }
        Ok(self.photos.list_entry_by_session(session_id)?)
    }

    /// Correct the detected plate on one photo. Confidence becomes 1.0 and
    /// the owning session keeps its original plate.
    pub fn correct_plate(&self, photo_id: Uuid, plate: &Plate) -> ServiceResult<Photo> {
        let photo = self.photos.update_plate(photo_id, plate, 1.0)?;
        log::info!("photo {} corrected to plate {}", photo.id, plate);
        Ok(photo)
    }

    /// Delete a photo record and its stored asset. The asset removal is
    /// best-effort; a missing file never fails the delete.
    pub fn delete_photo(&self, photo_id: Uuid) -> ServiceResult<Photo> {
        let photo = self.photos.delete(photo_id)?;
        self.assets.delete(&photo.asset_path);
        Ok(photo)
    }
}
