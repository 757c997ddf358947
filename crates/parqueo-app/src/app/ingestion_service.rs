//! Photo ingestion use case
//!
//! One ingested photo runs the full pipeline: validate the file, build
//! candidate buffers, run the bounded recognition search, reconcile against
//! the session store, and persist the photo record plus its asset. A photo
//! whose burst resolves no session is reported back unpersisted.

use std::path::Path;
use std::time::{Duration, Instant};

use chrono::{Local, NaiveTime, Utc};
use uuid::Uuid;

use parqueo_domain::model::Photo;
use parqueo_domain::repository::{PhotoRepository, SessionRepository};
use parqueo_domain::service::{Reconciliation, SessionReconciler};
use parqueo_infra::persistence::BurstStore;
use parqueo_infra::PhotoAssetStore;
use parqueo_types::{PhotoAngle, RecognitionResult, VehicleType};
use parqueo_vision::{candidate_buffers, recognize_plate, OcrEngine};

use crate::app::{ServiceError, ServiceResult};
use crate::scanner::validate_image;

/// Upper bound on accepted photo size.
pub const MAX_PHOTO_BYTES: u64 = 5 * 1024 * 1024;

/// Result of ingesting one photo.
#[derive(Debug, Clone)]
pub struct IngestPhotoOutcome {
    pub recognition: RecognitionResult,
    /// Session the photo was filed under, when one resolved.
    pub session_id: Option<Uuid>,
    pub session_created: bool,
    /// Persisted photo record; `None` when no session resolved.
    pub photo: Option<Photo>,
}

pub struct IngestionService<'a> {
    sessions: &'a dyn SessionRepository,
    photos: &'a dyn PhotoRepository,
    assets: &'a PhotoAssetStore,
    bursts: &'a BurstStore,
    engine: &'a dyn OcrEngine,
    recognition_timeout: Duration,
    burst_window_secs: i64,
}

impl<'a> IngestionService<'a> {
    pub fn new(
        sessions: &'a dyn SessionRepository,
        photos: &'a dyn PhotoRepository,
        assets: &'a PhotoAssetStore,
        bursts: &'a BurstStore,
        engine: &'a dyn OcrEngine,
        recognition_timeout: Duration,
        burst_window_secs: i64,
    ) -> Self {
        Self {
            sessions,
            photos,
            assets,
            bursts,
            engine,
            recognition_timeout,
            burst_window_secs,
        }
    }

    /// Ingest a photo file stamped with the current wall-clock time.
    pub fn ingest_photo(
        &self,
        path: &Path,
        angle: PhotoAngle,
        vehicle_type: VehicleType,
    ) -> ServiceResult<IngestPhotoOutcome> {
        self.ingest_photo_at(path, angle, vehicle_type, Local::now().time())
    }

    /// Ingest a photo file with an explicit entry time.
    pub fn ingest_photo_at(
        &self,
        path: &Path,
        angle: PhotoAngle,
        vehicle_type: VehicleType,
        entry_time: NaiveTime,
    ) -> ServiceResult<IngestPhotoOutcome> {
        validate_image(path)?;

        let meta = std::fs::metadata(path).map_err(|e| ServiceError::Storage(e.to_string()))?;
        if meta.len() > MAX_PHOTO_BYTES {
            return Err(ServiceError::InvalidInput(format!(
                "photo exceeds {} byte limit: {} bytes",
                MAX_PHOTO_BYTES,
                meta.len()
            )));
        }

        let bytes = std::fs::read(path).map_err(|e| ServiceError::Storage(e.to_string()))?;
        let candidates = candidate_buffers(&bytes)?;

        let deadline = Instant::now() + self.recognition_timeout;
        let recognition = recognize_plate(self.engine, &candidates, Some(deadline));
        log::info!(
            "recognition for {}: {}",
            path.display(),
            recognition.message
        );

        let reconciler =
            SessionReconciler::new(self.sessions).with_burst_window(self.burst_window_secs);
        let mut burst = self.bursts.load()?;
        let outcome = reconciler.reconcile_entry_photo(
            angle,
            &recognition,
            vehicle_type,
            entry_time,
            Utc::now(),
            &mut burst,
        )?;
        self.bursts.save(&burst)?;

        let (session, created) = match outcome {
            Reconciliation::Resolved { session, created } => (session, created),
            Reconciliation::Attached { session } => (session, false),
            Reconciliation::Unresolved => {
                return Ok(IngestPhotoOutcome {
                    recognition,
                    session_id: None,
                    session_created: false,
                    photo: None,
                });
            }
        };

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("jpg")
            .to_lowercase();
        let asset = self.assets.save(&bytes, &extension)?;

        let confidence = recognition.success.then_some(recognition.confidence);
        let photo = Photo::new(
            session.id,
            angle,
            recognition.plate.clone(),
            confidence,
            asset,
        );
        self.photos.insert(&photo)?;

        Ok(IngestPhotoOutcome {
            recognition,
            session_id: Some(session.id),
            session_created: created,
            photo: Some(photo),
        })
    }
}
