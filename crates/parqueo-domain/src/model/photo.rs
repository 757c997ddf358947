//! Entry photo model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use parqueo_types::{PhotoAngle, Plate};

/// One camera photo persisted against a session.
///
/// A photo whose burst never resolved a session is never persisted, so
/// `session_id` is always set on stored photos.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Photo {
    pub id: Uuid,
    pub session_id: Uuid,
    pub angle: PhotoAngle,
    pub detected_plate: Option<Plate>,
    /// OCR confidence in [0, 1]; 1.0 after a manual correction.
    pub confidence: Option<f32>,
    /// Path of the stored image file, relative to the uploads directory.
    pub asset_path: String,
    pub created_at: DateTime<Utc>,
}

impl Photo {
    pub fn new(
        session_id: Uuid,
        angle: PhotoAngle,
        detected_plate: Option<Plate>,
        confidence: Option<f32>,
        asset_path: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            session_id,
            angle,
            detected_plate,
            confidence,
            asset_path,
            created_at: Utc::now(),
        }
    }
}
