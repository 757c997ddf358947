//! File-based implementation of PhotoRepository

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;

use fs2::FileExt;
use uuid::Uuid;

use parqueo_domain::model::Photo;
use parqueo_domain::repository::PhotoRepository;
use parqueo_types::{Error, Plate, Result};

/// Photo records stored in a JSON file, re-read under an advisory file
/// lock per operation so handles in separate processes see each other's
/// writes.
pub struct FilePhotoRepository {
    store_path: PathBuf,
    lock_path: PathBuf,
}

impl FilePhotoRepository {
    /// Create or open a photo store under `store_dir`.
    pub fn open(store_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&store_dir)?;
        Ok(Self {
            store_path: store_dir.join("photos.json"),
            lock_path: store_dir.join("photos.lock"),
        })
    }

    fn lock_exclusive(&self) -> Result<File> {
        let lock = OpenOptions::new()
            .create(true)
            .write(true)
            .open(&self.lock_path)?;
        lock.lock_exclusive()?;
        Ok(lock)
    }

    fn lock_shared(&self) -> Result<File> {
        let lock = OpenOptions::new()
            .create(true)
            .write(true)
            .open(&self.lock_path)?;
        lock.lock_shared()?;
        Ok(lock)
    }

    fn load(&self) -> Result<HashMap<Uuid, Photo>> {
        if !self.store_path.exists() {
            return Ok(HashMap::new());
        }
        let file = File::open(&self.store_path)?;
        let reader = BufReader::new(file);
        Ok(serde_json::from_reader(reader).unwrap_or_default())
    }

    /// Temp-file-and-rename write; an error leaves the previous file
    /// intact.
    fn persist(&self, photos: &HashMap<Uuid, Photo>) -> Result<()> {
        let tmp = self.store_path.with_extension("json.tmp");
        {
            let file = File::create(&tmp)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, photos)?;
            writer.flush()?;
        }
        fs::rename(&tmp, &self.store_path)?;
        Ok(())
    }
}

impl PhotoRepository for FilePhotoRepository {
    fn insert(&self, photo: &Photo) -> Result<()> {
        let _lock = self.lock_exclusive()?;
        let mut photos = self.load()?;
        photos.insert(photo.id, photo.clone());
        self.persist(&photos)
    }

    fn list_entry_by_session(&self, session_id: Uuid) -> Result<Vec<Photo>> {
        let _lock = self.lock_shared()?;
        let photos = self.load()?;
        let mut result: Vec<Photo> = photos
            .values()
            .filter(|p| p.session_id == session_id && p.angle.is_entry())
            .cloned()
            .collect();
        result.sort_by_key(|p| p.angle);
        Ok(result)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Photo>> {
        let _lock = self.lock_shared()?;
        Ok(self.load()?.get(&id).cloned())
    }

    fn update_plate(&self, id: Uuid, plate: &Plate, confidence: f32) -> Result<Photo> {
        let _lock = self.lock_exclusive()?;
        let mut photos = self.load()?;
        let photo = photos
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound(format!("photo {}", id)))?;
        photo.detected_plate = Some(plate.clone());
        photo.confidence = Some(confidence);
        let updated = photo.clone();
        self.persist(&photos)?;
        Ok(updated)
    }

    fn delete(&self, id: Uuid) -> Result<Photo> {
        let _lock = self.lock_exclusive()?;
        let mut photos = self.load()?;
        let removed = photos
            .remove(&id)
            .ok_or_else(|| Error::NotFound(format!("photo {}", id)))?;
        self.persist(&photos)?;
        Ok(removed)
    }
}
