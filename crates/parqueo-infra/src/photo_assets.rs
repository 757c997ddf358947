//! Physical storage for ingested photo files
//!
//! Assets are content-addressed: the filename is the SHA-256 of the bytes,
//! so re-ingesting the same frame never duplicates storage.

use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use parqueo_types::Result;

pub struct PhotoAssetStore {
    uploads_dir: PathBuf,
}

impl PhotoAssetStore {
    /// Create or open the uploads directory.
    pub fn open(uploads_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&uploads_dir)?;
        Ok(Self { uploads_dir })
    }

    /// Store photo bytes, returning the asset name to persist on the
    /// Photo record.
    pub fn save(&self, bytes: &[u8], extension: &str) -> Result<String> {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        let name = format!("{:x}.{}", hasher.finalize(), extension);
        let path = self.uploads_dir.join(&name);
        if !path.exists() {
            fs::write(&path, bytes)?;
        }
        Ok(name)
    }

    /// Absolute path of a stored asset.
    pub fn path_of(&self, asset: &str) -> PathBuf {
        self.uploads_dir.join(asset)
    }

    /// Best-effort removal: a failed unlink is logged as a warning and
    /// never fails the owning delete operation.
    pub fn delete(&self, asset: &str) {
        let path = self.uploads_dir.join(asset);
        if let Err(err) = fs::remove_file(&path) {
            log::warn!("could not delete photo asset {}: {}", path.display(), err);
        }
    }

    pub fn uploads_dir(&self) -> &Path {
        &self.uploads_dir
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_save_is_content_addressed() {
        let dir = tempdir().unwrap();
        let store = PhotoAssetStore::open(dir.path().to_path_buf()).unwrap();

        let a = store.save(b"frame bytes", "jpg").unwrap();
        let b = store.save(b"frame bytes", "jpg").unwrap();
        assert_eq!(a, b);
        assert!(store.path_of(&a).exists());
    }

    #[test]
    fn test_delete_removes_the_file() {
        let dir = tempdir().unwrap();
        let store = PhotoAssetStore::open(dir.path().to_path_buf()).unwrap();

        let name = store.save(b"frame", "png").unwrap();
        store.delete(&name);
        assert!(!store.path_of(&name).exists());
    }

    #[test]
    fn test_delete_of_missing_asset_does_not_panic() {
        let dir = tempdir().unwrap();
        let store = PhotoAssetStore::open(dir.path().to_path_buf()).unwrap();
        store.delete("does-not-exist.jpg");
    }
}
