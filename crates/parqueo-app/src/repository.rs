//! Repository adapters for persistence layer

use parqueo_infra::persistence::{
    BurstStore, FilePhotoRepository, FileSessionRepository, FileTariffRepository,
};
use parqueo_infra::PhotoAssetStore;
use parqueo_types::Result;

use crate::config::Config;

/// Open file-based session repository
pub fn open_session_repo(config: &Config) -> Result<FileSessionRepository> {
    FileSessionRepository::open(config.store_dir()?)
}

/// Open file-based photo repository
pub fn open_photo_repo(config: &Config) -> Result<FilePhotoRepository> {
    FilePhotoRepository::open(config.store_dir()?)
}

/// Open file-based tariff repository
pub fn open_tariff_repo(config: &Config) -> Result<FileTariffRepository> {
    FileTariffRepository::open(config.store_dir()?)
}

/// Open the content-addressed photo asset store
pub fn open_asset_store(config: &Config) -> Result<PhotoAssetStore> {
    PhotoAssetStore::open(config.uploads_dir()?)
}

/// Open the persisted burst marker store
pub fn open_burst_store(config: &Config) -> Result<BurstStore> {
    BurstStore::open(config.store_dir()?)
}
