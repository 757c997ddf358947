//! Infrastructure layer for parqueo: file-backed repositories and photo
//! asset storage.

pub mod persistence;
pub mod photo_assets;

pub use photo_assets::PhotoAssetStore;
