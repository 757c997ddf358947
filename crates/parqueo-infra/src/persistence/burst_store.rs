//! Persisted marker for the burst currently being ingested
//!
//! Camera requests arrive as independent units of work, so the burst state
//! that links second/third-angle photos to their session lives on disk
//! between them.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

use parqueo_domain::service::Burst;
use parqueo_types::Result;

pub struct BurstStore {
    store_path: PathBuf,
}

impl BurstStore {
    pub fn open(store_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&store_dir)?;
        Ok(Self {
            store_path: store_dir.join("burst.json"),
        })
    }

    pub fn load(&self) -> Result<Option<Burst>> {
        if !self.store_path.exists() {
            return Ok(None);
        }
        let file = File::open(&self.store_path)?;
        let reader = BufReader::new(file);
        Ok(serde_json::from_reader(reader).unwrap_or_default())
    }

    pub fn save(&self, burst: &Option<Burst>) -> Result<()> {
        let file = File::create(&self.store_path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, burst)?;
        Ok(())
    }
}
