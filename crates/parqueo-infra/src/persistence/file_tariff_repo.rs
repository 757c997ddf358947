//! File-based implementation of TariffRepository

use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;

use fs2::FileExt;

use parqueo_domain::model::TariffConfig;
use parqueo_domain::repository::TariffRepository;
use parqueo_types::Result;

/// The single canonical tariff record, stored as one JSON file.
/// Latest write wins; there is no history. Reads re-read the file so a
/// write from another process is visible immediately.
pub struct FileTariffRepository {
    store_path: PathBuf,
    lock_path: PathBuf,
}

impl FileTariffRepository {
    /// Create or open the tariff store under `store_dir`.
    pub fn open(store_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&store_dir)?;
        Ok(Self {
            store_path: store_dir.join("tariff.json"),
            lock_path: store_dir.join("tariff.lock"),
        })
    }

    fn lock(&self, exclusive: bool) -> Result<File> {
        let lock = OpenOptions::new()
            .create(true)
            .write(true)
            .open(&self.lock_path)?;
        if exclusive {
            lock.lock_exclusive()?;
        } else {
            lock.lock_shared()?;
        }
        Ok(lock)
    }
}

impl TariffRepository for FileTariffRepository {
    fn current(&self) -> Result<Option<TariffConfig>> {
        let _lock = self.lock(false)?;
        if !self.store_path.exists() {
            return Ok(None);
        }
        let file = File::open(&self.store_path)?;
        let reader = BufReader::new(file);
        Ok(serde_json::from_reader(reader).ok())
    }

    fn write(&self, config: &TariffConfig) -> Result<()> {
        let _lock = self.lock(true)?;
        let tmp = self.store_path.with_extension("json.tmp");
        {
            let file = File::create(&tmp)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, config)?;
            writer.flush()?;
        }
        fs::rename(&tmp, &self.store_path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_empty_store_has_no_tariff() {
        let dir = tempdir().unwrap();
        let repo = FileTariffRepository::open(dir.path().to_path_buf()).unwrap();
        assert!(repo.current().unwrap().is_none());
    }

    #[test]
    fn test_latest_write_wins() {
        let dir = tempdir().unwrap();
        let repo = FileTariffRepository::open(dir.path().to_path_buf()).unwrap();

        let first = TariffConfig::new(3000.0, 60000.0, 35000.0, 70000.0).unwrap();
        repo.write(&first).unwrap();
        let mut second = first.clone();
        second.set_hourly_rate(4500.0).unwrap();
        repo.write(&second).unwrap();

        assert_eq!(repo.current().unwrap().unwrap().hourly_rate, 4500.0);
    }

    #[test]
    fn test_write_is_visible_to_another_handle() {
        let dir = tempdir().unwrap();
        let repo_a = FileTariffRepository::open(dir.path().to_path_buf()).unwrap();
        let repo_b = FileTariffRepository::open(dir.path().to_path_buf()).unwrap();

        let tariff = TariffConfig::new(3000.0, 60000.0, 35000.0, 70000.0).unwrap();
        repo_a.write(&tariff).unwrap();
        assert_eq!(repo_b.current().unwrap(), Some(tariff));
    }

    #[test]
    fn test_tariff_survives_reopen() {
        let dir = tempdir().unwrap();
        let tariff = TariffConfig::new(3000.0, 60000.0, 35000.0, 70000.0).unwrap();
        {
            let repo = FileTariffRepository::open(dir.path().to_path_buf()).unwrap();
            repo.write(&tariff).unwrap();
        }
        let repo = FileTariffRepository::open(dir.path().to_path_buf()).unwrap();
        assert_eq!(repo.current().unwrap(), Some(tariff));
    }
}
