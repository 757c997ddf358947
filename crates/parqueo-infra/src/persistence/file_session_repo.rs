//! File-based implementation of SessionRepository

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;

use chrono::NaiveTime;
use fs2::FileExt;
use uuid::Uuid;

use parqueo_domain::model::{ParkingSession, SessionState};
use parqueo_domain::repository::{SessionFilter, SessionRepository};
use parqueo_types::{Error, Plate, Result};

/// Sessions stored in a JSON file, guarded by an advisory lock on a
/// sibling lock file. Every operation re-reads the store under the lock,
/// so the per-plate uniqueness check and the insert are one critical
/// section even across handles in separate processes.
pub struct FileSessionRepository {
    store_path: PathBuf,
    lock_path: PathBuf,
}

impl FileSessionRepository {
    /// Create or open a session store under `store_dir`.
    pub fn open(store_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&store_dir)?;
        Ok(Self {
            store_path: store_dir.join("sessions.json"),
            lock_path: store_dir.join("sessions.lock"),
        })
    }

    /// Exclusive lock for the duration of one critical section. Released
    /// when the returned handle drops.
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

    fn load(&self) -> Result<HashMap<Uuid, ParkingSession>> {
        if !self.store_path.exists() {
            return Ok(HashMap::new());
        }
        let file = File::open(&self.store_path)?;
        let reader = BufReader::new(file);
        Ok(serde_json::from_reader(reader).unwrap_or_default())
    }

    /// Write the full map to a temp file and rename it into place. The
    /// store never holds a half-written state: on any error the previous
    /// file is still intact.
    fn persist(&self, sessions: &HashMap<Uuid, ParkingSession>) -> Result<()> {
        let tmp = self.store_path.with_extension("json.tmp");
        {
            let file = File::create(&tmp)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, sessions)?;
            writer.flush()?;
        }
        fs::rename(&tmp, &self.store_path)?;
        Ok(())
    }
}

impl SessionRepository for FileSessionRepository {
    fn create(&self, session: &ParkingSession) -> Result<()> {
        let _lock = self.lock_exclusive()?;
        let mut sessions = self.load()?;
        if sessions
            .values()
            .any(|s| s.is_active() && s.plate == session.plate)
        {
            return Err(Error::Conflict(format!(
                "active session already exists for plate {}",
                session.plate
            )));
        }
        sessions.insert(session.id, session.clone());
        self.persist(&sessions)
    }

    fn find_active_by_plate(&self, plate: &Plate) -> Result<Option<ParkingSession>> {
        let _lock = self.lock_shared()?;
        let sessions = self.load()?;
        Ok(sessions
            .values()
            .find(|s| s.is_active() && &s.plate == plate)
            .cloned())
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<ParkingSession>> {
        let _lock = self.lock_shared()?;
        Ok(self.load()?.get(&id).cloned())
    }

    fn find_or_create_active(
        &self,
        candidate: ParkingSession,
    ) -> Result<(ParkingSession, bool)> {
        let _lock = self.lock_exclusive()?;
        let mut sessions = self.load()?;
        if let Some(existing) = sessions
            .values()
            .find(|s| s.is_active() && s.plate == candidate.plate)
        {
            return Ok((existing.clone(), false));
        }
        sessions.insert(candidate.id, candidate.clone());
        self.persist(&sessions)?;
        Ok((candidate, true))
    }

    fn update_on_close(
        &self,
        id: Uuid,
        exit_time: NaiveTime,
        cost: f64,
    ) -> Result<ParkingSession> {
        let _lock = self.lock_exclusive()?;
        let mut sessions = self.load()?;
        let session = sessions
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound(format!("session {}", id)))?;
        if !session.is_active() {
            return Err(Error::Conflict(format!("session {} is already closed", id)));
        }
        session.state = SessionState::Closed { exit_time, cost };
        let closed = session.clone();
        self.persist(&sessions)?;
        Ok(closed)
    }

    fn set_photo_count(&self, id: Uuid, photo_count: u32) -> Result<()> {
        let _lock = self.lock_exclusive()?;
        let mut sessions = self.load()?;
        let session = sessions
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound(format!("session {}", id)))?;
        session.photo_count = photo_count;
        self.persist(&sessions)
    }

    fn find_all(&self, filter: &SessionFilter) -> Result<Vec<ParkingSession>> {
        let _lock = self.lock_shared()?;
        let sessions = self.load()?;
        let mut result: Vec<ParkingSession> = sessions
            .values()
            .filter(|s| filter.active.is_none_or(|active| s.is_active() == active))
            .filter(|s| {
                filter
                    .plate_contains
                    .as_ref()
                    .is_none_or(|needle| s.plate.as_str().contains(&needle.to_uppercase()))
            })
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if let Some(limit) = filter.limit {
            result.truncate(limit);
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use parqueo_types::VehicleType;
    use tempfile::tempdir;

    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn session(plate: &str) -> ParkingSession {
        ParkingSession::open(Plate::parse(plate).unwrap(), VehicleType::Car, t(8, 0))
    }

    #[test]
    fn test_create_rejects_duplicate_active_plate() {
        let dir = tempdir().unwrap();
        let repo = FileSessionRepository::open(dir.path().to_path_buf()).unwrap();

        repo.create(&session("ABC123")).unwrap();
        let err = repo.create(&session("ABC123")).unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
    }

    #[test]
    fn test_closed_plate_can_enter_again() {
        let dir = tempdir().unwrap();
        let repo = FileSessionRepository::open(dir.path().to_path_buf()).unwrap();

        let first = session("ABC123");
        repo.create(&first).unwrap();
        repo.update_on_close(first.id, t(9, 0), 3000.0).unwrap();
        repo.create(&session("ABC123")).unwrap();

        let active = repo.find_active_by_plate(&Plate::parse("ABC123").unwrap()).unwrap();
        assert!(active.is_some());
        assert_ne!(active.unwrap().id, first.id);
    }

    #[test]
    fn test_find_or_create_reuses_active_session() {
        let dir = tempdir().unwrap();
        let repo = FileSessionRepository::open(dir.path().to_path_buf()).unwrap();

        let (created, was_created) = repo.find_or_create_active(session("ABC123")).unwrap();
        assert!(was_created);
        let (reused, was_created) = repo.find_or_create_active(session("ABC123")).unwrap();
        assert!(!was_created);
        assert_eq!(created.id, reused.id);
    }

    #[test]
    fn test_find_or_create_is_shared_across_handles() {
        // Two handles on the same directory model two concurrent worker
        // processes ingesting bursts for the same plate.
        let dir = tempdir().unwrap();
        let repo_a = FileSessionRepository::open(dir.path().to_path_buf()).unwrap();
        let repo_b = FileSessionRepository::open(dir.path().to_path_buf()).unwrap();

        let (first, created_a) = repo_a.find_or_create_active(session("ABC123")).unwrap();
        let (second, created_b) = repo_b.find_or_create_active(session("ABC123")).unwrap();

        assert!(created_a);
        assert!(!created_b);
        assert_eq!(first.id, second.id);
        assert_eq!(repo_a.find_all(&SessionFilter::default()).unwrap().len(), 1);
    }

    #[test]
    fn test_writes_from_separate_handles_are_not_lost() {
        let dir = tempdir().unwrap();
        let repo_a = FileSessionRepository::open(dir.path().to_path_buf()).unwrap();
        let repo_b = FileSessionRepository::open(dir.path().to_path_buf()).unwrap();

        let a = session("ABC123");
        let b = session("XYZ987");
        repo_a.create(&a).unwrap();
        repo_b.create(&b).unwrap();

        let all = repo_a.find_all(&SessionFilter::default()).unwrap();
        assert_eq!(all.len(), 2);
        assert!(repo_b.find_by_id(a.id).unwrap().is_some());
        assert!(repo_a.find_by_id(b.id).unwrap().is_some());

        // The uniqueness check also sees the other handle's write.
        let err = repo_b.create(&session("ABC123")).unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
    }

    #[test]
    fn test_close_is_atomic_and_terminal() {
        let dir = tempdir().unwrap();
        let repo = FileSessionRepository::open(dir.path().to_path_buf()).unwrap();

        let s = session("ABC123");
        repo.create(&s).unwrap();
        let closed = repo.update_on_close(s.id, t(9, 5), 6000.0).unwrap();
        assert_eq!(closed.exit_time(), Some(t(9, 5)));
        assert_eq!(closed.cost(), Some(6000.0));

        let err = repo.update_on_close(s.id, t(10, 0), 9000.0).unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
    }

    #[test]
    fn test_failed_persist_leaves_the_session_active() {
        let dir = tempdir().unwrap();
        let repo = FileSessionRepository::open(dir.path().to_path_buf()).unwrap();
        let s = session("ABC123");
        repo.create(&s).unwrap();

        // Block the staging path so the write cannot land.
        let tmp = dir.path().join("sessions.json.tmp");
        fs::create_dir(&tmp).unwrap();
        let err = repo.update_on_close(s.id, t(9, 0), 3000.0).unwrap_err();
        assert!(matches!(err, Error::Io(_)));

        // Nothing was half-committed: the session is still Active and the
        // retry succeeds once the store is writable again.
        assert!(repo.find_by_id(s.id).unwrap().unwrap().is_active());
        fs::remove_dir(&tmp).unwrap();
        let closed = repo.update_on_close(s.id, t(9, 0), 3000.0).unwrap();
        assert_eq!(closed.cost(), Some(3000.0));
    }

    #[test]
    fn test_sessions_survive_reopen() {
        let dir = tempdir().unwrap();
        let s = session("ABC123");
        {
            let repo = FileSessionRepository::open(dir.path().to_path_buf()).unwrap();
            repo.create(&s).unwrap();
        }
        let repo = FileSessionRepository::open(dir.path().to_path_buf()).unwrap();
        let found = repo.find_by_id(s.id).unwrap().unwrap();
        assert_eq!(found.plate, s.plate);
        assert!(found.is_active());
    }

    #[test]
    fn test_find_all_filters_and_limits() {
        let dir = tempdir().unwrap();
        let repo = FileSessionRepository::open(dir.path().to_path_buf()).unwrap();

        let a = session("ABC123");
        repo.create(&a).unwrap();
        repo.create(&session("XYZ987")).unwrap();
        repo.update_on_close(a.id, t(9, 0), 3000.0).unwrap();

        let active = repo
            .find_all(&SessionFilter {
                active: Some(true),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].plate.as_str(), "XYZ987");

        let by_plate = repo
            .find_all(&SessionFilter {
                plate_contains: Some("abc".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(by_plate.len(), 1);

        let limited = repo
            .find_all(&SessionFilter {
                limit: Some(1),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(limited.len(), 1);
    }
}
