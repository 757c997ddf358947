//! File-based repository implementations
//!
//! Each store keeps its records in one JSON file. Every operation takes an
//! advisory lock on a sibling lock file and re-reads the store inside the
//! critical section, which is what closes the check-then-act races the
//! repository traits promise to close: find-or-create and close hold the
//! lock across lookup and write, and that holds across handles in
//! separate processes. Writes stage to a temp file and rename into place,
//! so a failed write leaves the previous state intact.

mod burst_store;
mod file_photo_repo;
mod file_session_repo;
mod file_tariff_repo;

pub use burst_store::BurstStore;
pub use file_photo_repo::FilePhotoRepository;
pub use file_session_repo::FileSessionRepository;
pub use file_tariff_repo::FileTariffRepository;
