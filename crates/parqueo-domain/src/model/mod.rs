//! Domain models

mod photo;
mod session;
mod tariff;

pub use photo::Photo;
pub use session::{ParkingSession, SessionState};
pub use tariff::TariffConfig;
