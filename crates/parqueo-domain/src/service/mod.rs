//! Domain services

pub mod reconciler;
pub mod tariff;

pub use reconciler::{Burst, Reconciliation, SessionReconciler, MAX_BURST_PHOTOS};
pub use tariff::{billed_hours, elapsed_minutes, quote, Quote};
