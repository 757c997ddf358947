//! Domain layer for parqueo: models, repository traits, and the
//! session/tariff services.

pub mod model;
pub mod repository;
pub mod service;
