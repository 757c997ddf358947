//! Tariff administration use cases
//!
//! All writes go through the access policy with the Admin role. Price
//! updates on an unconfigured store are rejected; `init` creates the
//! canonical record.

use parqueo_domain::model::TariffConfig;
use parqueo_domain::repository::TariffRepository;

use crate::app::{ServiceError, ServiceResult};
use crate::auth::{AccessPolicy, Role};

pub struct TariffService<'a> {
    tariffs: &'a dyn TariffRepository,
    policy: &'a dyn AccessPolicy,
}

impl<'a> TariffService<'a> {
    pub fn new(tariffs: &'a dyn TariffRepository, policy: &'a dyn AccessPolicy) -> Self {
        Self { tariffs, policy }
    }

    /// Create or replace the canonical tariff record.
    pub fn init(
        &self,
        hourly_rate: f64,
        monthly_price: f64,
        monthly_price_moto: f64,
        monthly_price_car: f64,
    ) -> ServiceResult<TariffConfig> {
        self.policy.require(Role::Admin)?;
        let tariff = TariffConfig::new(
            hourly_rate,
            monthly_price,
            monthly_price_moto,
            monthly_price_car,
        )?;
        self.tariffs.write(&tariff)?;
        log::info!("tariff initialized, hourly rate {}", tariff.hourly_rate);
        Ok(tariff)
    }

    /// Most recently written tariff.
    pub fn current(&self) -> ServiceResult<TariffConfig> {
        self.tariffs
            .current()?
            .ok_or_else(|| ServiceError::NotFound("no tariff configured".to_string()))
    }

    pub fn set_hourly_rate(&self, value: f64) -> ServiceResult<TariffConfig> {
        self.update(|t| t.set_hourly_rate(value))
    }

    pub fn set_monthly_price(&self, value: f64) -> ServiceResult<TariffConfig> {
        self.update(|t| t.set_monthly_price(value))
    }

    pub fn set_monthly_price_moto(&self, value: f64) -> ServiceResult<TariffConfig> {
        self.update(|t| t.set_monthly_price_moto(value))
    }

    pub fn set_monthly_price_car(&self, value: f64) -> ServiceResult<TariffConfig> {
        self.update(|t| t.set_monthly_price_car(value))
    }

    fn update(
        &self,
        apply: impl FnOnce(&mut TariffConfig) -> parqueo_types::Result<()>,
    ) -> ServiceResult<TariffConfig> {
        self.policy.require(Role::Admin)?;
        let mut tariff = self
            .tariffs
            .current()?
            .ok_or_else(|| ServiceError::NotFound("no tariff configured".to_string()))?;
        apply(&mut tariff)?;
        self.tariffs.write(&tariff)?;
        Ok(tariff)
    }
}
