//! Global tariff configuration

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use parqueo_types::{Error, Result};

/// Current billing parameters.
///
/// Singleton by convention: reads take the most recently written record,
/// writes target the single canonical record. No historical versioning, so
/// a re-price affects every session not yet closed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TariffConfig {
    pub hourly_rate: f64,
    pub monthly_price: f64,
    pub monthly_price_moto: f64,
    pub monthly_price_car: f64,
    pub updated_at: DateTime<Utc>,
}

impl TariffConfig {
    pub fn new(
        hourly_rate: f64,
        monthly_price: f64,
        monthly_price_moto: f64,
        monthly_price_car: f64,
    ) -> Result<Self> {
        validate_price("hourly_rate", hourly_rate)?;
        validate_price("monthly_price", monthly_price)?;
        validate_price("monthly_price_moto", monthly_price_moto)?;
        validate_price("monthly_price_car", monthly_price_car)?;
        Ok(Self {
            hourly_rate,
            monthly_price,
            monthly_price_moto,
            monthly_price_car,
            updated_at: Utc::now(),
        })
    }

    pub fn set_hourly_rate(&mut self, value: f64) -> Result<()> {
        validate_price("hourly_rate", value)?;
        self.hourly_rate = value;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn set_monthly_price(&mut self, value: f64) -> Result<()> {
        validate_price("monthly_price", value)?;
        self.monthly_price = value;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn set_monthly_price_moto(&mut self, value: f64) -> Result<()> {
        validate_price("monthly_price_moto", value)?;
        self.monthly_price_moto = value;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn set_monthly_price_car(&mut self, value: f64) -> Result<()> {
        validate_price("monthly_price_car", value)?;
        self.monthly_price_car = value;
        self.updated_at = Utc::now();
        Ok(())
    }
}

fn validate_price(field: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::Validation(format!(
            "{} must be a positive number, got {}",
            field, value
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_positive_prices() {
        assert!(TariffConfig::new(0.0, 1.0, 1.0, 1.0).is_err());
        assert!(TariffConfig::new(3000.0, -5.0, 1.0, 1.0).is_err());
        assert!(TariffConfig::new(3000.0, 1.0, f64::NAN, 1.0).is_err());
    }

    #[test]
    fn test_setter_rejection_leaves_value_unchanged() {
        let mut tariff = TariffConfig::new(3000.0, 60000.0, 35000.0, 70000.0).unwrap();
        assert!(tariff.set_hourly_rate(-1.0).is_err());
        assert_eq!(tariff.hourly_rate, 3000.0);
        assert!(tariff.set_monthly_price_moto(0.0).is_err());
        assert_eq!(tariff.monthly_price_moto, 35000.0);
    }
}
