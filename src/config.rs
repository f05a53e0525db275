use crate::error::AppError;
use config::{Config as Cfg, File};
use rust_decimal::Decimal;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Days an estimate stays valid from its creation date.
    #[serde(default = "default_valid_days")]
    pub default_valid_days: i64,

    /// Default payment terms (net days) for new invoices.
    #[serde(default = "default_payment_terms_days")]
    pub default_payment_terms_days: i64,

    /// Tax rate (percent) applied when a document payload does not carry one.
    #[serde(default = "default_tax_rate")]
    pub default_tax_rate: Decimal,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_valid_days() -> i64 {
    30
}

fn default_payment_terms_days() -> i64 {
    30
}

fn default_tax_rate() -> Decimal {
    Decimal::ZERO
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_valid_days: default_valid_days(),
            default_payment_terms_days: default_payment_terms_days(),
            default_tax_rate: default_tax_rate(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let config = Cfg::builder()
            .add_source(File::with_name("configuration").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
