use std::env;
use std::path::PathBuf;

use thiserror::Error;

use crate::application::payment_service::PaymentSettings;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key} must be a valid {expected}, got '{value}'")]
    Invalid {
        key: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Process configuration, read from the environment (and `.env` in `main`).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub upload_dir: PathBuf,
    pub gateway_url: String,
    pub payment: PaymentSettings,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |key: &'static str| lookup(key).ok_or(ConfigError::Missing(key));
        let or_default = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let port = or_default("PORT", "8080");
        let port = port.parse().map_err(|_| ConfigError::Invalid {
            key: "PORT",
            expected: "port number",
            value: port.clone(),
        })?;

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            host: or_default("HOST", "0.0.0.0"),
            port,
            upload_dir: PathBuf::from(or_default("UPLOAD_DIR", "./uploads")),
            gateway_url: or_default("PAYMENT_GATEWAY_URL", "https://api.razorpay.com/v1"),
            payment: PaymentSettings {
                gateway_name: or_default("PAYMENT_GATEWAY_NAME", "razorpay"),
                key_id: required("PAYMENT_KEY_ID")?,
                key_secret: required("PAYMENT_KEY_SECRET")?,
                currency: or_default("PAYMENT_CURRENCY", "INR"),
            },
        })
    }
}
