//! Environment-driven configuration.

use std::env;

use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub product_service_url: String,
    pub max_connections: u32,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing environment variable: {0}")]
    Missing(&'static str),

    #[error("invalid value for {0}")]
    Invalid(&'static str),
}

impl Config {
    /// Load configuration from the environment, consulting a `.env` file
    /// when present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let database_url =
            env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;
        let product_service_url = env::var("PRODUCT_SERVICE_URL")
            .map_err(|_| ConfigError::Missing("PRODUCT_SERVICE_URL"))?;
        let max_connections = match env::var("MAX_DB_CONNECTIONS") {
            Ok(v) => v.parse().map_err(|_| ConfigError::Invalid("MAX_DB_CONNECTIONS"))?,
            Err(_) => 10,
        };

        Ok(Self { database_url, product_service_url, max_connections })
    }
}
