//! Configuration management for the Inventario backend
//!
//! Later sources win: defaults set in `Config::load`, then
//! `config/<environment>.toml`, then `INV__SECTION__KEY` variables.

use config::{ConfigError, Environment, File};
use serde::Deserialize;
use shared::ledger::{DEFAULT_EXPIRING_HORIZON_DAYS, DEFAULT_SUPPLY_BUCKETS, DEFAULT_TOP_PRODUCTS};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// `development` runs migrations on startup
    pub environment: String,

    pub server: ServerConfig,
    pub database: DatabaseConfig,

    /// Access/refresh token signing
    pub jwt: JwtConfig,

    /// Account and sign-in behaviour
    pub auth: AuthConfig,

    /// Ledger aggregation limits
    pub ledger: LedgerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    /// HS256 signing key
    pub secret: String,

    /// Lifetimes in seconds
    pub access_token_expiry: i64,
    pub refresh_token_expiry: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// Mark new accounts as confirmed at registration
    pub auto_confirm_email: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LedgerConfig {
    /// Look-ahead window for the expiring-products alert
    pub expiring_horizon_days: i64,

    /// Number of monthly buckets in the supply chart
    pub supply_buckets: usize,

    /// Number of products in the top-sellers list
    pub top_products_limit: usize,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("INV_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("jwt.access_token_expiry", 3600)?
            .set_default("jwt.refresh_token_expiry", 604800)?
            .set_default("auth.auto_confirm_email", true)?
            .set_default("ledger.expiring_horizon_days", DEFAULT_EXPIRING_HORIZON_DAYS)?
            .set_default("ledger.supply_buckets", DEFAULT_SUPPLY_BUCKETS as u64)?
            .set_default("ledger.top_products_limit", DEFAULT_TOP_PRODUCTS as u64)?
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            .add_source(
                Environment::with_prefix("INV")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}
