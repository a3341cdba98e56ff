//! Configuration management for the lending server

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

use crate::models::loan::LoanPeriod;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    /// Optional log file; when set, logs go to both console and file
    pub file: Option<String>,
}

/// Day offsets applied to the borrow date per loan period.
///
/// These default to the historical 1/2/3 values but are configuration,
/// not product law.
#[derive(Debug, Deserialize, Clone)]
pub struct LoanPolicy {
    pub short_days: i64,
    pub medium_days: i64,
    pub long_days: i64,
}

impl LoanPolicy {
    pub fn days_for(&self, period: LoanPeriod) -> i64 {
        match period {
            LoanPeriod::Short => self.short_days,
            LoanPeriod::Medium => self.medium_days,
            LoanPeriod::Long => self.long_days,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub loans: LoanPolicy,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default"))
            // Layer on the environment-specific file
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add environment variables (with prefix LENDING_)
            .add_source(
                Environment::with_prefix("LENDING")
                    .separator("_")
                    .try_parsing(true),
            )
            // Override database URL from DATABASE_URL env var if present
            .set_override_option("database.url", env::var("DATABASE_URL").ok())?
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://library.db".to_string(),
            max_connections: 10,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl Default for LoanPolicy {
    fn default() -> Self {
        Self {
            short_days: 1,
            medium_days: 2,
            long_days: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_matches_period_codes() {
        let policy = LoanPolicy::default();
        assert_eq!(policy.days_for(LoanPeriod::Short), 1);
        assert_eq!(policy.days_for(LoanPeriod::Medium), 2);
        assert_eq!(policy.days_for(LoanPeriod::Long), 3);
    }

    #[test]
    fn custom_policy_overrides_offsets() {
        let policy = LoanPolicy {
            short_days: 7,
            medium_days: 14,
            long_days: 28,
        };
        assert_eq!(policy.days_for(LoanPeriod::Long), 28);
        assert_eq!(policy.days_for(LoanPeriod::Short), 7);
    }
}
