//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub db_max_connections: u32,
    pub log_level: Level,
    pub cors_origin: String,
    pub session_ttl_days: i64,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // --- Server and Database Settings ---
        let bind_address_str =
            lookup("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:5000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        let db_max_connections = parse_or_default(&lookup, "DB_MAX_CONNECTIONS", 5)?;

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- HTTP and Auth Settings ---
        let cors_origin =
            lookup("CORS_ORIGIN").unwrap_or_else(|| "http://localhost:5173".to_string());
        let session_ttl_days = parse_or_default(&lookup, "SESSION_TTL_DAYS", 30)?;
        if session_ttl_days <= 0 {
            return Err(ConfigError::InvalidValue(
                "SESSION_TTL_DAYS".to_string(),
                "must be positive".to_string(),
            ));
        }

        Ok(Self {
            bind_address,
            database_url,
            db_max_connections,
            log_level,
            cors_origin,
            session_ttl_days,
        })
    }
}

fn parse_or_default<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(key.to_string(), e.to_string())),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn applies_defaults() {
        let config = config_from(&[("DATABASE_URL", "postgres://localhost/pantry")]).unwrap();

        assert_eq!(config.bind_address, "0.0.0.0:5000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.cors_origin, "http://localhost:5173");
        assert_eq!(config.session_ttl_days, 30);
    }

    #[test]
    fn requires_database_url() {
        let err = config_from(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar(var) if var == "DATABASE_URL"));
    }

    #[test]
    fn rejects_bad_values() {
        let bad_level = config_from(&[("DATABASE_URL", "x"), ("RUST_LOG", "chatty")]);
        assert!(matches!(bad_level, Err(ConfigError::InvalidValue(var, _)) if var == "RUST_LOG"));

        let bad_ttl = config_from(&[("DATABASE_URL", "x"), ("SESSION_TTL_DAYS", "0")]);
        assert!(matches!(bad_ttl, Err(ConfigError::InvalidValue(var, _)) if var == "SESSION_TTL_DAYS"));

        let bad_pool = config_from(&[("DATABASE_URL", "x"), ("DB_MAX_CONNECTIONS", "many")]);
        assert!(matches!(bad_pool, Err(ConfigError::InvalidValue(var, _)) if var == "DB_MAX_CONNECTIONS"));
    }
}
