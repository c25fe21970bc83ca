//! Service configuration loaded from the environment
//!
//! # Environment Variables
//! - `PORT`: listen port (default: 5000)
//! - `JWT_SECRET`: token signing secret (required)
//! - `FRONTEND_URL`: origin allowed by CORS (default: http://localhost:3000)
//! - `LOG_LEVEL`: default tracing filter when `RUST_LOG` is unset (default: info)

use anyhow::{Context, Result};
use ::config::{Config, Environment};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub port: u16,
    pub jwt_secret: String,
    pub frontend_url: String,
    pub log_level: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let config: AppConfig = Config::builder()
            .set_default("port", 5000)?
            .set_default("frontend_url", "http://localhost:3000")?
            .set_default("log_level", "info")?
            .add_source(Environment::default())
            .build()?
            .try_deserialize()
            .context("Failed to load configuration (is JWT_SECRET set?)")?;

        if config.jwt_secret.trim().is_empty() {
            anyhow::bail!("JWT_SECRET must not be empty");
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    fn clear_env() {
        unsafe {
            env::remove_var("PORT");
            env::remove_var("JWT_SECRET");
            env::remove_var("FRONTEND_URL");
            env::remove_var("LOG_LEVEL");
        }
    }

    #[test]
    #[serial]
    fn test_defaults_with_secret() {
        clear_env();
        unsafe {
            env::set_var("JWT_SECRET", "campus-secret");
        }

        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.port, 5000);
        assert_eq!(config.jwt_secret, "campus-secret");
        assert_eq!(config.frontend_url, "http://localhost:3000");
        assert_eq!(config.log_level, "info");

        clear_env();
    }

    #[test]
    #[serial]
    fn test_overrides_from_env() {
        clear_env();
        unsafe {
            env::set_var("JWT_SECRET", "campus-secret");
            env::set_var("PORT", "8080");
            env::set_var("FRONTEND_URL", "https://events.campus.edu");
        }

        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.frontend_url, "https://events.campus.edu");

        clear_env();
    }

    #[test]
    #[serial]
    fn test_missing_secret_fails() {
        clear_env();
        assert!(AppConfig::from_env().is_err());
    }

    #[test]
    #[serial]
    fn test_blank_secret_fails() {
        clear_env();
        unsafe {
            env::set_var("JWT_SECRET", "   ");
        }

        assert!(AppConfig::from_env().is_err());

        clear_env();
    }
}
