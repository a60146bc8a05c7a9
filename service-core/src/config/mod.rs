use crate::error::AppError;
use config::{Config as Cfg, Environment, File};
use serde::Deserialize;
use std::env;

/// Port used when no source names one.
pub const DEFAULT_PORT: u16 = 3000;

/// Settings every service shares.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub port: u16,
}

impl Config {
    /// Sources, lowest precedence first: built-in defaults, an optional
    /// `configuration` file, `APP__*` variables, then the bare `PORT`
    /// variable that hosting platforms inject.
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_sources(env::var("PORT").ok())
    }

    fn from_sources(platform_port: Option<String>) -> Result<Self, AppError> {
        let platform_port = platform_port.filter(|port| !port.trim().is_empty());

        let config = Cfg::builder()
            .set_default("port", i64::from(DEFAULT_PORT))?
            .add_source(File::with_name("configuration").required(false))
            .add_source(Environment::with_prefix("APP").separator("__"))
            .set_override_option("port", platform_port)?
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_falls_back_to_default() {
        let config = Config::from_sources(None).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn platform_port_wins() {
        let config = Config::from_sources(Some("8081".to_string())).unwrap();
        assert_eq!(config.port, 8081);
    }

    #[test]
    fn blank_platform_port_is_ignored() {
        let config = Config::from_sources(Some("  ".to_string())).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn unparseable_platform_port_is_a_config_error() {
        let err = Config::from_sources(Some("eighty".to_string())).unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
    }
}
