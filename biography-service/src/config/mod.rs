use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

pub use service_core::config::DEFAULT_PORT;

pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

/// Origins allowed to call the relay from a browser: the two local
/// development servers and the deployed frontend.
pub const DEFAULT_ALLOWED_ORIGINS: [&str; 3] = [
    "http://localhost:8000",
    "http://localhost:8080",
    "https://fronted-poetas.vercel.app",
];

#[derive(Debug, Clone, Deserialize)]
pub struct BiographyConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub environment: String,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    pub gemini: GeminiSettings,
    pub cors: CorsSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiSettings {
    /// Not validated at startup; an empty key fails each generation request.
    pub api_key: String,
    pub model: String,
    pub api_base: String,
    /// Per-request timeout. `None` leaves the provider call unbounded.
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsSettings {
    pub allowed_origins: Vec<String>,
}

impl BiographyConfig {
    pub fn load() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;

        let timeout_secs = optional_env("GEMINI_TIMEOUT_SECS")
            .map(|raw| {
                raw.parse::<u64>().map_err(|e| {
                    AppError::ConfigError(anyhow::anyhow!(
                        "GEMINI_TIMEOUT_SECS '{}' is not a number of seconds: {}",
                        raw,
                        e
                    ))
                })
            })
            .transpose()?;

        let allowed_origins = match optional_env("CORS_ALLOWED_ORIGINS") {
            Some(raw) => parse_origins(&raw),
            None => default_origins(),
        };

        Ok(BiographyConfig {
            common,
            environment: env_or("ENVIRONMENT", "dev"),
            log_level: env_or("LOG_LEVEL", "info"),
            otlp_endpoint: optional_env("OTLP_ENDPOINT"),
            gemini: GeminiSettings {
                api_key: env_or("GEMINI_API_KEY", ""),
                model: env_or("GEMINI_MODEL", DEFAULT_GEMINI_MODEL),
                api_base: env_or("GEMINI_API_BASE", DEFAULT_GEMINI_API_BASE),
                timeout_secs,
            },
            cors: CorsSettings { allowed_origins },
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "prod"
    }
}

impl Default for BiographyConfig {
    fn default() -> Self {
        Self {
            common: core_config::Config {
                port: DEFAULT_PORT,
            },
            environment: "dev".to_string(),
            log_level: "info".to_string(),
            otlp_endpoint: None,
            gemini: GeminiSettings {
                api_key: String::new(),
                model: DEFAULT_GEMINI_MODEL.to_string(),
                api_base: DEFAULT_GEMINI_API_BASE.to_string(),
                timeout_secs: None,
            },
            cors: CorsSettings {
                allowed_origins: default_origins(),
            },
        }
    }
}

pub fn default_origins() -> Vec<String> {
    DEFAULT_ALLOWED_ORIGINS.iter().map(|o| o.to_string()).collect()
}

/// Split a comma-separated origin list, dropping blanks and trailing slashes.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|o| o.trim().trim_end_matches('/'))
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}

fn optional_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    optional_env(key).unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_origins_trims_and_skips_blanks() {
        let origins = parse_origins(" http://a.test/ , ,https://b.test");
        assert_eq!(origins, vec!["http://a.test", "https://b.test"]);
    }

    #[test]
    fn defaults_allow_local_and_deployed_frontends() {
        let config = BiographyConfig::default();
        assert_eq!(config.common.port, 3000);
        assert_eq!(config.gemini.model, "gemini-2.0-flash");
        assert!(config.gemini.timeout_secs.is_none());
        assert_eq!(
            config.cors.allowed_origins,
            vec![
                "http://localhost:8000",
                "http://localhost:8080",
                "https://fronted-poetas.vercel.app"
            ]
        );
        assert!(!config.is_production());
    }
}
