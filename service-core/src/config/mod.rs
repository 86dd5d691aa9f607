use crate::error::AppError;
use config::{Config as Cfg, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    8080
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

/// True when `ENVIRONMENT=prod`. Service settings without a value are then
/// rejected instead of falling back to their defaults.
pub fn is_production() -> bool {
    env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod"
}

/// Read a service setting from the process environment.
pub fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_setting_falls_back_to_default_outside_production() {
        let value = get_env("SERVICE_CORE_TEST_UNSET_WITH_DEFAULT", Some("fallback"), false)
            .expect("default should apply");
        assert_eq!(value, "fallback");
    }

    #[test]
    fn missing_setting_without_default_is_an_error() {
        let err = get_env("SERVICE_CORE_TEST_UNSET_NO_DEFAULT", None, false).unwrap_err();
        assert!(err.to_string().contains("SERVICE_CORE_TEST_UNSET_NO_DEFAULT"));
    }

    #[test]
    fn production_ignores_defaults() {
        let err = get_env("SERVICE_CORE_TEST_UNSET_PROD", Some("fallback"), true).unwrap_err();
        assert!(err.to_string().contains("required in production"));
    }
}
