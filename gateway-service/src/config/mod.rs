use secrecy::Secret;
use serde::Deserialize;
use service_core::config::{self as core_config, get_env};
use service_core::error::AppError;

/// Cloudinary REST base; the cloud name and resource path are appended.
const DEFAULT_CLOUDINARY_API_URL: &str = "https://api.cloudinary.com/v1_1";

/// Luma Dream Machine generations endpoint.
const DEFAULT_LUMA_API_URL: &str = "https://api.lumalabs.ai/dream-machine/v1/generations";

/// Largest multipart body accepted on `/upload` (20MB).
const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub cloudinary: CloudinaryConfig,
    pub luma: LumaConfig,
    pub upload: UploadConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: Secret<String>,
    pub api_base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LumaConfig {
    pub api_key: Secret<String>,
    /// Generations endpoint. Job lookups go to `{api_url}/{id}`.
    pub api_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    pub max_upload_bytes: usize,
}

impl GatewayConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = core_config::is_production();

        Ok(GatewayConfig {
            common: common_config,
            cloudinary: CloudinaryConfig {
                cloud_name: get_env("CLOUDINARY_CLOUD_NAME", None, is_prod)?,
                api_key: get_env("CLOUDINARY_API_KEY", None, is_prod)?,
                api_secret: Secret::new(get_env("CLOUDINARY_API_SECRET", None, is_prod)?),
                api_base_url: get_env(
                    "CLOUDINARY_API_URL",
                    Some(DEFAULT_CLOUDINARY_API_URL),
                    false,
                )?,
            },
            luma: LumaConfig {
                api_key: Secret::new(get_env("LUMA_API_KEY", None, is_prod)?),
                api_url: get_env("LUMA_API_URL", Some(DEFAULT_LUMA_API_URL), false)?,
            },
            upload: UploadConfig {
                max_upload_bytes: get_env(
                    "MAX_UPLOAD_BYTES",
                    Some(&DEFAULT_MAX_UPLOAD_BYTES.to_string()),
                    false,
                )?
                .parse()
                .map_err(|e| {
                    AppError::ConfigError(anyhow::anyhow!("Invalid MAX_UPLOAD_BYTES: {}", e))
                })?,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    // Single test so the process environment is only mutated from one place.
    #[test]
    fn load_reads_credentials_and_applies_defaults() {
        std::env::remove_var("ENVIRONMENT");
        std::env::remove_var("CLOUDINARY_API_URL");
        std::env::remove_var("LUMA_API_URL");
        std::env::remove_var("MAX_UPLOAD_BYTES");
        std::env::set_var("CLOUDINARY_CLOUD_NAME", "demo-cloud");
        std::env::set_var("CLOUDINARY_API_KEY", "cloud-key");
        std::env::set_var("CLOUDINARY_API_SECRET", "cloud-secret");
        std::env::set_var("LUMA_API_KEY", "luma-key");

        let config = GatewayConfig::load().expect("config should load");

        assert_eq!(config.cloudinary.cloud_name, "demo-cloud");
        assert_eq!(config.cloudinary.api_key, "cloud-key");
        assert_eq!(config.cloudinary.api_secret.expose_secret(), "cloud-secret");
        assert_eq!(config.cloudinary.api_base_url, DEFAULT_CLOUDINARY_API_URL);
        assert_eq!(config.luma.api_key.expose_secret(), "luma-key");
        assert_eq!(config.luma.api_url, DEFAULT_LUMA_API_URL);
        assert_eq!(config.upload.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);

        // Secrets stay out of debug output.
        let debug = format!("{:?}", config);
        assert!(!debug.contains("cloud-secret"));
        assert!(!debug.contains("luma-key"));
    }
}
