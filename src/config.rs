use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use validator::Validate;

const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_SHARE_HOST: &str = "localhost";
const DEFAULT_EVENT_BUFFER: usize = 256;
const CONFIG_DIR: &str = "config";

/// Storefront-link behavior knobs.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct LinksConfig {
    /// Host used when rendering shareable URLs (`https://{host}/store/{code}`).
    #[serde(default = "default_share_host")]
    #[validate(length(min = 1))]
    pub share_host: String,

    /// When true, deactivating a catalog item prunes its id from every
    /// link's allow-list. When false (the default), stale ids are
    /// tolerated and simply drop out of rendered views.
    #[serde(default)]
    pub enforce_allowlist_integrity: bool,
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            share_host: default_share_host(),
            enforce_allowlist_integrity: false,
        }
    }
}

/// Application configuration, layered from `config/default.toml`, an
/// optional per-environment file, and `STORELINK__`-prefixed environment
/// variables.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default = "default_environment")]
    pub environment: String,

    #[serde(default = "default_log_level")]
    #[validate(length(min = 1))]
    pub log_level: String,

    /// Emit logs as JSON instead of human-readable lines.
    #[serde(default)]
    pub log_json: bool,

    /// Optional tenant partition applied to most collections
    /// (`role_permissions` and `master_records_*` are exempt).
    #[serde(default)]
    pub instance_id: Option<String>,

    /// Capacity of the domain event channel.
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,

    #[serde(default)]
    #[validate]
    pub links: LinksConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            log_level: default_log_level(),
            log_json: false,
            instance_id: None,
            event_buffer: default_event_buffer(),
            links: LinksConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from files and environment.
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("STORELINK_ENV").unwrap_or_else(|_| DEFAULT_ENV.to_string());

        let settings = Config::builder()
            .add_source(File::with_name(&format!("{}/default", CONFIG_DIR)).required(false))
            .add_source(
                File::with_name(&format!("{}/{}", CONFIG_DIR, environment)).required(false),
            )
            .add_source(Environment::with_prefix("STORELINK").separator("__"))
            .set_default("environment", environment)?
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config
            .validate()
            .map_err(|e| ConfigError::Message(e.to_string()))?;
        Ok(config)
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn default_environment() -> String {
    DEFAULT_ENV.to_string()
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_share_host() -> String {
    DEFAULT_SHARE_HOST.to_string()
}

fn default_event_buffer() -> usize {
    DEFAULT_EVENT_BUFFER
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.log_level, "info");
        assert!(!config.links.enforce_allowlist_integrity);
    }
}
