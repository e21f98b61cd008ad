//! Configuration for storage service module

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Prefix of environment variables overriding file configuration,
/// nested keys separated by `__` (e.g. `STORAGE_SERVICE__DATABASE__URL`)
pub const ENV_PREFIX: &str = "STORAGE_SERVICE__";

/// Storage service configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Database connection settings
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Page size used when a list request omits one
    #[serde(default = "default_page_size")]
    pub default_page_size: u64,

    /// Largest page size a list request may ask for
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// SeaORM connection URL (`sqlite://...` or `postgres://...`)
    #[serde(default = "default_database_url")]
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
        }
    }
}

impl Config {
    /// Load configuration from defaults, an optional YAML file and the environment,
    /// later sources overriding earlier ones
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }

        let config: Config = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the paging limits are usable
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.max_page_size == 0 {
            anyhow::bail!("max_page_size must be at least 1");
        }
        if self.default_page_size == 0 || self.default_page_size > self.max_page_size {
            anyhow::bail!(
                "default_page_size must be between 1 and max_page_size ({})",
                self.max_page_size
            );
        }
        Ok(())
    }
}

fn default_database_url() -> String {
    "sqlite://storage.db?mode=rwc".to_string()
}

fn default_max_connections() -> u32 {
    10
}

fn default_page_size() -> u64 {
    crate::domain::query::DEFAULT_PAGE_SIZE
}

fn default_max_page_size() -> u64 {
    crate::domain::query::DEFAULT_MAX_PAGE_SIZE
}
