mod basic;
mod storage;

pub use basic::{BasicConfig, SiteConfig};
pub use storage::{StorageBackend, StorageConfig};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Core server configuration (see `basic` table in config.toml).
    #[serde(default)]
    pub basic: BasicConfig,

    /// Record store selection (see `storage` table in config.toml).
    #[serde(default)]
    pub storage: StorageConfig,

    /// Static site content (see `site` table in config.toml).
    #[serde(default)]
    pub site: SiteConfig,
}

const DEFAULT_CONFIG_FILE: &str = "config.toml";
const ENV_PREFIX: &str = "QUOTEBOOK_";

impl Config {
    /// Builds a Figment that merges defaults, an optional config TOML file and
    /// `QUOTEBOOK_`-prefixed environment variables (`__` separates nested keys,
    /// e.g. `QUOTEBOOK_STORAGE__BACKEND=memory`).
    pub fn figment() -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));
        if PathBuf::from(DEFAULT_CONFIG_FILE).is_file() {
            figment = figment.merge(Toml::file(DEFAULT_CONFIG_FILE));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Loads and validates the configuration.
    pub fn load() -> Result<Self, figment::Error> {
        let cfg: Self = Self::figment().extract()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), figment::Error> {
        if self.storage.backend == StorageBackend::Sqlite
            && self.storage.database_url.trim().is_empty()
        {
            return Err(figment::Error::from(
                "storage.database_url must be set when storage.backend = \"sqlite\"".to_string(),
            ));
        }
        Ok(())
    }
}
