use serde::{Deserialize, Serialize};

/// Which record store backs the service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// SQLite file owned by the database actor.
    #[default]
    Sqlite,
    /// Process-local tables; contents are lost on shutdown.
    Memory,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// TOML: `storage.backend`. Default: `sqlite`.
    #[serde(default)]
    pub backend: StorageBackend,

    /// Database URL for SQLite. Ignored by the memory backend.
    /// TOML: `storage.database_url`. Default: `sqlite://quotes.db`.
    #[serde(default = "default_database_url")]
    pub database_url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            database_url: default_database_url(),
        }
    }
}

fn default_database_url() -> String {
    "sqlite://quotes.db".to_string()
}
