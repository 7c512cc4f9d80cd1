use std::path::PathBuf;

use tracing::trace;

use crate::util;

/// Storage backend configuration
#[derive(Debug, Clone, PartialEq)]
pub enum StorageConfig {
    /// In-memory storage (no persistence)
    Memory,

    /// SQLite database (default for most deployments)
    Sqlite {
        /// Path to the SQLite database file
        path: PathBuf,
    },
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig::Sqlite {
            path: default_sqlite_path(),
        }
    }
}

fn default_sqlite_path() -> PathBuf {
    PathBuf::from("./servers.db")
}

impl StorageConfig {
    /// Read `STORAGE_BACKEND` / `DATABASE_PATH` from the environment.
    ///
    /// Unrecognized backend names fall back to the SQLite default.
    pub fn from_env() -> Self {
        let backend = std::env::var("STORAGE_BACKEND").unwrap_or_default();
        match backend.as_str() {
            "memory" => StorageConfig::Memory,
            _ => StorageConfig::Sqlite {
                path: std::env::var("DATABASE_PATH")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| default_sqlite_path()),
            },
        }
    }
}

/// Configuration for the hub (aggregator) binary
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Port the REST + WebSocket server listens on
    pub port: u16,

    /// Shared credential pushing agents must present
    pub api_key: String,

    pub storage: StorageConfig,
}

impl HubConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let api_key = util::get_api_key()
            .ok_or_else(|| anyhow::anyhow!("API_KEY must be set for the hub to accept pushes"))?;

        let config = Self {
            port: util::get_port(),
            api_key,
            storage: StorageConfig::from_env(),
        };
        trace!("loaded hub config: port={} storage={:?}", config.port, config.storage);
        Ok(config)
    }
}

/// Configuration for the agent (collector) binary
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Base address of the hub, e.g. "http://hub.internal:3001"
    pub server_url: String,

    /// Shared credential attached to every push
    pub api_key: String,

    /// Stable name identifying this machine; the upsert key on the hub
    pub server_name: String,

    /// Seconds between sampling cycles
    pub interval_secs: u64,
}

impl AgentConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let api_key = util::get_api_key()
            .ok_or_else(|| anyhow::anyhow!("API_KEY must be set for the agent to push"))?;

        let config = Self {
            server_url: util::get_server_url(),
            api_key,
            server_name: util::get_server_name(),
            interval_secs: util::get_interval_secs(),
        };
        trace!(
            "loaded agent config: url={} name={} interval={}s",
            config.server_url, config.server_name, config.interval_secs
        );
        Ok(config)
    }
}
