//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Ledger behaviour (listing, dashboard, numbering).
    #[serde(default)]
    pub ledger: LedgerConfig,
    /// Proof document storage.
    #[serde(default)]
    pub storage: StorageSettings,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Seconds a `SQLite` writer waits for the write lock before giving up.
    #[serde(default = "default_busy_timeout_secs")]
    pub busy_timeout_secs: u64,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_busy_timeout_secs() -> u64 {
    5
}

/// Ledger settings.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Fixed page size for record listings.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Number of recent transactions shown on the dashboard.
    #[serde(default = "default_recent_limit")]
    pub recent_limit: u64,
    /// How many times a create is retried after a reference number collision.
    #[serde(default = "default_reference_retry_limit")]
    pub reference_retry_limit: u32,
}

fn default_page_size() -> u32 {
    15
}

fn default_recent_limit() -> u64 {
    10
}

fn default_reference_retry_limit() -> u32 {
    5
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            recent_limit: default_recent_limit(),
            reference_retry_limit: default_reference_retry_limit(),
        }
    }
}

/// Storage backend selection for proof documents.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Local filesystem under `root`.
    Fs,
    /// S3-compatible object storage.
    S3,
}

/// Proof document storage settings.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// Which backend to use.
    #[serde(default = "default_backend")]
    pub backend: StorageBackend,
    /// Root directory (fs) or key prefix (s3).
    #[serde(default = "default_storage_root")]
    pub root: String,
    /// Bucket name, s3 only.
    #[serde(default)]
    pub bucket: Option<String>,
    /// Region, s3 only.
    #[serde(default)]
    pub region: Option<String>,
    /// Custom endpoint for S3-compatible services.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Access key id, s3 only.
    #[serde(default)]
    pub access_key_id: Option<String>,
    /// Secret access key, s3 only.
    #[serde(default)]
    pub secret_access_key: Option<String>,
    /// Maximum accepted upload size in bytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: usize,
}

fn default_backend() -> StorageBackend {
    StorageBackend::Fs
}

fn default_storage_root() -> String {
    "./storage/proofs".to_string()
}

fn default_max_file_size() -> usize {
    5 * 1024 * 1024
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            root: default_storage_root(),
            bucket: None,
            region: None,
            endpoint: None,
            access_key_id: None,
            secret_access_key: None,
            max_file_size: default_max_file_size(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("MEDFIN").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_toml(raw: &str) -> AppConfig {
        config::Config::builder()
            .add_source(config::File::from_str(raw, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_defaults_applied() {
        let cfg = from_toml(
            r#"
            [server]
            [database]
            url = "sqlite::memory:"
            "#,
        );
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.database.max_connections, 10);
        assert_eq!(cfg.database.busy_timeout_secs, 5);
        assert_eq!(cfg.ledger.page_size, 15);
        assert_eq!(cfg.ledger.recent_limit, 10);
        assert_eq!(cfg.ledger.reference_retry_limit, 5);
        assert_eq!(cfg.storage.max_file_size, 5 * 1024 * 1024);
        assert!(matches!(cfg.storage.backend, StorageBackend::Fs));
    }

    #[test]
    fn test_overrides() {
        let cfg = from_toml(
            r#"
            [server]
            port = 9000
            [database]
            url = "postgres://localhost/medfin"
            [ledger]
            page_size = 50
            [storage]
            backend = "s3"
            bucket = "proofs"
            "#,
        );
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.ledger.page_size, 50);
        assert_eq!(cfg.ledger.recent_limit, 10);
        assert!(matches!(cfg.storage.backend, StorageBackend::S3));
        assert_eq!(cfg.storage.bucket.as_deref(), Some("proofs"));
    }
}
