//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// JWT configuration.
    pub jwt: JwtSettings,
    /// Cash-up review configuration.
    #[serde(default)]
    pub cashup: CashupConfig,
    /// Evidence file storage configuration.
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
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// JWT configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// Secret key for validating tokens issued by the portal IdP.
    pub secret: String,
}

/// Cash-up submission review configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CashupConfig {
    /// Daily submission cutoff hour (24h clock).
    #[serde(default = "default_cutoff_hour")]
    pub cutoff_hour: u32,
    /// Grace period after the cutoff, in minutes.
    #[serde(default = "default_grace_minutes")]
    pub grace_minutes: i64,
}

impl Default for CashupConfig {
    fn default() -> Self {
        Self {
            cutoff_hour: default_cutoff_hour(),
            grace_minutes: default_grace_minutes(),
        }
    }
}

fn default_cutoff_hour() -> u32 {
    20
}

fn default_grace_minutes() -> i64 {
    30
}

/// Evidence storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// Storage backend: `s3`, `azblob`, or `fs`.
    #[serde(default = "default_storage_backend")]
    pub backend: String,
    /// Bucket or container name (unused for `fs`).
    #[serde(default)]
    pub bucket: String,
    /// Endpoint URL for S3-compatible backends.
    #[serde(default)]
    pub endpoint: String,
    /// Access key id (S3) or account name (Azure).
    #[serde(default)]
    pub access_key: String,
    /// Secret access key (S3) or account key (Azure).
    #[serde(default)]
    pub secret_key: String,
    /// Region for S3 backends.
    #[serde(default = "default_storage_region")]
    pub region: String,
    /// Root directory for the `fs` backend.
    #[serde(default = "default_storage_root")]
    pub root: String,
    /// Base URL prefixed to stored object keys to form retrieval URLs.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: default_storage_backend(),
            bucket: String::new(),
            endpoint: String::new(),
            access_key: String::new(),
            secret_key: String::new(),
            region: default_storage_region(),
            root: default_storage_root(),
            public_base_url: default_public_base_url(),
        }
    }
}

fn default_storage_backend() -> String {
    "fs".to_string()
}

fn default_storage_region() -> String {
    "us-east-1".to_string()
}

fn default_storage_root() -> String {
    "./uploads".to_string()
}

fn default_public_base_url() -> String {
    "/files".to_string()
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
            .add_source(config::Environment::with_prefix("TILLBOOK").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cashup_defaults() {
        let cfg = CashupConfig::default();
        assert_eq!(cfg.cutoff_hour, 20);
        assert_eq!(cfg.grace_minutes, 30);
    }

    #[test]
    fn test_storage_defaults() {
        let cfg = StorageSettings::default();
        assert_eq!(cfg.backend, "fs");
        assert_eq!(cfg.root, "./uploads");
        assert_eq!(cfg.public_base_url, "/files");
    }
}
