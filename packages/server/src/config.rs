use std::path::PathBuf;

use common::{IngestConfig, SweepConfig};
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::ingest::stuck_timeout;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Directory holding uploads until their ingestion run finishes.
    pub upload_dir: PathBuf,
    /// Maximum accepted upload size in bytes.
    pub max_upload_size: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
    #[serde(default)]
    pub sweep: SweepConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let path =
            std::env::var("CADBLOCK_CONFIG").unwrap_or_else(|_| "config/config".to_string());

        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 5001)?
            .set_default("server.cors.allow_origins", vec!["http://localhost:3000"])?
            .set_default("server.cors.max_age", 3600)?
            .set_default("storage.upload_dir", "./uploads")?
            .set_default("storage.max_upload_size", 20 * 1024 * 1024)?
            .add_source(File::with_name(&path).required(false))
            // Override from environment (e.g., CADBLOCK__DATABASE__URL)
            .add_source(
                Environment::with_prefix("CADBLOCK")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.cors.allow_origins")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = s.try_deserialize()?;
        validate_sweep(&config.sweep)?;
        Ok(config)
    }
}

fn validate_sweep(sweep: &SweepConfig) -> Result<(), ConfigError> {
    if sweep.enabled && stuck_timeout(sweep.stuck_timeout_secs).is_none() {
        return Err(ConfigError::Message(format!(
            "sweep.stuck_timeout_secs is out of range: {}",
            sweep.stuck_timeout_secs
        )));
    }
    Ok(())
}
