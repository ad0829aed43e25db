//! Application Configuration
//!
//! Configuration management for the service, supporting a YAML configuration
//! file with sensible defaults.

use std::fs;
use std::path::Path;

use log::{info, warn};
use serde::{Deserialize, Serialize};

/// Blob storage backend types
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub enum BlobBackend {
    #[default]
    LocalDir,
    Mock,
}

/// Snapshot persistence backend types
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub enum PersistenceBackend {
    #[default]
    Json,
    Mock,
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub blobs: BlobConfig,
    pub persistence: PersistenceConfig,
    pub sweep: SweepConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Number of worker threads
    pub workers: usize,
    /// Maximum upload payload size in bytes
    pub max_payload_size: usize,
}

/// Blob storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlobConfig {
    pub backend: BlobBackend,
    /// Directory the kind subdirectories (images/, audio/) live under
    pub upload_root: String,
}

/// Snapshot persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    pub backend: PersistenceBackend,
    /// Directory holding albums.json and songs.json
    pub data_dir: String,
}

/// Orphan blob sweeper configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepConfig {
    pub enabled: bool,
    /// Seconds between sweep passes
    pub interval_secs: u64,
    /// Blobs younger than this are never swept; keeps the sweeper clear of
    /// uploads whose record append has not happened yet
    pub min_age_secs: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Path to the log4rs configuration file
    pub config_file: String,
}

impl AppConfig {
    /// Load configuration from file, use defaults if not found
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = "config.yaml";
        if Path::new(config_path).exists() {
            let content = fs::read_to_string(config_path)?;
            let config: AppConfig = serde_yaml::from_str(&content)?;
            info!("Loaded configuration from {}", config_path);
            Ok(config)
        } else {
            warn!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3001,
                workers: 4,
                max_payload_size: 104857600, // 100MB
            },
            blobs: BlobConfig {
                backend: BlobBackend::LocalDir,
                upload_root: "./data/uploads".to_string(),
            },
            persistence: PersistenceConfig {
                backend: PersistenceBackend::Json,
                data_dir: "./data".to_string(),
            },
            sweep: SweepConfig {
                enabled: true,
                interval_secs: 300, // 5 minutes
                min_age_secs: 60,
            },
            logging: LoggingConfig {
                config_file: "server_log.yaml".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_consistent() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 3001);
        assert_eq!(config.blobs.backend, BlobBackend::LocalDir);
        assert_eq!(config.persistence.backend, PersistenceBackend::Json);
        assert!(config.sweep.enabled);
        assert!(config.sweep.min_age_secs > 0);
    }

    #[test]
    fn test_yaml_round_trip() {
        let config = AppConfig::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: AppConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.server.host, config.server.host);
        assert_eq!(parsed.blobs.upload_root, config.blobs.upload_root);
    }

    #[test]
    fn test_parses_explicit_yaml() {
        let yaml = r#"
server:
  host: 0.0.0.0
  port: 8080
  workers: 2
  max_payload_size: 1048576
blobs:
  backend: Mock
  upload_root: /tmp/uploads
persistence:
  backend: Mock
  data_dir: /tmp/data
sweep:
  enabled: false
  interval_secs: 60
  min_age_secs: 10
logging:
  config_file: log.yaml
"#;
        let parsed: AppConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(parsed.server.port, 8080);
        assert_eq!(parsed.blobs.backend, BlobBackend::Mock);
        assert!(!parsed.sweep.enabled);
    }
}
