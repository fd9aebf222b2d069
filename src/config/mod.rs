//! Configuration loading and management

use crate::core::store::RecordStore;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// Which [`RecordStore`] implementation backs the shop
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// One JSON file per collection under `data_dir`
    #[default]
    File,
    /// Process memory; everything is lost on exit
    Memory,
}

/// Storage section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Directory holding the collection files (file backend only)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            data_dir: default_data_dir(),
        }
    }
}

impl StorageConfig {
    /// Open the configured store
    pub fn open(&self) -> Result<Arc<dyn RecordStore>> {
        match self.backend {
            StorageBackend::Memory => Ok(Arc::new(crate::storage::InMemoryStore::new())),
            #[cfg(feature = "file-store")]
            StorageBackend::File => {
                let store = crate::storage::JsonFileStore::open(&self.data_dir)?;
                Ok(Arc::new(store))
            }
            #[cfg(not(feature = "file-store"))]
            StorageBackend::File => {
                anyhow::bail!("file storage requested but the `file-store` feature is disabled")
            }
        }
    }
}

/// Server section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to listen on (e.g., "127.0.0.1:3000")
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

/// Presentation settings for amounts and receipts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingConfig {
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,

    #[serde(default = "default_shop_name")]
    pub shop_name: String,

    #[serde(default = "default_tagline")]
    pub tagline: String,

    #[serde(default = "default_support_email")]
    pub support_email: String,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            currency_symbol: default_currency_symbol(),
            shop_name: default_shop_name(),
            tagline: default_tagline(),
            support_email: default_support_email(),
        }
    }
}

/// Complete configuration for the `fixdesk` binary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopConfig {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub billing: BillingConfig,

    /// `tracing` filter directive used when `RUST_LOG` is unset
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            server: ServerConfig::default(),
            billing: BillingConfig::default(),
            log_filter: default_log_filter(),
        }
    }
}

impl ShopConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_bind() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_currency_symbol() -> String {
    "₹".to_string()
}

fn default_shop_name() -> String {
    "Repair Center".to_string()
}

fn default_tagline() -> String {
    "Professional Device Repair Services".to_string()
}

fn default_support_email() -> String {
    "support@repaircenter.com".to_string()
}

fn default_log_filter() -> String {
    "info".to_string()
}
