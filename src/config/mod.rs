use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub storage: StorageConfig,
    pub ingestion: IngestionConfig,
    pub labels: LabelConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Backing file for the artifact cache store
    pub cache_path: PathBuf,
    /// Total byte budget across all cached artifacts
    pub cache_budget_bytes: u64,
    /// Per-entry ceiling; larger payloads are never cached
    pub cache_entry_ceiling_bytes: u64,
    /// Entries older than this many seconds are swept on startup
    pub cache_max_age_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionConfig {
    /// CSV field delimiter
    pub delimiter: char,
    /// Flag records whose availability is negative in list output
    pub flag_negative_available: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelConfig {
    pub width_mm: u32,
    pub height_mm: u32,
    /// Name truncation length for the physical label
    pub name_chars: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage: StorageConfig {
                cache_path: PathBuf::from("./data/artifact-cache.json"),
                cache_budget_bytes: 512 * 1024,
                cache_entry_ceiling_bytes: 32 * 1024,
                cache_max_age_secs: 7 * 24 * 3600,
            },
            ingestion: IngestionConfig {
                delimiter: ',',
                flag_negative_available: true,
            },
            labels: LabelConfig {
                width_mm: 62,
                height_mm: 29,
                name_chars: 20,
            },
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_file =
            std::env::var("STOCKLENS_CONFIG").unwrap_or_else(|_| "config.toml".to_string());

        if std::path::Path::new(&config_file).exists() {
            let contents = std::fs::read_to_string(&config_file)?;
            Ok(toml::from_str(&contents)?)
        } else {
            let default_config = Self::default();
            let contents = toml::to_string_pretty(&default_config)?;
            std::fs::create_dir_all("./data")?;
            std::fs::write(&config_file, contents)?;
            Ok(default_config)
        }
    }
}
