use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ShepherdError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub data_dir: String,
    /// Hard cap on rows processed per export phase, a guard against
    /// runaway loops over buggy or enormous source data.
    #[serde(default = "default_loop_threshold")]
    pub loop_threshold: u64,
    /// Soft size limit per image archive, in megabytes.
    #[serde(default = "default_image_archive_mb")]
    pub image_archive_mb: u64,
}

fn default_loop_threshold() -> u64 {
    250_000
}

fn default_image_archive_mb() -> u64 {
    100
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir().to_string_lossy().to_string(),
            loop_threshold: default_loop_threshold(),
            image_archive_mb: default_image_archive_mb(),
        }
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("shepherd")
}

fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents")
        .join("shepherd")
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    if path.exists() {
        let content = std::fs::read_to_string(&path).unwrap_or_default();
        serde_json::from_str(&content).unwrap_or_default()
    } else {
        Settings::default()
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| ShepherdError::Settings(e.to_string()))?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}

pub fn get_data_dir() -> PathBuf {
    PathBuf::from(&load_settings().data_dir)
}
