use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::SortType;

const APP_NAME: &str = "habitsync";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Habit store location. `None` uses the platform data directory.
    pub database_path: Option<PathBuf>,
    /// Tracing filter used when `RUST_LOG` is not set.
    pub log_filter: String,
    /// Order applied to `list` output when no `--sort` is given.
    pub default_sort: Option<SortType>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            log_filter: "habitsync=info".to_string(),
            default_sort: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from `path`, or from the user's config directory.
    /// Returns default config if the file doesn't exist or fails to parse.
    pub fn load(path: Option<&Path>) -> Self {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match default_config_path() {
                Ok(p) => p,
                Err(e) => {
                    eprintln!("Failed to locate config, using defaults: {}", e);
                    return Self::default();
                }
            },
        };

        match Self::try_load(&path) {
            Ok(config) => config,
            Err(e) => {
                // Logging is configured from this file, so it isn't up yet
                eprintln!("Failed to load config, using defaults: {:#}", e);
                Self::default()
            }
        }
    }

    fn try_load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).context("Failed to read config file")?;

        let config = serde_json::from_str(&content).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Save the configuration to `path`, or to the user's config directory.
    pub fn save(&self, path: Option<&Path>) -> Result<()> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => default_config_path()?,
        };

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&config_path, content).context("Failed to write config file")?;

        Ok(())
    }
}

pub fn default_config_path() -> Result<PathBuf> {
    let mut path =
        config_dir().ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    path.push(APP_NAME);
    path.push(CONFIG_FILE);
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(Some(&dir.path().join("absent.json")));
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn save_then_load_preserves_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);
        let config = AppConfig {
            database_path: Some(dir.path().join("habits.db")),
            log_filter: "habitsync=debug".to_string(),
            default_sort: Some(SortType::Descending),
        };

        config.save(Some(&path)).unwrap();
        assert_eq!(AppConfig::load(Some(&path)), config);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, r#"{ "default_sort": "ascending" }"#).unwrap();

        let config = AppConfig::load(Some(&path));
        assert_eq!(config.default_sort, Some(SortType::Ascending));
        assert_eq!(config.log_filter, "habitsync=info");
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "not json").unwrap();

        assert_eq!(AppConfig::load(Some(&path)), AppConfig::default());
    }
}
