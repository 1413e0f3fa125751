//! Configuration for the search tool

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::catalog::SearchModel;
use crate::submit::Transport;

/// Search tool configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Model used when none is given on the command line
    #[serde(default)]
    pub model: Option<SearchModel>,

    /// GET query string or POST form body
    #[serde(default)]
    pub transport: Transport,

    /// Prefix for search page URLs, e.g. `https://rdb.example.org`
    #[serde(default)]
    pub base_url: String,

    /// Directory holding `<model>.{json,yaml}` catalog overrides
    #[serde(default)]
    pub catalog_dir: Option<PathBuf>,
}

impl Config {
    /// Load config from the default location, or defaults if absent
    pub fn load() -> Result<Self> {
        let config_path = Self::default_path();

        if !config_path.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    /// Load config from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;

        Ok(config)
    }

    /// Get default config file path
    /// Checks ~/.config/rdb-search/config.toml first (XDG style),
    /// then falls back to OS-specific location
    pub fn default_path() -> PathBuf {
        if let Some(home) = dirs::home_dir() {
            let xdg_path = home.join(".config").join("rdb-search").join("config.toml");
            if xdg_path.exists() {
                return xdg_path;
            }
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("rdb-search")
            .join("config.toml")
    }

    /// Full URL of the search page for `model`
    pub fn action_url(&self, model: SearchModel) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), model.search_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_config_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
model = "build"
transport = "post"
base_url = "https://rdb.example.org/"
catalog_dir = "/etc/rdb/catalogs"
"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();

        assert_eq!(config.model, Some(SearchModel::Build));
        assert_eq!(config.transport, Transport::Post);
        assert_eq!(
            config.action_url(SearchModel::Part),
            "https://rdb.example.org/search/parts"
        );
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "").unwrap();

        let config = Config::load_from(&path).unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.action_url(SearchModel::Inventory), "/search/inventory");
    }
}
