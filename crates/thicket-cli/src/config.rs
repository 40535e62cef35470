//! CLI configuration

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "THICKET_CONFIG";

/// Get default config directory
pub fn default_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".thicket")
}

/// Path of the config file, honoring `THICKET_CONFIG`
pub fn config_file_path() -> PathBuf {
    match std::env::var_os(CONFIG_ENV) {
        Some(path) if !path.is_empty() => PathBuf::from(path),
        _ => default_config_dir().join("config.toml"),
    }
}

/// Configuration for the CLI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Default output format (table, json)
    #[serde(default = "default_format")]
    pub format: String,

    /// Only report active nodes unless overridden
    #[serde(default)]
    pub active_only: bool,

    /// Prefix applied to generated names
    #[serde(default)]
    pub prefix: String,
}

fn default_format() -> String {
    "table".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            format: default_format(),
            active_only: false,
            prefix: String::new(),
        }
    }
}

impl Config {
    /// Load the config file, falling back to defaults
    pub fn load() -> Self {
        let path = config_file_path();
        let Ok(contents) = std::fs::read_to_string(&path) else {
            return Self::default();
        };
        match toml::from_str(&contents) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Ignoring invalid config file {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let path = config_file_path();
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(&path, toml::to_string_pretty(self)?)?;
        tracing::debug!("Saved config to {:?}", path);
        Ok(())
    }

    pub fn keys() -> &'static [&'static str] {
        &["format", "active_only", "prefix"]
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "format" => Some(self.format.clone()),
            "active_only" => Some(self.active_only.to_string()),
            "prefix" => Some(self.prefix.clone()),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        match key {
            "format" => match value {
                "table" | "json" => self.format = value.to_string(),
                _ => anyhow::bail!("Invalid format '{}': expected table or json", value),
            },
            "active_only" => {
                self.active_only = value
                    .parse()
                    .map_err(|_| anyhow::anyhow!("Invalid boolean '{}'", value))?;
            }
            "prefix" => self.prefix = value.to_string(),
            _ => anyhow::bail!(
                "Unknown config key: {} (available: {})",
                key,
                Self::keys().join(", ")
            ),
        }
        Ok(())
    }
}
