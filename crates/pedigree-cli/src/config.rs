//! CLI configuration

use std::path::PathBuf;

use anyhow::Context;
use pedigree_core::limits;
use serde::{Deserialize, Serialize};

use crate::output::OutputFormat;

/// Overrides the config file location
pub const CONFIG_ENV: &str = "PEDIGREE_CONFIG";

const DEFAULT_GENERATIONS: u32 = 5;

/// Get default data directory
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pedigree")
}

/// Location of `config.toml`
pub fn config_file_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return PathBuf::from(path);
    }
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pedigree")
        .join("config.toml")
}

/// Configuration for the CLI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    pub default_generations: u32,
    pub output_format: OutputFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            default_generations: DEFAULT_GENERATIONS,
            output_format: OutputFormat::Table,
        }
    }
}

impl Config {
    pub fn keys() -> &'static [&'static str] {
        &["data_dir", "default_generations", "output_format"]
    }

    /// Load the config file, falling back to defaults if it is missing or unreadable
    pub fn load() -> Self {
        let path = config_file_path();
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&path)
            .map_err(anyhow::Error::from)
            .and_then(|s| Self::parse(&s))
        {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Ignoring config file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn parse(s: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let path = config_file_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(&path, toml::to_string_pretty(self)?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::debug!("Saved config to {}", path.display());
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "data_dir" => Some(
                self.data_dir
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| format!("{} (default)", default_data_dir().display())),
            ),
            "default_generations" => Some(self.default_generations.to_string()),
            "output_format" => Some(self.output_format.to_string()),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        match key {
            "data_dir" => self.data_dir = Some(PathBuf::from(value)),
            "default_generations" => {
                let generations: u32 = value
                    .trim()
                    .parse()
                    .with_context(|| format!("Not a number: {}", value))?;
                limits::validate_generations(generations).map_err(|e| anyhow::anyhow!("{}", e))?;
                self.default_generations = generations;
            }
            "output_format" => {
                self.output_format = value.parse().map_err(|e: String| anyhow::anyhow!(e))?;
            }
            _ => anyhow::bail!(
                "Unknown config key: {} (available: {})",
                key,
                Self::keys().join(", ")
            ),
        }
        Ok(())
    }
}
