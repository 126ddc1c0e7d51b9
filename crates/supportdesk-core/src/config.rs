use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, anyhow};

use crate::analytics::AnalyticsSource;
use crate::gateway::DEFAULT_BASE_URL;

/// Environment variable that overrides the configured backend URL
pub const API_URL_ENV: &str = "SUPPORTDESK_API_URL";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub api_base_url: Option<String>,
    pub analytics_source: Option<String>,
    pub log_level: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(config_path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(config_path, config_content)?;
        Ok(())
    }

    /// Backend URL: env var first, then config file, then the local default
    pub fn api_base_url(&self) -> String {
        self.resolve_api_base_url(std::env::var(API_URL_ENV).ok())
    }

    fn resolve_api_base_url(&self, from_env: Option<String>) -> String {
        from_env
            .filter(|url| !url.trim().is_empty())
            .or_else(|| self.api_base_url.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    pub fn analytics_source(&self) -> AnalyticsSource {
        self.analytics_source
            .as_deref()
            .and_then(AnalyticsSource::from_str)
            .unwrap_or(AnalyticsSource::Static)
    }

    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or("info")
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("supportdesk").join("config.json"))
    }
}
