use crate::error::{Result, SubhuntError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    /// Free-form key/value configuration per service, applied before
    /// initialization (e.g. `[services.opensubtitles] apikey = "..."`).
    #[serde(default)]
    pub services: HashMap<String, HashMap<String, String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Languages to download when none are given on the command line
    #[serde(default)]
    pub languages: Vec<String>,
    /// Services to query; empty means every registered service
    #[serde(default)]
    pub services: Vec<String>,
    /// Renames applied to the language part of the output file name
    /// (e.g. "pt-br" = "pt")
    #[serde(default)]
    pub lang_names: HashMap<String, String>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            languages: vec!["en".to_string()],
            services: Vec::new(),
            lang_names: HashMap::new(),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SubhuntError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| SubhuntError::Config(format!("Failed to parse config file: {}", e)))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| SubhuntError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| SubhuntError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }
}
