// src/environment.rs
use crate::error::{PitchError, PitchResult};
use crate::store::StoreConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    pub contexts_path: PathBuf,
    pub daily_limit: u32,
    pub model: String,
    pub openai_base_url: String,
    pub search_base_url: String,
    pub timeout_seconds: u64,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            contexts_path: PathBuf::from("contexts"),
            daily_limit: 250,
            model: "gpt-4".to_string(),
            openai_base_url: "https://api.openai.com/v1".to_string(),
            search_base_url: "https://www.googleapis.com/customsearch/v1".to_string(),
            timeout_seconds: 60,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    local: Option<EnvironmentConfig>,
    production: Option<EnvironmentConfig>,
}

impl EnvironmentConfig {
    /// Load configuration based on environment
    pub fn load() -> Result<Self> {
        let environment = Self::get_environment();
        info!("Loading configuration for environment: {}", environment);

        let config_path = std::env::var("PITCHBUDDY_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));

        Self::load_from_file(&config_path, &environment)
    }

    fn get_environment() -> String {
        std::env::var("PITCHBUDDY_ENV")
            .or_else(|_| std::env::var("ENVIRONMENT"))
            .unwrap_or_else(|_| "local".to_string())
    }

    /// Read one environment's section from a YAML file; a missing file yields defaults
    pub fn load_from_file(config_path: &Path, environment: &str) -> Result<Self> {
        let config_file = if config_path.exists() {
            let content = std::fs::read_to_string(config_path)
                .with_context(|| format!("Failed to read {}", config_path.display()))?;
            serde_yaml::from_str::<ConfigFile>(&content)
                .with_context(|| format!("Failed to parse {}", config_path.display()))?
        } else {
            warn!(
                "{} not found, using built-in defaults",
                config_path.display()
            );
            ConfigFile::default()
        };

        let env_config = match environment {
            "production" => config_file.production.unwrap_or_else(|| Self {
                contexts_path: PathBuf::from("/app/contexts"),
                ..Self::default()
            }),
            _ => config_file.local.unwrap_or_default(),
        };

        if env_config.daily_limit == 0 {
            anyhow::bail!("daily_limit must be greater than zero");
        }

        Ok(Self {
            contexts_path: Self::resolve_path(&env_config.contexts_path)?,
            ..env_config
        })
    }

    fn resolve_path(path: &Path) -> Result<PathBuf> {
        if path.is_absolute() {
            Ok(path.to_path_buf())
        } else {
            let current_dir = std::env::current_dir().context("Failed to get current directory")?;
            Ok(current_dir.join(path))
        }
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::new(self.contexts_path.clone())
    }

    /// Ensure all configured directories exist
    pub fn ensure_directories(&self) -> Result<()> {
        std::fs::create_dir_all(&self.contexts_path).with_context(|| {
            format!(
                "Failed to create directory: {}",
                self.contexts_path.display()
            )
        })?;
        info!("All configured directories ensured to exist");
        Ok(())
    }
}

/// Credentials for the external services, taken from the process environment only
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    pub openai_api_key: Option<String>,
    pub google_api_key: Option<String>,
    pub google_cse_id: Option<String>,
}

impl ApiKeys {
    pub fn from_env() -> Self {
        let read = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());
        Self {
            openai_api_key: read("OPENAI_API_KEY"),
            google_api_key: read("GOOGLE_API_KEY"),
            google_cse_id: read("GOOGLE_CSE_ID"),
        }
    }

    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.openai_api_key.is_none() {
            missing.push("OPENAI_API_KEY");
        }
        if self.google_api_key.is_none() {
            missing.push("GOOGLE_API_KEY");
        }
        if self.google_cse_id.is_none() {
            missing.push("GOOGLE_CSE_ID");
        }
        missing
    }

    pub fn openai(&self) -> PitchResult<&str> {
        self.openai_api_key
            .as_deref()
            .ok_or_else(|| PitchError::Config("Missing API keys: OPENAI_API_KEY".to_string()))
    }

    /// Returns `(api_key, cse_id)`
    pub fn search(&self) -> PitchResult<(&str, &str)> {
        match (self.google_api_key.as_deref(), self.google_cse_id.as_deref()) {
            (Some(key), Some(cse)) => Ok((key, cse)),
            _ => {
                let missing: Vec<_> = self
                    .missing()
                    .into_iter()
                    .filter(|k| k.starts_with("GOOGLE"))
                    .collect();
                Err(PitchError::Config(format!(
                    "Missing API keys: {}",
                    missing.join(", ")
                )))
            }
        }
    }
}
