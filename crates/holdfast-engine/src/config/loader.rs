use super::schema::HoldfastConfig;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid value for {name}: '{value}'")]
    InvalidEnv { name: String, value: String },
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load from default locations:
    /// 1. ./holdfast.yaml
    /// 2. ~/.holdfast/config.yaml
    /// 3. Default configuration
    ///
    /// Environment overrides are applied on top in every case.
    pub async fn load_default() -> Result<HoldfastConfig, ConfigError> {
        let mut config = match Self::default_path() {
            Some(path) => Self::load_from(&path).await?,
            None => HoldfastConfig::default(),
        };
        Self::apply_env(&mut config, |name| std::env::var(name).ok())?;
        Ok(config)
    }

    pub async fn load_from(path: &Path) -> Result<HoldfastConfig, ConfigError> {
        debug!("Loading config from {}", path.display());
        let content = tokio::fs::read_to_string(path).await?;
        let config: HoldfastConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    fn default_path() -> Option<PathBuf> {
        let local_config = PathBuf::from("./holdfast.yaml");
        if local_config.exists() {
            return Some(local_config);
        }

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".holdfast").join("config.yaml");
            if home_config.exists() {
                return Some(home_config);
            }
        }

        None
    }

    /// Apply environment-style overrides. `lookup` abstracts the environment
    /// so overrides can be exercised without touching process state.
    pub fn apply_env<F>(config: &mut HoldfastConfig, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("HEADLESS") {
            config.browser.headless = parse_flag(&value);
        }
        if let Some(value) = lookup("DOWNLOAD_DIR")
            && !value.trim().is_empty()
        {
            config.browser.download_dir = Some(PathBuf::from(value));
        }
        if let Some(value) = lookup("HOLDFAST_WEBDRIVER_URL") {
            config.browser.webdriver_url = value;
        }
        if let Some(value) = lookup("HOLDFAST_BASE_URL") {
            config.target.base_url = value.trim_end_matches('/').to_string();
        }
        if let Some(value) = lookup("HOLDFAST_USERNAME") {
            config.target.username = value;
        }
        if let Some(value) = lookup("HOLDFAST_PASSWORD") {
            config.target.password = value;
        }
        if let Some(value) = lookup("HOLDFAST_WAIT_TIMEOUT_MS") {
            config.waits.default_timeout_ms = parse_millis("HOLDFAST_WAIT_TIMEOUT_MS", &value)?;
        }
        if let Some(value) = lookup("HOLDFAST_POLL_INTERVAL_MS") {
            config.waits.poll_interval_ms = parse_millis("HOLDFAST_POLL_INTERVAL_MS", &value)?;
        }
        Ok(())
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes")
}

fn parse_millis(name: &str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        name: name.to_string(),
        value: value.to_string(),
    })
}
