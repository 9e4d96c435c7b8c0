use super::Config;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info};

use crate::constants::registry;
use crate::errors::ConfigError;

pub struct ConfigManager {
    current_config: Arc<Config>,
}

impl ConfigManager {
    pub async fn new(config_path: &Path) -> Result<Self, ConfigError> {
        let config = Self::load_configuration(config_path).await?;
        Ok(Self {
            current_config: Arc::new(config),
        })
    }

    pub fn get_current_config(&self) -> Arc<Config> {
        self.current_config.clone()
    }

    /// `$HOME/bin/nodes_conf.toml`
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let home = std::env::var_os("HOME").ok_or_else(|| ConfigError::MissingRequired {
            field: "HOME environment variable".to_string(),
        })?;
        Ok(PathBuf::from(home).join(registry::DEFAULT_RELATIVE_PATH))
    }

    pub fn parse(content: &str) -> Result<Config, ConfigError> {
        let config: Config = toml::from_str(content).map_err(|e| ConfigError::ParseError {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    async fn load_configuration(config_path: &Path) -> Result<Config, ConfigError> {
        debug!("Loading node registry: {}", config_path.display());

        let content = fs::read_to_string(config_path)
            .await
            .map_err(|e| ConfigError::LoadFailed {
                path: config_path.display().to_string(),
                reason: e.to_string(),
            })?;

        let config = Self::parse(&content)?;

        info!(
            "Loaded {} nodes and {} reference endpoints from {}",
            config.nodes.len(),
            config.public_apis.len(),
            config_path.display()
        );

        Ok(config)
    }
}
