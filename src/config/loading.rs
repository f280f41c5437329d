use std::{fs, path::Path};

use tracing::{debug, instrument};

use super::{Config, ConfigPaths};
use crate::{ReelError, Result};

impl Config {
    /// Load the main configuration file, falling back to defaults when absent.
    ///
    /// # Errors
    /// Returns error if the file exists but cannot be read or parsed
    #[instrument]
    pub fn load() -> Result<Config> {
        let path = ConfigPaths::main_config()?;

        if !path.exists() {
            debug!("No config file at {}, using defaults", path.display());
            return Ok(Config::default());
        }

        Self::load_from(&path)
    }

    /// Load configuration from a specific TOML file.
    ///
    /// # Errors
    /// Returns error if the file cannot be read, parsed or fails validation
    pub fn load_from(path: &Path) -> Result<Config> {
        let file_content = fs::read_to_string(path)?;
        let config: Config =
            toml::from_str(&file_content).map_err(|e| ReelError::toml_parse(e, Some(path)))?;

        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    /// Returns error if the string is not valid configuration
    pub fn from_toml_str(content: &str) -> Result<Config> {
        let config: Config =
            toml::from_str(content).map_err(|e| ReelError::toml_parse(e, None))?;

        config.validate()?;
        Ok(config)
    }

    /// Render the configuration as TOML.
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    fn validate(&self) -> Result<()> {
        if self.playback.position_interval_ms == 0 {
            return Err(ReelError::InvalidConfigField {
                field: "playback.position_interval_ms".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        if self.library.favorites_name.trim().is_empty() {
            return Err(ReelError::InvalidConfigField {
                field: "library.favorites_name".to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        Ok(())
    }
}
