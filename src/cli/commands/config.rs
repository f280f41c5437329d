use schemars::schema_for;

use crate::{
    cli::{CliError, CommandResult, ConfigCommand},
    config::{Config, ConfigPaths},
};

/// Execute a `config` subcommand.
///
/// # Errors
/// Returns `CliError` if serialization fails or the config path is unknown
pub fn execute(command: ConfigCommand, config: &Config) -> CommandResult {
    match command {
        ConfigCommand::Show => Ok(config.to_toml_string()?),
        ConfigCommand::Schema => {
            let schema = schema_for!(Config);
            serde_json::to_string_pretty(&schema).map_err(|e| CliError::ServiceError {
                service: "Config".to_string(),
                details: e.to_string(),
            })
        }
        ConfigCommand::Path => Ok(ConfigPaths::main_config()?.display().to_string()),
    }
}
