use crate::cli::ConfigCommands;
use crate::config::{default_config_path, ApiSources, CliConfig};
use crate::error::CliError;

pub fn run_config(command: ConfigCommands, api_url: Option<String>) -> Result<(), CliError> {
    match command {
        ConfigCommands::Init { timeout_secs } => run_config_init(api_url, timeout_secs),
        ConfigCommands::Show => run_config_show(api_url),
    }
}

fn run_config_init(api_url: Option<String>, timeout_secs: Option<u64>) -> Result<(), CliError> {
    let existing = CliConfig::load()?;
    let config = merge_config(existing, api_url, timeout_secs)?;
    let path = config.save()?;
    println!("Saved config to {}", path.display());
    Ok(())
}

/// Validate and fold new values into the stored config.
pub fn merge_config(
    mut config: CliConfig,
    api_url: Option<String>,
    timeout_secs: Option<u64>,
) -> Result<CliConfig, CliError> {
    if let Some(url) = nodepad_core::config::normalize_text_option(api_url) {
        config.api_base_url = Some(nodepad_core::config::normalize_api_base_url(&url)?);
    }
    if let Some(secs) = timeout_secs {
        if secs == 0 {
            return Err(CliError::Config(
                "Timeout must be greater than zero".to_string(),
            ));
        }
        config.timeout_secs = Some(secs);
    }
    if config.api_base_url.is_none() {
        return Err(CliError::ApiNotConfigured);
    }
    Ok(config)
}

fn run_config_show(api_url: Option<String>) -> Result<(), CliError> {
    println!("Config file: {}", default_config_path()?.display());
    match ApiSources::gather(api_url)?.resolve() {
        Ok(config) => {
            println!("API base URL: {}", config.base_url);
            println!("Timeout: {}s", config.timeout_secs);
        }
        Err(CliError::ApiNotConfigured) => println!("API base URL: (not configured)"),
        Err(error) => return Err(error),
    }
    Ok(())
}
