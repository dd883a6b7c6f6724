//! Config commands

use crate::config::Config;
use crate::ConfigCommands;

pub async fn handle(action: ConfigCommands) -> Result<(), String> {
    match action {
        ConfigCommands::Init => {
            let config = Config::default();
            config.save()?;
            println!("Configuration initialized at ~/.govpoint/config.toml");
        }
        ConfigCommands::Set { key, value } => {
            let mut config = Config::load(None).unwrap_or_default();
            match key.as_str() {
                "portal_url" => config.portal_url = Some(value),
                "iam_only" => {
                    config.iam_only = Some(value.parse::<bool>().map_err(|e| e.to_string())?)
                }
                "default_format" => config.default_format = Some(value),
                _ => return Err(format!("Unknown config key: {}", key)),
            }
            config.save()?;
            println!("Set {} successfully", key);
        }
        ConfigCommands::Get { key } => {
            let config = Config::load(None).unwrap_or_default();
            let value = match key.as_str() {
                "portal_url" => config.portal_url,
                "iam_only" => config.iam_only.map(|v| v.to_string()),
                "default_format" => config.default_format,
                _ => return Err(format!("Unknown config key: {}", key)),
            };
            println!("{}: {}", key, value.unwrap_or_else(|| "(not set)".into()));
        }
        ConfigCommands::List => {
            let config = Config::load(None).unwrap_or_default();
            println!(
                "portal_url: {}",
                config.portal_url.unwrap_or_else(|| "(not set)".into())
            );
            println!(
                "iam_only: {}",
                config.iam_only.map(|v| v.to_string()).unwrap_or_else(|| "(not set)".into())
            );
            println!(
                "default_format: {}",
                config.default_format.unwrap_or_else(|| "(not set)".into())
            );
        }
    }
    Ok(())
}
