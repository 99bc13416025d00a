//! Config command handler
//!
//! `config` prints the whole file, `config KEY` one value, `config KEY VALUE`
//! validates and saves a change.

use crate::config::Config;
use crate::error::{Error, Result};
use clap::Args;

/// Config command arguments
#[derive(Args)]
pub struct ConfigArgs {
    /// Dotted key (e.g., "zones.radius_meters")
    pub key: Option<String>,

    /// New value; shows the current value when omitted
    pub value: Option<String>,

    /// Print the config file location
    #[arg(long, conflicts_with_all = ["key", "reset", "keys"])]
    pub path: bool,

    /// Overwrite the config file with defaults
    #[arg(long, conflicts_with_all = ["key", "keys"])]
    pub reset: bool,

    /// List every settable key
    #[arg(long, conflicts_with = "key")]
    pub keys: bool,
}

/// Run the config command
pub fn run(args: ConfigArgs) -> Result<()> {
    if args.path {
        println!("{}", Config::config_path()?.display());
        return Ok(());
    }

    if args.reset {
        Config::default().save()?;
        println!("Configuration reset to defaults");
        return Ok(());
    }

    if args.keys {
        for key in Config::available_keys() {
            println!("{}", key);
        }
        return Ok(());
    }

    let mut config = Config::load()?;
    match (args.key, args.value) {
        (None, _) => {
            let content = toml::to_string_pretty(&config)
                .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
            print!("{}", content);
        }
        (Some(key), None) => {
            let value = config.get(&key).ok_or_else(|| unknown_key(&key))?;
            println!("{}", value);
        }
        (Some(key), Some(value)) => {
            if config.get(&key).is_none() {
                return Err(unknown_key(&key));
            }
            config.set(&key, &value)?;
            config.save()?;
            println!("{} = {}", key, config.get(&key).unwrap_or(value));
        }
    }

    Ok(())
}

fn unknown_key(key: &str) -> Error {
    Error::Config(format!(
        "Unknown config key: {} (try one of: {})",
        key,
        Config::available_keys().join(", ")
    ))
}
