//! `thicket config`: inspect and edit query defaults

use clap::{Args, Subcommand};

use crate::config::{config_file_path, Config};

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print one default (format, active_only, prefix)
    Get {
        key: String,
    },
    /// Change one default
    Set {
        key: String,
        value: String,
    },
    /// Restore one default to its built-in value
    Reset {
        key: String,
    },
    /// Print every default
    List,
    /// Print the config file location
    Path,
    /// Write a config file holding the built-in defaults
    Init {
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
}

pub fn run(args: &ConfigArgs) -> anyhow::Result<()> {
    match &args.command {
        ConfigCommands::Get { key } => run_get(key),
        ConfigCommands::Set { key, value } => run_set(key, value),
        ConfigCommands::Reset { key } => run_reset(key),
        ConfigCommands::List => run_list(),
        ConfigCommands::Path => {
            println!("{}", config_file_path().display());
            Ok(())
        }
        ConfigCommands::Init { force } => run_init(*force),
    }
}

/// Reject keys the config file does not carry before touching it
fn known_key(key: &str) -> anyhow::Result<&str> {
    if Config::keys().contains(&key) {
        Ok(key)
    } else {
        anyhow::bail!(
            "Unknown config key: {} (available: {})",
            key,
            Config::keys().join(", ")
        )
    }
}

fn run_get(key: &str) -> anyhow::Result<()> {
    let key = known_key(key)?;
    let value = Config::load().get(key).unwrap_or_default();
    println!("{}", value);
    Ok(())
}

fn run_set(key: &str, value: &str) -> anyhow::Result<()> {
    let key = known_key(key)?;
    let mut config = Config::load();
    config.set(key, value)?;
    config.save()?;
    tracing::info!("Set {} = {}", key, value);
    println!("{} = {}", key, value);
    Ok(())
}

fn run_reset(key: &str) -> anyhow::Result<()> {
    let key = known_key(key)?;
    let default = Config::default().get(key).unwrap_or_default();
    let mut config = Config::load();
    config.set(key, &default)?;
    config.save()?;
    println!("{} = {}", key, default);
    Ok(())
}

fn run_list() -> anyhow::Result<()> {
    let config = Config::load();
    let width = Config::keys().iter().map(|k| k.len()).max().unwrap_or(0);
    for key in Config::keys() {
        let value = config.get(key).unwrap_or_default();
        println!("{:width$} = {:?}", key, value, width = width);
    }
    Ok(())
}

fn run_init(force: bool) -> anyhow::Result<()> {
    let path = config_file_path();
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    Config::default().save()?;
    println!("Created config file at {}", path.display());
    Ok(())
}
