//! # virtxml
//!
//! Command-line front-end for the limiquantix libvirt XML transcoder.
//!
//! ## Usage
//! ```bash
//! virtxml check /etc/libvirt/qemu/web-01.xml
//! virtxml format vm.xml --output vm.canonical.xml
//! virtxml show snapshot.xml --kind snapshot
//! virtxml schema Disk
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, error, info};

use limiquantix_common::LogFormat;

mod cli;
mod commands;
mod config;

use cli::{Args, Command};
use config::{Config, DEFAULT_CONFIG_PATH};

fn main() -> Result<()> {
    let args = Args::parse();

    let format = if args.log_json { LogFormat::Json } else { LogFormat::Pretty };
    limiquantix_common::init(format, &args.log_level)?;

    debug!(version = env!("CARGO_PKG_VERSION"), "Starting virtxml");

    let config = load_config(&args)?;

    if let Err(e) = run(&args, &config) {
        error!(error = %e, "Command failed");
        return Err(e);
    }
    Ok(())
}

fn load_config(args: &Args) -> Result<Config> {
    let config = match &args.config {
        Some(config_path) => {
            let cfg = Config::load(config_path)?;
            info!(config_path = %config_path, "Configuration loaded");
            cfg
        }
        None => match Config::load(DEFAULT_CONFIG_PATH) {
            Ok(cfg) => {
                info!(config_path = %DEFAULT_CONFIG_PATH, "Configuration loaded from default location");
                cfg
            }
            Err(_) => {
                debug!("No config file found, using CLI arguments and defaults");
                Config::default()
            }
        },
    };
    Ok(config.with_cli_overrides(args))
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn run(args: &Args, config: &Config) -> Result<()> {
    let options = &config.load;
    match &args.command {
        Command::Check { file, kind } => {
            let text = read(file)?;
            let result = commands::check(&text, *kind, options)
                .with_context(|| format!("{} is not valid", file.display()))?;
            println!("{}", result);
        }
        Command::Format { file, output, kind } => {
            let text = read(file)?;
            let xml = commands::format(&text, *kind, options, &config.output)
                .with_context(|| format!("Failed to format {}", file.display()))?;
            match output {
                Some(path) => {
                    std::fs::write(path, xml)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    info!(output = %path.display(), "Formatted document written");
                }
                None => print!("{}", xml),
            }
        }
        Command::Show { file, kind } => {
            let text = read(file)?;
            let json = commands::show(&text, *kind, options, &config.output)
                .with_context(|| format!("Failed to load {}", file.display()))?;
            println!("{}", json);
        }
        Command::Schema { type_name, json } => {
            println!("{}", commands::schema(type_name.as_deref(), *json)?);
        }
    }
    Ok(())
}
