//! Configuration management for the virtxml tool.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use limiquantix_virtxml::LoadOptions;

use crate::cli::Args;

/// Config file looked up when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/limiquantix/virtxml.yaml";

/// Main configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Document loading options
    pub load: LoadOptions,
    /// Output formatting
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found: {}", path.display()));
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Apply CLI argument overrides to the configuration.
    pub fn with_cli_overrides(mut self, args: &Args) -> Self {
        if args.deny_unknown {
            self.load.deny_unknown = true;
        }

        if let Some(max_depth) = args.max_depth {
            self.load.max_depth = max_depth;
        }

        self
    }
}

/// Output formatting configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Spaces per nesting level in formatted XML
    pub indent: usize,
    /// Pretty-print JSON output
    pub json_pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            indent: 2,
            json_pretty: true,
        }
    }
}
