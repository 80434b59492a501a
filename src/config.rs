//! Configuration loading
//!
//! Settings come from, in increasing precedence: built-in defaults, a
//! `minic.toml` file, and `MINIC_*` environment variables. The CLI loads a
//! `.env` file before building the configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Stack size for coroutine carrier threads, in kilobytes.
    pub carrier_stack_kb: usize,
    /// Default log filter when RUST_LOG is not set.
    pub log: String,
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    pub fn carrier_stack_bytes(&self) -> usize {
        self.carrier_stack_kb * 1024
    }
}

#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config_path: Option<String>,
}

impl ConfigBuilder {
    /// Explicit config file path, overriding the default search.
    pub fn config_path(mut self, path: Option<String>) -> ConfigBuilder {
        self.config_path = path;
        self
    }

    pub fn build(self) -> Result<Config> {
        let mut builder = config::Config::builder()
            .set_default("carrier_stack_kb", 512)?
            .set_default("log", "info")?;

        builder = match self.config_path {
            Some(path) => builder.add_source(config::File::with_name(&path)),
            None => builder.add_source(config::File::with_name("minic").required(false)),
        };

        builder
            .add_source(config::Environment::with_prefix("MINIC"))
            .build()
            .context("failed to load configuration")?
            .try_deserialize()
            .context("invalid configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_overrides() {
        // Shield the test from the caller's environment and working
        // directory: clear MINIC_* overrides and point the file source at
        // an explicit empty file instead of the cwd search.
        for (key, _) in std::env::vars() {
            if key.starts_with("MINIC_") {
                std::env::remove_var(&key);
            }
        }
        let path = std::env::temp_dir().join("minic-config-defaults.toml");
        std::fs::write(&path, "").unwrap();

        let config = Config::builder()
            .config_path(Some(path.to_string_lossy().into_owned()))
            .build()
            .unwrap();
        assert_eq!(config.carrier_stack_kb, 512);
        assert_eq!(config.carrier_stack_bytes(), 512 * 1024);
        assert_eq!(config.log, "info");
    }

    #[test]
    fn config_file_overrides_defaults() {
        for (key, _) in std::env::vars() {
            if key.starts_with("MINIC_") {
                std::env::remove_var(&key);
            }
        }
        let path = std::env::temp_dir().join("minic-config-override.toml");
        std::fs::write(&path, "carrier_stack_kb = 64\n").unwrap();

        let config = Config::builder()
            .config_path(Some(path.to_string_lossy().into_owned()))
            .build()
            .unwrap();
        assert_eq!(config.carrier_stack_kb, 64);
        assert_eq!(config.carrier_stack_bytes(), 64 * 1024);
    }
}
