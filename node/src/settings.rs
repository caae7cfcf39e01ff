//! Engine configuration resolution for the node.
//!
//! Precedence, lowest first: built-in defaults, the JSON config file, the
//! `--network` flag (or `SOLARFUND_NETWORK`).

use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};

use solarfund_protocol::config::{EngineConfig, NetworkMode};

/// Config file name inside the data directory.
pub const CONFIG_FILE: &str = "config.json";

/// sled directory inside the data directory.
pub const DB_DIR: &str = "db";

/// Where the config file lives when `--config` is not given.
pub fn default_config_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CONFIG_FILE)
}

/// Parse a `--network` value.
pub fn parse_network(value: &str) -> Result<NetworkMode> {
    NetworkMode::parse(value)
        .ok_or_else(|| anyhow!("unknown network '{value}', expected sandbox or production"))
}

/// Build the engine config from file and overrides, then validate it.
///
/// An explicit `config_path` must exist. The default path is optional.
pub fn load_engine_config(
    data_dir: &Path,
    config_path: Option<&Path>,
    network: Option<&str>,
) -> Result<EngineConfig> {
    let mut config = match config_path {
        Some(path) => read_config(path)?,
        None => {
            let path = default_config_path(data_dir);
            if path.exists() {
                read_config(&path)?
            } else {
                EngineConfig::default()
            }
        }
    };

    if let Some(value) = network {
        config.network = parse_network(value)?;
    }
    config.validate().context("invalid engine configuration")?;
    Ok(config)
}

/// Write `config` as pretty JSON. Refuses to overwrite unless `force`.
pub fn write_config(path: &Path, config: &EngineConfig, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "config file {} already exists (use --force to overwrite)",
            path.display()
        );
    }
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write config to {}", path.display()))
}

fn read_config(path: &Path) -> Result<EngineConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("failed to parse config file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn defaults_without_any_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_engine_config(dir.path(), None, None).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn network_flag_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = default_config_path(dir.path());
        write_config(&path, &EngineConfig::for_network(NetworkMode::Sandbox), false).unwrap();

        let config = load_engine_config(dir.path(), None, Some("mainnet")).unwrap();
        assert_eq!(config.network, NetworkMode::Production);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.json");
        std::fs::write(&path, r#"{"fee_reserve":"2.5"}"#).unwrap();

        let config = load_engine_config(dir.path(), Some(&path), None).unwrap();
        assert_eq!(config.fee_reserve, Decimal::new(25, 1));
        assert_eq!(config.network, NetworkMode::Sandbox);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        assert!(load_engine_config(dir.path(), Some(&missing), None).is_err());
    }

    #[test]
    fn invalid_values_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_engine_config(dir.path(), None, Some("moon")).is_err());

        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{"fee_reserve":"-1"}"#).unwrap();
        assert!(load_engine_config(dir.path(), Some(&path), None).is_err());
    }

    #[test]
    fn write_refuses_to_clobber() {
        let dir = tempfile::tempdir().unwrap();
        let path = default_config_path(dir.path());
        write_config(&path, &EngineConfig::default(), false).unwrap();
        assert!(write_config(&path, &EngineConfig::default(), false).is_err());
        assert!(write_config(&path, &EngineConfig::default(), true).is_ok());
    }
}
