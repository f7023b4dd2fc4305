//! Configuration Loader - File Loading and Validation
//!
//! Handles loading `marketplace.toml`, validating all parameters,
//! and providing clear error messages for misconfiguration.

use std::path::Path;

use alloy::signers::local::PrivateKeySigner;
use anyhow::{Context, Result};
use tracing::info;

use super::{AppConfig, NetworkConfig, NetworkKind};

/// Default config file name, resolved against the working directory.
pub const CONFIG_FILE: &str = "marketplace.toml";

/// Load and validate configuration from a TOML file.
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<AppConfig> {
  let path = Path::new(path);

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  let config = parse_config(&content)?;

  info!(
    network = %config.network.name,
    kind = ?config.network.kind,
    chain_id = config.network.chain_id,
    "Configuration loaded successfully"
  );

  Ok(config)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<AppConfig> {
  let config: AppConfig =
    toml::from_str(content).with_context(|| "Failed to parse marketplace.toml")?;
  validate_config(&config)?;
  Ok(config)
}

/// Read the signing key from the environment variable the config names.
///
/// # Errors
/// Fails if the variable is unset or does not hold a valid hex key.
pub fn load_signer(network: &NetworkConfig) -> Result<PrivateKeySigner> {
  let raw = std::env::var(&network.private_key_env)
    .with_context(|| format!("{} not set", network.private_key_env))?;
  raw
    .trim()
    .parse::<PrivateKeySigner>()
    .with_context(|| format!("{} is not a valid private key", network.private_key_env))
}

/// Validate all configuration parameters.
///
/// Checks for:
/// - Non-empty identity and endpoints
/// - Strictly positive listing fee
/// - RPC settings present when targeting an RPC network
fn validate_config(config: &AppConfig) -> Result<()> {
  anyhow::ensure!(!config.app.name.is_empty(), "app.name must not be empty");
  anyhow::ensure!(
    !config.network.name.is_empty(),
    "network.name must not be empty"
  );
  anyhow::ensure!(
    !config.network.private_key_env.is_empty(),
    "network.private_key_env must not be empty"
  );

  // Contract validation
  anyhow::ensure!(
    !config.contracts.listing_fee_wei.is_zero(),
    "contracts.listing_fee_wei must be positive"
  );

  match config.network.kind {
    NetworkKind::Rpc => {
      let rpc_url = config.network.rpc_url.as_deref().unwrap_or_default();
      anyhow::ensure!(
        !rpc_url.is_empty(),
        "network.rpc_url is required for rpc networks"
      );
      anyhow::ensure!(
        config.contracts.marketplace_artifact.is_some()
          && config.contracts.registry_artifact.is_some(),
        "contracts.marketplace_artifact and contracts.registry_artifact are required for rpc networks"
      );
    }
    NetworkKind::Local => {
      anyhow::ensure!(
        config.local.genesis_balance_ether > 0,
        "local.genesis_balance_ether must be positive"
      );
    }
  }

  // Pinning validation
  anyhow::ensure!(
    !config.pinning.api_url.is_empty(),
    "pinning.api_url must not be empty"
  );
  anyhow::ensure!(
    !config.pinning.gateway_url.is_empty(),
    "pinning.gateway_url must not be empty"
  );

  anyhow::ensure!(
    config.http.timeout_seconds > 0,
    "http.timeout_seconds must be positive"
  );

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  const LOCAL: &str = r#"
[app]
name = "Mueshi"

[network]
kind = "local"
name = "hardhat"

[pinning]
api_url = "https://ipfs.infura.io:5001"
gateway_url = "https://ipfs.infura.io"
"#;

  #[test]
  fn test_load_nonexistent_file() {
    let result = load_config("nonexistent.toml");
    assert!(result.is_err());
  }

  #[test]
  fn test_local_defaults() {
    let config = parse_config(LOCAL).unwrap();
    assert_eq!(config.network.kind, NetworkKind::Local);
    assert_eq!(config.network.chain_id, 1337);
    assert_eq!(config.network.private_key_env, "PRIVATE_KEY");
    assert_eq!(config.app.log_level, "info");
    assert_eq!(config.local.genesis_balance_ether, 10_000);
    assert_eq!(
      config.contracts.listing_fee_wei,
      alloy::primitives::U256::from(crate::domain::DEFAULT_LISTING_FEE_WEI)
    );
    assert_eq!(config.persistence.data_dir, "data");
    assert_eq!(config.http.timeout_seconds, 30);
  }

  #[test]
  fn test_rpc_requires_url_and_artifacts() {
    let rpc = LOCAL.replace("kind = \"local\"", "kind = \"rpc\"");
    let err = parse_config(&rpc).unwrap_err();
    assert!(err.to_string().contains("rpc_url"));

    let with_url = rpc.replace(
      "name = \"hardhat\"",
      "name = \"mumbai\"\nrpc_url = \"http://127.0.0.1:8545\"",
    );
    let err = parse_config(&with_url).unwrap_err();
    assert!(err.to_string().contains("artifact"));
  }

  #[test]
  fn test_zero_listing_fee_rejected() {
    let config = format!("{LOCAL}\n[contracts]\nlisting_fee_wei = \"0\"\n");
    assert!(parse_config(&config).is_err());
  }

  #[test]
  fn test_custom_listing_fee() {
    let config = format!("{LOCAL}\n[contracts]\nlisting_fee_wei = \"1000\"\n");
    let parsed = parse_config(&config).unwrap();
    assert_eq!(parsed.contracts.listing_fee_wei, alloy::primitives::U256::from(1000u64));
  }
}
