//! Configuration Module - TOML-based Marketplace Configuration
//!
//! Loads and validates configuration from `marketplace.toml`.
//! Network endpoints, contract descriptors and the pinning service are
//! externalized here. The signing key itself never lives in the file:
//! the file names the environment variable that holds it.

pub mod loader;

use alloy::primitives::{Address, U256};
use serde::Deserialize;

use crate::domain::listing::DEFAULT_LISTING_FEE_WEI;

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
  /// Application identity and logging.
  pub app: AppSection,
  /// Target network.
  pub network: NetworkConfig,
  /// In-process chain settings (network.kind = "local").
  #[serde(default)]
  pub local: LocalChainConfig,
  /// Contract parameters and compiled descriptors.
  #[serde(default)]
  pub contracts: ContractsConfig,
  /// File-pinning service.
  pub pinning: PinningConfig,
  /// Outbound HTTP settings.
  #[serde(default)]
  pub http: HttpConfig,
  /// Persistence configuration.
  #[serde(default)]
  pub persistence: PersistenceConfig,
}

/// Application identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppSection {
  /// Human-readable name.
  pub name: String,
  /// Log level (trace, debug, info, warn, error).
  #[serde(default = "default_log_level")]
  pub log_level: String,
}

/// Which execution environment the contracts run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkKind {
  /// In-process chain persisted under `persistence.data_dir`.
  Local,
  /// EVM network reached over JSON-RPC.
  Rpc,
}

/// Network configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
  pub kind: NetworkKind,
  /// Network name recorded in deployments (e.g. "hardhat", "mumbai").
  pub name: String,
  /// Expected chain id; the RPC endpoint is checked against it.
  #[serde(default = "default_chain_id")]
  pub chain_id: u64,
  /// JSON-RPC endpoint, required for `rpc`.
  pub rpc_url: Option<String>,
  /// Environment variable holding the hex signing key.
  #[serde(default = "default_private_key_env")]
  pub private_key_env: String,
}

/// In-process chain configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LocalChainConfig {
  /// Balance credited to every funded account at genesis (ether).
  #[serde(default = "default_genesis_balance")]
  pub genesis_balance_ether: u64,
  /// Accounts funded at genesis in addition to the deployer.
  #[serde(default)]
  pub funded_accounts: Vec<Address>,
}

/// Contract configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ContractsConfig {
  /// Listing fee the marketplace is deployed with (wei).
  #[serde(default = "default_listing_fee")]
  pub listing_fee_wei: U256,
  /// Compiled marketplace descriptor (JSON with `bytecode`), required for `rpc`.
  pub marketplace_artifact: Option<String>,
  /// Compiled registry descriptor, required for `rpc`.
  pub registry_artifact: Option<String>,
}

/// Pinning service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PinningConfig {
  /// API base URL (`{api_url}/api/v0/add`).
  pub api_url: String,
  /// Gateway base URL (`{gateway_url}/ipfs/{hash}`).
  pub gateway_url: String,
  /// Basic-auth user, if the service requires it.
  pub project_id: Option<String>,
  /// Basic-auth password.
  pub project_secret: Option<String>,
}

/// Outbound HTTP configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
  /// Request timeout in seconds.
  #[serde(default = "default_timeout")]
  pub timeout_seconds: u64,
}

/// Persistence configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PersistenceConfig {
  /// Directory for the state snapshot, event log and deployments.
  #[serde(default = "default_data_dir")]
  pub data_dir: String,
}

impl Default for LocalChainConfig {
  fn default() -> Self {
    Self {
      genesis_balance_ether: default_genesis_balance(),
      funded_accounts: Vec::new(),
    }
  }
}

impl Default for ContractsConfig {
  fn default() -> Self {
    Self {
      listing_fee_wei: default_listing_fee(),
      marketplace_artifact: None,
      registry_artifact: None,
    }
  }
}

impl Default for HttpConfig {
  fn default() -> Self {
    Self {
      timeout_seconds: default_timeout(),
    }
  }
}

impl Default for PersistenceConfig {
  fn default() -> Self {
    Self {
      data_dir: default_data_dir(),
    }
  }
}

// Default value functions for serde

fn default_log_level() -> String {
  "info".to_string()
}

fn default_chain_id() -> u64 {
  1337
}

fn default_private_key_env() -> String {
  "PRIVATE_KEY".to_string()
}

fn default_genesis_balance() -> u64 {
  10_000
}

fn default_listing_fee() -> U256 {
  U256::from(DEFAULT_LISTING_FEE_WEI)
}

fn default_timeout() -> u64 {
  30
}

fn default_data_dir() -> String {
  "data".to_string()
}
