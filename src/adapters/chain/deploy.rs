//! Contract deployment from compiled hardhat artifacts.
//!
//! Each artifact is the JSON file the compiler emits; only its `bytecode`
//! field is used. The marketplace goes first, then the registry with the
//! marketplace address ABI-encoded as its constructor argument.

use std::path::Path;
use std::sync::Arc;

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes};
use alloy::providers::Provider;
use alloy::rpc::types::TransactionRequest;
use alloy::sol_types::SolValue;
use anyhow::{Context, Result};
use chrono::Utc;
use serde::Deserialize;
use tracing::{info, instrument, warn};

use super::evm::EvmWallet;
use super::provider::ChainProvider;
use crate::config::AppConfig;
use crate::ports::marketplace::MarketplaceClient;
use crate::ports::repository::Deployment;

/// The part of a hardhat artifact we need.
#[derive(Debug, Deserialize)]
struct Artifact {
    #[serde(rename = "contractName", default)]
    contract_name: String,
    bytecode: Bytes,
}

async fn load_artifact(path: &str) -> Result<Artifact> {
    let raw = tokio::fs::read_to_string(Path::new(path))
        .await
        .with_context(|| format!("Failed to read artifact {path}"))?;
    parse_artifact(&raw).with_context(|| format!("Invalid artifact {path}"))
}

fn parse_artifact(raw: &str) -> Result<Artifact> {
    let artifact: Artifact = serde_json::from_str(raw)?;
    anyhow::ensure!(!artifact.bytecode.is_empty(), "artifact has empty bytecode");
    Ok(artifact)
}

/// Creation code followed by the ABI-encoded marketplace address.
fn registry_init_code(bytecode: &Bytes, marketplace: Address) -> Bytes {
    let mut code = bytecode.to_vec();
    code.extend_from_slice(&marketplace.abi_encode());
    code.into()
}

async fn deploy_code(provider: &ChainProvider, name: &str, code: Bytes) -> Result<Address> {
    let tx = TransactionRequest::default().with_deploy_code(code);
    let receipt = provider
        .inner()
        .send_transaction(tx)
        .await
        .with_context(|| format!("Failed to submit {name} deployment"))?
        .get_receipt()
        .await
        .with_context(|| format!("No receipt for {name} deployment"))?;

    anyhow::ensure!(receipt.status(), "{name} deployment reverted");
    let address = receipt
        .contract_address
        .with_context(|| format!("{name} receipt carries no contract address"))?;

    info!(contract = name, address = %address, tx = %receipt.transaction_hash, "Contract deployed");
    Ok(address)
}

/// Deploy both contracts to the RPC network described by `config`.
#[instrument(skip_all, fields(network = %config.network.name))]
pub async fn deploy_contracts(
    config: &AppConfig,
    provider: &Arc<ChainProvider>,
) -> Result<Deployment> {
    let market_path = config
        .contracts
        .marketplace_artifact
        .as_deref()
        .context("contracts.marketplace_artifact is not set")?;
    let registry_path = config
        .contracts
        .registry_artifact
        .as_deref()
        .context("contracts.registry_artifact is not set")?;

    let market_artifact = load_artifact(market_path).await?;
    let registry_artifact = load_artifact(registry_path).await?;

    let marketplace = deploy_code(
        provider,
        &market_artifact.contract_name,
        market_artifact.bytecode,
    )
    .await?;
    let registry = deploy_code(
        provider,
        &registry_artifact.contract_name,
        registry_init_code(&registry_artifact.bytecode, marketplace),
    )
    .await?;

    let wallet = EvmWallet::new(Arc::clone(provider), marketplace, registry);
    let listing_fee = wallet.listing_fee().await?;
    if listing_fee != config.contracts.listing_fee_wei {
        warn!(
            deployed = %listing_fee,
            configured = %config.contracts.listing_fee_wei,
            "Deployed listing fee differs from configuration"
        );
    }

    Ok(Deployment {
        network: config.network.name.clone(),
        chain_id: provider.chain_id(),
        deployer: provider.signer(),
        marketplace,
        registry,
        listing_fee,
        deployed_at: Utc::now(),
    })
}
