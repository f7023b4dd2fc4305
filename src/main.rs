//! NFT Marketplace — Deploy Entry Point
//!
//! Deploys the marketplace, then the registry bound to it, and records the
//! pair in `deployments.json`. Takes no flags; exits 0 on success and 1 on
//! any failure.
//!
//! Wiring sequence:
//! 1. Load marketplace.toml + validate
//! 2. Init tracing (JSON structured logging)
//! 3. local: open the persisted in-process chain and deploy into it
//!    rpc: connect a signing provider and deploy the compiled artifacts
//! 4. Save the deployment record and print both addresses

use std::process::ExitCode;
use std::sync::Arc;

use alloy::primitives::{Address, address};
use anyhow::{Context, Result};
use tracing::{error, info, warn};

use nft_marketplace::adapters::chain::{ChainProvider, LocalChain, deploy_contracts};
use nft_marketplace::adapters::persistence::{RepositoryImpl, StateStore};
use nft_marketplace::config::loader::{CONFIG_FILE, load_config, load_signer};
use nft_marketplace::config::{AppConfig, NetworkKind};
use nft_marketplace::ports::repository::Deployment;

/// Well-known first development account, used on the local chain when no
/// signing key is configured.
const DEV_ACCOUNT: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");

#[tokio::main]
async fn main() -> ExitCode {
    // ── 1. Load configuration from marketplace.toml ─────────
    let config = load_config(CONFIG_FILE).context("Failed to load configuration");

    // ── 2. Initialize structured JSON logging ───────────────
    let log_level = config
        .as_ref()
        .map_or("info", |config| config.app.log_level.as_str());
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .json()
        .init();

    let outcome = match config {
        Ok(config) => deploy(&config).await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(deployment) => {
            println!("marketplace deployed to: {}", deployment.marketplace);
            println!("registry deployed to: {}", deployment.registry);
            ExitCode::SUCCESS
        }
        Err(e) => {
            let message = format!("{e:#}");
            error!(error = %message, "Deployment failed");
            ExitCode::FAILURE
        }
    }
}

/// Deploy both contracts to the configured network.
async fn deploy(config: &AppConfig) -> Result<Deployment> {
    info!(
        name = %config.app.name,
        version = env!("CARGO_PKG_VERSION"),
        network = %config.network.name,
        kind = ?config.network.kind,
        "Starting deployment"
    );

    // ── 3. Deploy to the configured environment ─────────────
    let deployment = match config.network.kind {
        NetworkKind::Local => deploy_local(config).await?,
        NetworkKind::Rpc => deploy_rpc(config).await?,
    };

    info!(
        marketplace = %deployment.marketplace,
        registry = %deployment.registry,
        listing_fee = %deployment.listing_fee,
        "Deployment complete"
    );
    Ok(deployment)
}

async fn deploy_local(config: &AppConfig) -> Result<Deployment> {
    let deployer = match load_signer(&config.network) {
        Ok(signer) => signer.address(),
        Err(e) => {
            warn!(error = %e, account = %DEV_ACCOUNT, "No signing key, deploying as dev account");
            DEV_ACCOUNT
        }
    };

    let repository = Arc::new(
        RepositoryImpl::from_data_dir(&config.persistence.data_dir)
            .await
            .context("Failed to open data directory")?,
    );
    let chain = LocalChain::open(config, deployer, repository).await?;

    // ── 4. Record (the repository writes deployments.json) ──
    chain
        .deploy(
            &config.network.name,
            deployer,
            config.contracts.listing_fee_wei,
        )
        .await
}

async fn deploy_rpc(config: &AppConfig) -> Result<Deployment> {
    let signer = load_signer(&config.network)?;
    let provider = Arc::new(ChainProvider::connect(&config.network, signer).await?);
    let deployment = deploy_contracts(config, &provider).await?;

    // ── 4. Record deployments.json ──────────────────────────
    StateStore::new(&config.persistence.data_dir)
        .await?
        .save_deployment(&deployment)
        .await?;
    Ok(deployment)
}
