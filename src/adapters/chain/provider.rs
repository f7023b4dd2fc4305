//! EVM RPC Provider - alloy-rs 0.9 Connection Management
//!
//! Connects to the configured JSON-RPC endpoint with a local signer and
//! validates the chain id at startup. Exposes one shared provider
//! instance for every on-chain call and transaction.
//!
//! `on_builtin` yields a provider over `BoxTransport`, which lets us store
//! it as a type-erased `dyn Provider` and keep the filler stack out of the
//! adapter signatures.

use std::sync::Arc;

use alloy::network::EthereumWallet;
use alloy::primitives::Address;
use alloy::providers::{Provider, ProviderBuilder};
use alloy::signers::local::PrivateKeySigner;
use anyhow::{Context, Result};
use tracing::{info, instrument};

use crate::config::NetworkConfig;

/// Shared signing RPC provider backed by alloy-rs 0.9.
pub struct ChainProvider {
    /// The alloy provider with gas, nonce and wallet fillers (type-erased).
    provider: Arc<dyn Provider + Send + Sync>,
    /// Address transactions are signed with.
    signer: Address,
    /// Chain id confirmed at connect time.
    chain_id: u64,
}

impl ChainProvider {
    /// Connect to `network.rpc_url` and check its chain id.
    ///
    /// # Errors
    /// Fails if the URL is missing or unreachable, or if the endpoint
    /// reports a chain id other than `network.chain_id`.
    #[instrument(skip_all, fields(network = %network.name))]
    pub async fn connect(network: &NetworkConfig, signer: PrivateKeySigner) -> Result<Self> {
        let rpc_url = network
            .rpc_url
            .as_deref()
            .context("network.rpc_url is not set")?;
        let address = signer.address();

        let provider = ProviderBuilder::new()
            .with_recommended_fillers()
            .wallet(EthereumWallet::from(signer))
            .on_builtin(rpc_url)
            .await
            .context("Failed to connect to RPC endpoint")?;

        let provider: Arc<dyn Provider + Send + Sync> = Arc::new(provider);

        let chain_id = provider
            .get_chain_id()
            .await
            .context("Failed to query chain ID")?;

        if chain_id != network.chain_id {
            anyhow::bail!(
                "Expected chain_id={} for network {}, got {chain_id}",
                network.chain_id,
                network.name
            );
        }

        info!(chain_id, signer = %address, "Connected to RPC");

        Ok(Self {
            provider,
            signer: address,
            chain_id,
        })
    }

    /// Get a shared reference to the alloy provider (type-erased).
    pub fn inner(&self) -> Arc<dyn Provider + Send + Sync> {
        Arc::clone(&self.provider)
    }

    pub const fn signer(&self) -> Address {
        self.signer
    }

    pub const fn chain_id(&self) -> u64 {
        self.chain_id
    }
}
