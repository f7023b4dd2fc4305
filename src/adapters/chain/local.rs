//! In-process chain: a `WorldState` behind an async mutex.
//!
//! The mutex gives every contract call a total order. Each call runs on a
//! copy of the state; the copy replaces the live state only after the
//! attached `ChainRepository`, if any, has stored its snapshot and events.
//! A persistence failure therefore fails the call with nothing applied.

use std::sync::Arc;

use alloy::primitives::{Address, U256};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{error, info, instrument, warn};

use crate::config::AppConfig;
use crate::domain::error::MarketError;
use crate::domain::listing::{AssetId, Listing, ListingId};
use crate::domain::world::{Call, Receipt, WorldState};
use crate::ports::asset_registry::AssetRegistryClient;
use crate::ports::marketplace::MarketplaceClient;
use crate::ports::repository::{ChainRepository, Deployment, EventRecord};

const WEI_PER_ETHER: u64 = 1_000_000_000_000_000_000;

/// Shared in-process execution environment.
pub struct LocalChain {
    state: Mutex<WorldState>,
    repository: Option<Arc<dyn ChainRepository>>,
}

impl LocalChain {
    /// Wrap an existing state without persistence.
    pub fn new(state: WorldState) -> Self {
        Self {
            state: Mutex::new(state),
            repository: None,
        }
    }

    /// Fresh chain whose genesis funds `deployer` and every configured
    /// account with `local.genesis_balance_ether`.
    pub fn genesis(config: &AppConfig, deployer: Address) -> Result<Self> {
        let amount = U256::from(config.local.genesis_balance_ether) * U256::from(WEI_PER_ETHER);
        let accounts = std::iter::once(deployer)
            .chain(config.local.funded_accounts.iter().copied())
            .map(|account| (account, amount));

        let state = WorldState::genesis(config.network.chain_id, accounts)
            .context("Invalid genesis allocation")?;

        info!(
            chain_id = config.network.chain_id,
            accounts = config.local.funded_accounts.len() + 1,
            "Local chain created from genesis"
        );
        Ok(Self::new(state))
    }

    /// Resume from the repository snapshot, or start from genesis.
    ///
    /// # Errors
    /// Fails if the snapshot belongs to a different chain id.
    #[instrument(skip_all, fields(deployer = %deployer))]
    pub async fn open(
        config: &AppConfig,
        deployer: Address,
        repository: Arc<dyn ChainRepository>,
    ) -> Result<Self> {
        let chain = match repository.load_state().await? {
            Some(state) => {
                anyhow::ensure!(
                    state.chain_id() == config.network.chain_id,
                    "Snapshot chain id {} does not match configured chain id {}",
                    state.chain_id(),
                    config.network.chain_id
                );
                info!(block = state.block(), "Local chain resumed from snapshot");
                Self::new(state)
            }
            None => Self::genesis(config, deployer)?,
        };
        Ok(chain.with_repository(repository))
    }

    /// Persist every committed call through `repository`.
    #[must_use]
    pub fn with_repository(mut self, repository: Arc<dyn ChainRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    /// Copy of the current state.
    pub async fn snapshot(&self) -> WorldState {
        self.state.lock().await.clone()
    }

    pub async fn balance_of(&self, account: Address) -> U256 {
        self.state.lock().await.balance_of(account)
    }

    /// Number of listings of `market` that have sold.
    pub async fn items_sold(&self, market: Address) -> Result<u64> {
        Ok(self.state.lock().await.market(market)?.items_sold())
    }

    /// Deploy the marketplace, then a registry bound to it.
    #[instrument(skip(self), fields(deployer = %deployer, listing_fee = %listing_fee))]
    pub async fn deploy(
        &self,
        network: &str,
        deployer: Address,
        listing_fee: U256,
    ) -> Result<Deployment> {
        let marketplace = self
            .execute(|world| world.deploy_marketplace(deployer, listing_fee))
            .await
            .context("Marketplace deployment failed")?;
        info!(address = %marketplace, "Marketplace deployed");

        let registry = self
            .execute(|world| world.deploy_registry(deployer, marketplace))
            .await
            .context("Registry deployment failed")?;
        info!(address = %registry, "Registry deployed");

        let chain_id = self.state.lock().await.chain_id();
        let deployment = Deployment {
            network: network.to_string(),
            chain_id,
            deployer,
            marketplace,
            registry,
            listing_fee,
            deployed_at: Utc::now(),
        };

        if let Some(repository) = &self.repository {
            repository.save_deployment(&deployment).await?;
        }
        Ok(deployment)
    }

    /// A session signing as `account` against a deployed pair.
    pub fn wallet(self: &Arc<Self>, account: Address, deployment: &Deployment) -> LocalWallet {
        LocalWallet {
            chain: Arc::clone(self),
            account,
            marketplace: deployment.marketplace,
            registry: deployment.registry,
        }
    }

    /// Run one state-changing call and persist its outcome.
    async fn execute<T, F>(&self, call: F) -> Result<T>
    where
        F: FnOnce(&mut WorldState) -> Result<Receipt<T>, MarketError>,
    {
        let mut state = self.state.lock().await;
        let mut next = state.clone();
        let receipt = call(&mut next).map_err(|e| {
            warn!(error = %e, "Call reverted");
            anyhow::Error::from(e)
        })?;

        if let Some(repository) = &self.repository {
            Self::persist(repository.as_ref(), &state, &next, &receipt).await?;
        }

        for event in &receipt.events {
            info!(block = receipt.block, event = event.kind(), "Event committed");
        }

        *state = next;
        Ok(receipt.output)
    }

    /// Store the snapshot of `next`, then its events.
    ///
    /// The snapshot is the commit point. If the event append fails the
    /// snapshot of `previous` is written back before returning the error.
    async fn persist<T>(
        repository: &dyn ChainRepository,
        previous: &WorldState,
        next: &WorldState,
        receipt: &Receipt<T>,
    ) -> Result<()> {
        let records: Vec<EventRecord> = receipt
            .events
            .iter()
            .map(|event| EventRecord {
                id: uuid::Uuid::new_v4().to_string(),
                block: receipt.block,
                recorded_at: Utc::now(),
                event: event.clone(),
            })
            .collect();

        repository
            .save_state(next)
            .await
            .context("Failed to persist state snapshot")?;

        if let Err(e) = repository.append_events(&records).await {
            if let Err(restore) = repository.save_state(previous).await {
                error!(error = %restore, block = previous.block(), "Failed to restore previous snapshot");
            }
            return Err(e.context("Failed to append events"));
        }
        Ok(())
    }

    async fn view<T, F>(&self, query: F) -> Result<T>
    where
        F: FnOnce(&WorldState) -> Result<T, MarketError>,
    {
        let state = self.state.lock().await;
        Ok(query(&*state)?)
    }
}

/// One account's connection to a `LocalChain` deployment.
#[derive(Clone)]
pub struct LocalWallet {
    chain: Arc<LocalChain>,
    account: Address,
    marketplace: Address,
    registry: Address,
}

#[async_trait]
impl MarketplaceClient for LocalWallet {
    fn account(&self) -> Address {
        self.account
    }

    fn marketplace_address(&self) -> Address {
        self.marketplace
    }

    async fn listing_fee(&self) -> Result<U256> {
        let market = self.marketplace;
        self.chain
            .view(|world| Ok(world.market(market)?.listing_fee()))
            .await
    }

    #[instrument(skip(self), fields(account = %self.account, price = %price))]
    async fn create_listing(
        &self,
        asset_contract: Address,
        asset_id: AssetId,
        price: U256,
        fee: U256,
    ) -> Result<ListingId> {
        let call = Call::new(self.account, fee);
        let market = self.marketplace;
        let listing_id = self
            .chain
            .execute(|world| world.create_listing(call, market, asset_contract, asset_id, price))
            .await?;
        info!(listing_id, asset_id, "Listing created");
        Ok(listing_id)
    }

    #[instrument(skip(self), fields(account = %self.account, payment = %payment))]
    async fn purchase(
        &self,
        asset_contract: Address,
        asset_id: AssetId,
        listing_id: ListingId,
        payment: U256,
    ) -> Result<()> {
        let call = Call::new(self.account, payment);
        let market = self.marketplace;
        self.chain
            .execute(|world| world.purchase(call, market, asset_contract, asset_id, listing_id))
            .await?;
        info!(listing_id, asset_id, "Listing purchased");
        Ok(())
    }

    async fn fetch_unsold_listings(&self) -> Result<Vec<Listing>> {
        let market = self.marketplace;
        self.chain
            .view(|world| world.fetch_unsold_listings(market))
            .await
    }

    async fn fetch_listings_owned_by(&self, owner: Address) -> Result<Vec<Listing>> {
        let market = self.marketplace;
        self.chain
            .view(|world| world.fetch_listings_owned_by(market, owner))
            .await
    }

    async fn fetch_listings_created_by(&self, seller: Address) -> Result<Vec<Listing>> {
        let market = self.marketplace;
        self.chain
            .view(|world| world.fetch_listings_created_by(market, seller))
            .await
    }
}

#[async_trait]
impl AssetRegistryClient for LocalWallet {
    fn registry_address(&self) -> Address {
        self.registry
    }

    #[instrument(skip(self), fields(account = %self.account))]
    async fn mint(&self, token_uri: &str) -> Result<AssetId> {
        let (caller, registry) = (self.account, self.registry);
        let asset_id = self
            .chain
            .execute(|world| world.mint(caller, registry, token_uri))
            .await?;
        info!(asset_id, "Asset minted");
        Ok(asset_id)
    }

    async fn token_uri(&self, asset_id: AssetId) -> Result<String> {
        let registry = self.registry;
        self.chain
            .view(|world| Ok(world.registry(registry)?.token_uri(asset_id)?.to_string()))
            .await
    }

    async fn owner_of(&self, asset_id: AssetId) -> Result<Address> {
        let registry = self.registry;
        self.chain
            .view(|world| world.registry(registry)?.owner_of(asset_id))
            .await
    }
}
