//! EVM wallet: the marketplace and registry contracts over JSON-RPC.
//!
//! Calldata is ABI-encoded with `sol!` bindings and submitted through the
//! shared `ChainProvider`. Identifiers assigned on-chain are read back from
//! the receipt logs: the minted asset id from `Transfer`, the listing id
//! from `MarketItemCreated`.

use std::sync::Arc;

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, U256};
use alloy::providers::Provider;
use alloy::rpc::types::{TransactionReceipt, TransactionRequest};
use alloy::sol;
use alloy::sol_types::SolCall;
use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{info, instrument};

use super::provider::ChainProvider;
use crate::domain::listing::{AssetId, Listing, ListingId};
use crate::ports::asset_registry::AssetRegistryClient;
use crate::ports::marketplace::MarketplaceClient;

sol! {
    contract NFTMarket {
        struct MarketItem {
            uint256 itemId;
            address nftContract;
            uint256 tokenId;
            address seller;
            address owner;
            uint256 price;
            bool sold;
        }

        event MarketItemCreated(
            uint256 indexed itemId,
            address indexed nftContract,
            uint256 indexed tokenId,
            address seller,
            address owner,
            uint256 price,
            bool sold
        );

        function getListingPrice() external view returns (uint256);
        function createMarketItem(address nftContract, uint256 tokenId, uint256 price) external payable;
        function createMarketSale(address nftContract, uint256 itemId) external payable;
        function fetchMarketItems() external view returns (MarketItem[] memory);
        function fetchMyNFTs() external view returns (MarketItem[] memory);
        function fetchItemsCreated() external view returns (MarketItem[] memory);
    }

    contract NFT {
        event Transfer(address indexed from, address indexed to, uint256 indexed tokenId);

        function createToken(string memory tokenURI) external returns (uint256);
        function tokenURI(uint256 tokenId) external view returns (string memory);
        function ownerOf(uint256 tokenId) external view returns (address);
    }
}

/// A signer's connection to a deployed marketplace/registry pair.
pub struct EvmWallet {
    provider: Arc<ChainProvider>,
    marketplace: Address,
    registry: Address,
}

impl EvmWallet {
    pub const fn new(provider: Arc<ChainProvider>, marketplace: Address, registry: Address) -> Self {
        Self {
            provider,
            marketplace,
            registry,
        }
    }

    /// Read-only call, optionally impersonating `from` (for `msg.sender` views).
    async fn view<C: SolCall + Send>(
        &self,
        to: Address,
        from: Option<Address>,
        call: C,
    ) -> Result<C::Return> {
        let mut tx = TransactionRequest::default()
            .with_to(to)
            .with_input(call.abi_encode());
        if let Some(from) = from {
            tx = tx.with_from(from);
        }

        let output = self
            .provider
            .inner()
            .call(&tx)
            .await
            .with_context(|| format!("{} call failed", C::SIGNATURE))?;

        C::abi_decode_returns(&output, true)
            .with_context(|| format!("Failed to decode {} output", C::SIGNATURE))
    }

    /// Signed transaction; waits for the receipt and rejects reverts.
    async fn send<C: SolCall + Send>(
        &self,
        to: Address,
        call: C,
        value: U256,
    ) -> Result<TransactionReceipt> {
        let tx = TransactionRequest::default()
            .with_to(to)
            .with_input(call.abi_encode())
            .with_value(value);

        let receipt = self
            .provider
            .inner()
            .send_transaction(tx)
            .await
            .with_context(|| format!("Failed to submit {}", C::SIGNATURE))?
            .get_receipt()
            .await
            .with_context(|| format!("No receipt for {}", C::SIGNATURE))?;

        anyhow::ensure!(
            receipt.status(),
            "{} reverted in tx {}",
            C::SIGNATURE,
            receipt.transaction_hash
        );
        Ok(receipt)
    }
}

fn to_id(value: U256, what: &str) -> Result<u64> {
    u64::try_from(value).map_err(|_| anyhow::anyhow!("{what} {value} does not fit in u64"))
}

fn to_listing(item: NFTMarket::MarketItem) -> Result<Listing> {
    Ok(Listing {
        id: to_id(item.itemId, "listing id")?,
        asset_contract: item.nftContract,
        asset_id: to_id(item.tokenId, "asset id")?,
        seller: item.seller,
        owner: item.owner,
        price: item.price,
        sold: item.sold,
    })
}

fn to_listings(items: Vec<NFTMarket::MarketItem>) -> Result<Vec<Listing>> {
    items.into_iter().map(to_listing).collect()
}

#[async_trait]
impl MarketplaceClient for EvmWallet {
    fn account(&self) -> Address {
        self.provider.signer()
    }

    fn marketplace_address(&self) -> Address {
        self.marketplace
    }

    async fn listing_fee(&self) -> Result<U256> {
        Ok(self
            .view(self.marketplace, None, NFTMarket::getListingPriceCall {})
            .await?
            ._0)
    }

    #[instrument(skip(self), fields(price = %price, fee = %fee))]
    async fn create_listing(
        &self,
        asset_contract: Address,
        asset_id: AssetId,
        price: U256,
        fee: U256,
    ) -> Result<ListingId> {
        let call = NFTMarket::createMarketItemCall {
            nftContract: asset_contract,
            tokenId: U256::from(asset_id),
            price,
        };
        let receipt = self.send(self.marketplace, call, fee).await?;

        let created = receipt
            .inner
            .logs()
            .iter()
            .filter(|log| log.address() == self.marketplace)
            .find_map(|log| log.log_decode::<NFTMarket::MarketItemCreated>().ok())
            .context("MarketItemCreated event missing from receipt")?;
        let listing_id = to_id(created.inner.data.itemId, "listing id")?;

        info!(listing_id, asset_id, tx = %receipt.transaction_hash, "Listing created");
        Ok(listing_id)
    }

    #[instrument(skip(self), fields(payment = %payment))]
    async fn purchase(
        &self,
        asset_contract: Address,
        asset_id: AssetId,
        listing_id: ListingId,
        payment: U256,
    ) -> Result<()> {
        let call = NFTMarket::createMarketSaleCall {
            nftContract: asset_contract,
            itemId: U256::from(listing_id),
        };
        let receipt = self.send(self.marketplace, call, payment).await?;
        info!(listing_id, asset_id, tx = %receipt.transaction_hash, "Listing purchased");
        Ok(())
    }

    async fn fetch_unsold_listings(&self) -> Result<Vec<Listing>> {
        let items = self
            .view(self.marketplace, None, NFTMarket::fetchMarketItemsCall {})
            .await?
            ._0;
        to_listings(items)
    }

    async fn fetch_listings_owned_by(&self, owner: Address) -> Result<Vec<Listing>> {
        let items = self
            .view(self.marketplace, Some(owner), NFTMarket::fetchMyNFTsCall {})
            .await?
            ._0;
        to_listings(items)
    }

    async fn fetch_listings_created_by(&self, seller: Address) -> Result<Vec<Listing>> {
        let items = self
            .view(self.marketplace, Some(seller), NFTMarket::fetchItemsCreatedCall {})
            .await?
            ._0;
        to_listings(items)
    }
}

#[async_trait]
impl AssetRegistryClient for EvmWallet {
    fn registry_address(&self) -> Address {
        self.registry
    }

    #[instrument(skip(self))]
    async fn mint(&self, token_uri: &str) -> Result<AssetId> {
        let call = NFT::createTokenCall {
            tokenURI: token_uri.to_string(),
        };
        let receipt = self.send(self.registry, call, U256::ZERO).await?;

        let minted = receipt
            .inner
            .logs()
            .iter()
            .filter(|log| log.address() == self.registry)
            .filter_map(|log| log.log_decode::<NFT::Transfer>().ok())
            .find(|log| log.inner.data.from == Address::ZERO)
            .context("Mint Transfer event missing from receipt")?;
        let asset_id = to_id(minted.inner.data.tokenId, "asset id")?;

        info!(asset_id, tx = %receipt.transaction_hash, "Asset minted");
        Ok(asset_id)
    }

    async fn token_uri(&self, asset_id: AssetId) -> Result<String> {
        let call = NFT::tokenURICall {
            tokenId: U256::from(asset_id),
        };
        Ok(self.view(self.registry, None, call).await?._0)
    }

    async fn owner_of(&self, asset_id: AssetId) -> Result<Address> {
        let call = NFT::ownerOfCall {
            tokenId: U256::from(asset_id),
        };
        Ok(self.view(self.registry, None, call).await?._0)
    }
}
