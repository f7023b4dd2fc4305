//! Integration Tests - Client Workflows over Mocked Ports
//!
//! Tests the interaction between usecases and ports with mock adapters.
//! Uses mockall for trait mocking and tokio::test for async tests.

use std::sync::Arc;

use alloy::primitives::{Address, U256};
use mockall::mock;
use mockall::predicate::*;

use nft_marketplace::domain::listing::{AssetId, AssetMetadata, Listing, ListingId, MarketItem};
use nft_marketplace::ports::pinning::PinnedContent;
use nft_marketplace::usecases::{Catalog, Checkout, CreateItemError, ItemCreator, ItemForm};

// ---- Mock Definitions ----

mock! {
    pub Market {}

    #[async_trait::async_trait]
    impl nft_marketplace::ports::marketplace::MarketplaceClient for Market {
        fn account(&self) -> Address;
        fn marketplace_address(&self) -> Address;
        async fn listing_fee(&self) -> anyhow::Result<U256>;
        async fn create_listing(
            &self,
            asset_contract: Address,
            asset_id: AssetId,
            price: U256,
            fee: U256,
        ) -> anyhow::Result<ListingId>;
        async fn purchase(
            &self,
            asset_contract: Address,
            asset_id: AssetId,
            listing_id: ListingId,
            payment: U256,
        ) -> anyhow::Result<()>;
        async fn fetch_unsold_listings(&self) -> anyhow::Result<Vec<Listing>>;
        async fn fetch_listings_owned_by(&self, owner: Address) -> anyhow::Result<Vec<Listing>>;
        async fn fetch_listings_created_by(&self, seller: Address) -> anyhow::Result<Vec<Listing>>;
    }
}

mock! {
    pub Registry {}

    #[async_trait::async_trait]
    impl nft_marketplace::ports::asset_registry::AssetRegistryClient for Registry {
        fn registry_address(&self) -> Address;
        async fn mint(&self, token_uri: &str) -> anyhow::Result<AssetId>;
        async fn token_uri(&self, asset_id: AssetId) -> anyhow::Result<String>;
        async fn owner_of(&self, asset_id: AssetId) -> anyhow::Result<Address>;
    }
}

mock! {
    pub Metadata {}

    #[async_trait::async_trait]
    impl nft_marketplace::ports::metadata::MetadataFetcher for Metadata {
        async fn fetch(&self, token_uri: &str) -> anyhow::Result<AssetMetadata>;
    }
}

mock! {
    pub Pinning {}

    #[async_trait::async_trait]
    impl nft_marketplace::ports::pinning::PinningService for Pinning {
        async fn pin_bytes(&self, file_name: &str, content: Vec<u8>) -> anyhow::Result<PinnedContent>;
        async fn pin_json(&self, document: &serde_json::Value) -> anyhow::Result<PinnedContent>;
    }
}

// ---- Fixtures ----

const REGISTRY: Address = Address::repeat_byte(0xaa);
const MARKET: Address = Address::repeat_byte(0xbb);
const SELLER: Address = Address::repeat_byte(0x01);
const BUYER: Address = Address::repeat_byte(0x02);

fn listing(id: ListingId, asset_id: AssetId, sold: bool) -> Listing {
    Listing {
        id,
        asset_contract: REGISTRY,
        asset_id,
        seller: SELLER,
        owner: if sold { BUYER } else { MARKET },
        price: U256::from(id * 1_000),
        sold,
    }
}

/// Registry answering `https://gw/ipfs/meta-{id}` for every asset.
fn registry() -> MockRegistry {
    let mut registry = MockRegistry::new();
    registry.expect_registry_address().return_const(REGISTRY);
    registry
        .expect_token_uri()
        .returning(|id| Ok(format!("https://gw/ipfs/meta-{id}")));
    registry
}

/// Fetcher naming each asset after the URI it was fetched from.
fn metadata() -> MockMetadata {
    let mut metadata = MockMetadata::new();
    metadata.expect_fetch().returning(|uri| {
        Ok(AssetMetadata {
            name: uri.rsplit('/').next().unwrap_or_default().to_string(),
            description: "desc".to_string(),
            image: format!("{uri}.png"),
        })
    });
    metadata
}

fn pinned(hash: &str) -> PinnedContent {
    PinnedContent {
        path: hash.to_string(),
        url: format!("https://gw/ipfs/{hash}"),
        size: 42,
    }
}

// ---- Catalog ----

#[tokio::test]
async fn test_market_items_merge_listing_uri_and_metadata_positionally() {
    let mut market = MockMarket::new();
    market
        .expect_fetch_unsold_listings()
        .times(1)
        .returning(|| Ok(vec![listing(1, 10, false), listing(2, 20, false)]));

    let catalog = Catalog::new(Arc::new(market), Arc::new(registry()), Arc::new(metadata()));
    let items = catalog.market_items().await.unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].listing_id, 1);
    assert_eq!(items[0].token_uri, "https://gw/ipfs/meta-10");
    assert_eq!(items[0].metadata.name, "meta-10");
    assert_eq!(items[1].listing_id, 2);
    assert_eq!(items[1].metadata.name, "meta-20");
    assert_eq!(items[1].price, U256::from(2_000u64));
}

#[tokio::test]
async fn test_single_metadata_failure_aborts_page() {
    let mut market = MockMarket::new();
    market
        .expect_fetch_unsold_listings()
        .returning(|| Ok(vec![listing(1, 10, false), listing(2, 20, false)]));

    let mut metadata = MockMetadata::new();
    metadata.expect_fetch().returning(|uri| {
        if uri.ends_with("meta-20") {
            Err(anyhow::anyhow!("gateway timeout"))
        } else {
            Ok(AssetMetadata::default())
        }
    });

    let catalog = Catalog::new(Arc::new(market), Arc::new(registry()), Arc::new(metadata));
    let err = catalog.market_items().await.unwrap_err();
    assert!(format!("{err:#}").contains("gateway timeout"));
}

#[tokio::test]
async fn test_listing_of_other_registry_fails_page() {
    let foreign = Address::repeat_byte(0xcc);
    let mut market = MockMarket::new();
    market.expect_fetch_unsold_listings().returning(move || {
        let mut other = listing(2, 20, false);
        other.asset_contract = foreign;
        Ok(vec![listing(1, 10, false), other])
    });

    let mut registry = MockRegistry::new();
    registry.expect_registry_address().return_const(REGISTRY);
    registry.expect_token_uri().with(eq(10)).returning(|id| Ok(format!("https://gw/ipfs/meta-{id}")));
    registry.expect_token_uri().with(eq(20)).never();

    let catalog = Catalog::new(Arc::new(market), Arc::new(registry), Arc::new(metadata()));
    let err = catalog.market_items().await.unwrap_err();
    assert!(err.to_string().contains("not the connected registry"));
}

#[tokio::test]
async fn test_empty_market_needs_no_lookups() {
    let mut market = MockMarket::new();
    market.expect_fetch_unsold_listings().returning(|| Ok(Vec::new()));

    let catalog = Catalog::new(
        Arc::new(market),
        Arc::new(MockRegistry::new()),
        Arc::new(MockMetadata::new()),
    );
    assert!(catalog.market_items().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_my_assets_queries_connected_account() {
    let mut market = MockMarket::new();
    market.expect_account().return_const(BUYER);
    market
        .expect_fetch_listings_owned_by()
        .with(eq(BUYER))
        .times(1)
        .returning(|_| Ok(vec![listing(3, 30, true)]));

    let catalog = Catalog::new(Arc::new(market), Arc::new(registry()), Arc::new(metadata()));
    let items = catalog.my_assets().await.unwrap();

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].owner, BUYER);
}

#[tokio::test]
async fn test_creator_dashboard_splits_sold_subset() {
    let mut market = MockMarket::new();
    market.expect_account().return_const(SELLER);
    market
        .expect_fetch_listings_created_by()
        .with(eq(SELLER))
        .returning(|_| {
            Ok(vec![
                listing(1, 10, true),
                listing(2, 20, false),
                listing(3, 30, true),
            ])
        });

    let catalog = Catalog::new(Arc::new(market), Arc::new(registry()), Arc::new(metadata()));
    let dashboard = catalog.creator_dashboard().await.unwrap();

    assert_eq!(dashboard.created.len(), 3);
    let sold: Vec<ListingId> = dashboard.sold.iter().map(|i| i.listing_id).collect();
    assert_eq!(sold, vec![1, 3]);
}

// ---- Create item ----

#[tokio::test]
async fn test_upload_file_returns_gateway_url() {
    let mut pinning = MockPinning::new();
    pinning
        .expect_pin_bytes()
        .with(eq("cat.png"), eq(vec![1u8, 2, 3]))
        .times(1)
        .returning(|_, _| Ok(pinned("QmCat")));

    let creator = ItemCreator::new(
        Arc::new(MockMarket::new()),
        Arc::new(MockRegistry::new()),
        Arc::new(pinning),
    );
    let url = creator.upload_file("cat.png", vec![1, 2, 3]).await.unwrap();
    assert_eq!(url, "https://gw/ipfs/QmCat");
}

#[tokio::test]
async fn test_create_item_pins_mints_and_lists_with_fee() {
    let fee = U256::from(25u64);
    let price = U256::from(1_500_000_000_000_000_000u128);

    let mut pinning = MockPinning::new();
    pinning
        .expect_pin_json()
        .withf(|doc| {
            doc["name"] == "Sunset"
                && doc["description"] == "Orange sky"
                && doc["image"] == "https://gw/ipfs/QmImage"
        })
        .times(1)
        .returning(|_| Ok(pinned("QmMeta")));

    let mut registry = MockRegistry::new();
    registry.expect_registry_address().return_const(REGISTRY);
    registry
        .expect_mint()
        .with(eq("https://gw/ipfs/QmMeta"))
        .times(1)
        .returning(|_| Ok(7));

    let mut market = MockMarket::new();
    market.expect_listing_fee().returning(move || Ok(fee));
    market
        .expect_create_listing()
        .with(eq(REGISTRY), eq(7), eq(price), eq(fee))
        .times(1)
        .returning(|_, _, _, _| Ok(4));

    let creator = ItemCreator::new(Arc::new(market), Arc::new(registry), Arc::new(pinning));
    let form = ItemForm {
        name: "Sunset".to_string(),
        description: "Orange sky".to_string(),
        price: "1.5".to_string(),
    };
    let created = creator
        .create_item(&form, "https://gw/ipfs/QmImage")
        .await
        .unwrap();

    assert_eq!(created.asset_id, 7);
    assert_eq!(created.listing_id, 4);
    assert_eq!(created.token_uri, "https://gw/ipfs/QmMeta");
}

#[tokio::test]
async fn test_incomplete_form_touches_no_service() {
    // No expectations: any port call would panic.
    let creator = ItemCreator::new(
        Arc::new(MockMarket::new()),
        Arc::new(MockRegistry::new()),
        Arc::new(MockPinning::new()),
    );
    let form = ItemForm {
        name: "Sunset".to_string(),
        description: String::new(),
        price: "1".to_string(),
    };

    let err = creator.create_item(&form, "https://gw/ipfs/QmImage").await.unwrap_err();
    assert_eq!(
        err.downcast_ref::<CreateItemError>(),
        Some(&CreateItemError::IncompleteForm("description"))
    );
}

#[tokio::test]
async fn test_listing_failure_propagates_after_mint() {
    let mut pinning = MockPinning::new();
    pinning.expect_pin_json().returning(|_| Ok(pinned("QmMeta")));

    let mut registry = MockRegistry::new();
    registry.expect_registry_address().return_const(REGISTRY);
    registry.expect_mint().returning(|_| Ok(1));

    let mut market = MockMarket::new();
    market.expect_listing_fee().returning(|| Ok(U256::from(25u64)));
    market
        .expect_create_listing()
        .returning(|_, _, _, _| Err(anyhow::anyhow!("execution reverted")));

    let creator = ItemCreator::new(Arc::new(market), Arc::new(registry), Arc::new(pinning));
    let form = ItemForm {
        name: "a".to_string(),
        description: "b".to_string(),
        price: "2".to_string(),
    };
    let err = creator.create_item(&form, "https://gw/ipfs/x").await.unwrap_err();
    assert!(format!("{err:#}").contains("execution reverted"));
}

// ---- Checkout ----

#[tokio::test]
async fn test_buy_attaches_exact_price() {
    let item = MarketItem::from_parts(
        listing(5, 50, false),
        "https://gw/ipfs/meta-50".to_string(),
        AssetMetadata::default(),
    );

    let mut market = MockMarket::new();
    market.expect_account().return_const(BUYER);
    market
        .expect_purchase()
        .with(eq(REGISTRY), eq(50), eq(5), eq(U256::from(5_000u64)))
        .times(1)
        .returning(|_, _, _, _| Ok(()));

    Checkout::new(Arc::new(market)).buy(&item).await.unwrap();
}

#[tokio::test]
async fn test_buy_failure_names_listing() {
    let item = MarketItem::from_parts(listing(9, 90, false), String::new(), AssetMetadata::default());

    let mut market = MockMarket::new();
    market
        .expect_purchase()
        .returning(|_, _, _, _| Err(anyhow::anyhow!("already sold")));

    let err = Checkout::new(Arc::new(market)).buy(&item).await.unwrap_err();
    assert!(err.to_string().contains("listing 9"));
}
