//! Marketplace entities: listings, ledger events and the client-side item view.
//!
//! Amounts are native-currency base units (wei, 18 decimals) carried as
//! `U256`, the same width the deployed contracts use.

use alloy::primitives::utils::format_ether;
use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────
// Identifiers
// ────────────────────────────────────────────

/// Sequential, 1-based listing identifier assigned by the ledger.
pub type ListingId = u64;

/// Sequential, 1-based asset identifier assigned by the registry.
pub type AssetId = u64;

/// Fee the original contract charges per listing: 0.025 ether.
pub const DEFAULT_LISTING_FEE_WEI: u128 = 25_000_000_000_000_000;

// ────────────────────────────────────────────
// Ledger record
// ────────────────────────────────────────────

/// A record offering one asset for sale at a fixed price.
///
/// `owner` is the ledger's own address while the asset sits in escrow and
/// the buyer's address once sold. `sold` only ever goes false → true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,
    pub asset_contract: Address,
    pub asset_id: AssetId,
    pub seller: Address,
    pub owner: Address,
    pub price: U256,
    pub sold: bool,
}

impl Listing {
    /// Asking price rendered in ether, e.g. `"100.000000000000000000"`.
    pub fn price_in_ether(&self) -> String {
        format_ether(self.price)
    }

    /// Whether this listing escrows `asset_id` of `asset_contract`.
    pub fn escrows(&self, asset_contract: Address, asset_id: AssetId) -> bool {
        self.asset_contract == asset_contract && self.asset_id == asset_id
    }
}

// ────────────────────────────────────────────
// Events emitted by committed calls
// ────────────────────────────────────────────

/// Records emitted by the contracts. Only committed calls produce events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ChainEvent {
    /// Asset custody change; `from` is zero on mint.
    Transfer {
        registry: Address,
        from: Address,
        to: Address,
        asset_id: AssetId,
    },
    ApprovalForAll {
        registry: Address,
        owner: Address,
        operator: Address,
        approved: bool,
    },
    ListingCreated {
        market: Address,
        listing_id: ListingId,
        asset_contract: Address,
        asset_id: AssetId,
        seller: Address,
        owner: Address,
        price: U256,
        sold: bool,
    },
    ListingSold {
        market: Address,
        listing_id: ListingId,
        asset_contract: Address,
        asset_id: AssetId,
        seller: Address,
        buyer: Address,
        price: U256,
    },
}

impl ChainEvent {
    /// Short name used in log lines.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Transfer { .. } => "Transfer",
            Self::ApprovalForAll { .. } => "ApprovalForAll",
            Self::ListingCreated { .. } => "ListingCreated",
            Self::ListingSold { .. } => "ListingSold",
        }
    }
}

// ────────────────────────────────────────────
// Client-side view types
// ────────────────────────────────────────────

/// Off-chain metadata document an asset's token URI points at.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetMetadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// URL of the pinned image file.
    #[serde(default)]
    pub image: String,
}

/// A listing merged with its token URI and fetched metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketItem {
    pub listing_id: ListingId,
    pub asset_contract: Address,
    pub asset_id: AssetId,
    pub seller: Address,
    pub owner: Address,
    pub price: U256,
    /// `price` formatted in ether for display.
    pub price_ether: String,
    pub sold: bool,
    pub token_uri: String,
    pub metadata: AssetMetadata,
}

impl MarketItem {
    /// Merge a raw listing with its resolved URI and metadata.
    pub fn from_parts(listing: Listing, token_uri: String, metadata: AssetMetadata) -> Self {
        Self {
            price_ether: listing.price_in_ether(),
            listing_id: listing.id,
            asset_contract: listing.asset_contract,
            asset_id: listing.asset_id,
            seller: listing.seller,
            owner: listing.owner,
            price: listing.price,
            sold: listing.sold,
            token_uri,
            metadata,
        }
    }
}
