//! Listing ledger contract: escrow, list, buy.
//!
//! State is a monotonically growing list of listings plus a sold counter.
//! Listing ids are 1-based and equal to their position in `items` + 1.
//! The value a caller attaches has already been credited to the ledger's
//! address by the execution environment when these methods run.

use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::balances::Balances;
use super::error::MarketError;
use super::listing::{AssetId, ChainEvent, Listing, ListingId};
use super::registry::AssetRegistry;
use super::world::Call;

/// The marketplace ledger contract state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marketplace {
    address: Address,
    /// Deployer; receives the listing fee of every sold item.
    owner: Address,
    listing_fee: U256,
    items: Vec<Listing>,
    items_sold: u64,
}

impl Marketplace {
    pub fn new(address: Address, owner: Address, listing_fee: U256) -> Self {
        Self {
            address,
            owner,
            listing_fee,
            items: Vec::new(),
            items_sold: 0,
        }
    }

    pub const fn address(&self) -> Address {
        self.address
    }

    pub const fn owner(&self) -> Address {
        self.owner
    }

    pub const fn listing_fee(&self) -> U256 {
        self.listing_fee
    }

    pub fn item_count(&self) -> u64 {
        self.items.len() as u64
    }

    pub const fn items_sold(&self) -> u64 {
        self.items_sold
    }

    pub fn listing(&self, listing_id: ListingId) -> Result<&Listing, MarketError> {
        Self::index(listing_id)
            .and_then(|i| self.items.get(i))
            .ok_or(MarketError::UnknownListing(listing_id))
    }

    /// List `asset_id` of `registry` at `price`, taking custody of the asset.
    ///
    /// `call.value` must equal the listing fee; the fee stays on the ledger
    /// until the item sells.
    pub fn create_listing(
        &mut self,
        call: &Call,
        registry: &mut AssetRegistry,
        asset_id: AssetId,
        price: U256,
        events: &mut Vec<ChainEvent>,
    ) -> Result<ListingId, MarketError> {
        if price.is_zero() {
            return Err(MarketError::InvalidPrice);
        }
        if call.value != self.listing_fee {
            return Err(MarketError::IncorrectListingFee {
                expected: self.listing_fee,
                attached: call.value,
            });
        }

        registry.transfer_from(self.address, call.caller, self.address, asset_id, events)?;

        let listing = Listing {
            id: self.item_count() + 1,
            asset_contract: registry.address(),
            asset_id,
            seller: call.caller,
            owner: self.address,
            price,
            sold: false,
        };
        let listing_id = listing.id;

        events.push(ChainEvent::ListingCreated {
            market: self.address,
            listing_id,
            asset_contract: listing.asset_contract,
            asset_id,
            seller: listing.seller,
            owner: listing.owner,
            price,
            sold: false,
        });
        self.items.push(listing);

        debug!(listing_id, asset_id, %price, "Listing appended");
        Ok(listing_id)
    }

    /// Buy `listing_id`. `call.value` must equal the asking price.
    ///
    /// Pays the seller, forwards the listing fee to the ledger owner and
    /// releases custody to the caller.
    pub fn purchase(
        &mut self,
        call: &Call,
        registry: &mut AssetRegistry,
        balances: &mut Balances,
        asset_id: AssetId,
        listing_id: ListingId,
        events: &mut Vec<ChainEvent>,
    ) -> Result<(), MarketError> {
        let listing = self.listing(listing_id)?;
        if !listing.escrows(registry.address(), asset_id) {
            return Err(MarketError::AssetMismatch {
                listing_id,
                asset_contract: registry.address(),
                asset_id,
            });
        }
        if listing.sold {
            return Err(MarketError::AlreadySold(listing_id));
        }
        if call.value != listing.price {
            return Err(MarketError::IncorrectPayment {
                expected: listing.price,
                attached: call.value,
            });
        }

        let seller = listing.seller;
        let price = listing.price;

        balances.transfer(self.address, seller, price)?;
        balances.transfer(self.address, self.owner, self.listing_fee)?;
        registry.transfer_from(self.address, self.address, call.caller, asset_id, events)?;

        let idx = Self::index(listing_id).ok_or(MarketError::UnknownListing(listing_id))?;
        let listing = &mut self.items[idx];
        listing.owner = call.caller;
        listing.sold = true;
        self.items_sold += 1;

        events.push(ChainEvent::ListingSold {
            market: self.address,
            listing_id,
            asset_contract: registry.address(),
            asset_id,
            seller,
            buyer: call.caller,
            price,
        });

        debug!(listing_id, buyer = %call.caller, "Listing sold");
        Ok(())
    }

    /// Every listing not yet sold, in id order.
    pub fn fetch_unsold_listings(&self) -> Vec<Listing> {
        self.items.iter().filter(|l| !l.sold).cloned().collect()
    }

    /// Listings whose current owner is `owner`.
    pub fn fetch_listings_owned_by(&self, owner: Address) -> Vec<Listing> {
        self.items
            .iter()
            .filter(|l| l.owner == owner)
            .cloned()
            .collect()
    }

    /// Listings created by `seller`, sold or not.
    pub fn fetch_listings_created_by(&self, seller: Address) -> Vec<Listing> {
        self.items
            .iter()
            .filter(|l| l.seller == seller)
            .cloned()
            .collect()
    }

    fn index(listing_id: ListingId) -> Option<usize> {
        listing_id.checked_sub(1).and_then(|i| usize::try_from(i).ok())
    }
}
