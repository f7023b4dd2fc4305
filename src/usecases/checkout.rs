//! Checkout Use Case - Buying a Listed Item

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, instrument};

use crate::domain::listing::MarketItem;
use crate::ports::marketplace::MarketplaceClient;

/// Buyer-side purchase flow.
pub struct Checkout<M: MarketplaceClient> {
  market: Arc<M>,
}

impl<M: MarketplaceClient> Checkout<M> {
  pub const fn new(market: Arc<M>) -> Self {
    Self { market }
  }

  /// Purchase `item`, attaching exactly its asking price.
  #[instrument(skip(self, item), fields(listing_id = item.listing_id, price = %item.price))]
  pub async fn buy(&self, item: &MarketItem) -> Result<()> {
    self
      .market
      .purchase(item.asset_contract, item.asset_id, item.listing_id, item.price)
      .await
      .with_context(|| format!("Failed to buy listing {}", item.listing_id))?;

    info!(
      listing_id = item.listing_id,
      buyer = %self.market.account(),
      "Purchase complete"
    );
    Ok(())
  }
}
