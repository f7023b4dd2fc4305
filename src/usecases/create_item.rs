//! Create-item Use Case - Upload, Mint, List
//!
//! Flow:
//! 1. `upload_file`: pin the image, keep its gateway URL
//! 2. `create_item`: validate the form, pin `{name, description, image}`,
//!    mint a token pointing at that document, then list it with the
//!    ledger's listing fee attached

use std::sync::Arc;

use alloy::primitives::U256;
use alloy::primitives::utils::parse_ether;
use anyhow::{Context, Result};
use serde_json::json;
use tracing::{info, instrument};

use crate::domain::listing::{AssetId, ListingId};
use crate::ports::asset_registry::AssetRegistryClient;
use crate::ports::marketplace::MarketplaceClient;
use crate::ports::pinning::PinningService;

/// Seller input for a new item. `price` is in ether, e.g. `"1.5"`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemForm {
  pub name: String,
  pub description: String,
  pub price: String,
}

/// Form rejections, raised before anything is pinned or sent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CreateItemError {
  #[error("form field `{0}` is required")]
  IncompleteForm(&'static str),

  #[error("price {0:?} is not a positive ether amount")]
  InvalidPrice(String),
}

/// Identifiers produced by a successful `create_item`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedItem {
  pub asset_id: AssetId,
  pub listing_id: ListingId,
  /// Gateway URL of the pinned metadata document.
  pub token_uri: String,
}

/// Seller-side flow from file upload to a live listing.
pub struct ItemCreator<M, R, P>
where
  M: MarketplaceClient,
  R: AssetRegistryClient,
  P: PinningService,
{
  market: Arc<M>,
  registry: Arc<R>,
  pinning: Arc<P>,
}

impl<M, R, P> ItemCreator<M, R, P>
where
  M: MarketplaceClient,
  R: AssetRegistryClient,
  P: PinningService,
{
  pub const fn new(market: Arc<M>, registry: Arc<R>, pinning: Arc<P>) -> Self {
    Self {
      market,
      registry,
      pinning,
    }
  }

  /// Pin an uploaded file and return the URL it is served at.
  #[instrument(skip(self, content), fields(bytes = content.len()))]
  pub async fn upload_file(&self, file_name: &str, content: Vec<u8>) -> Result<String> {
    let pinned = self
      .pinning
      .pin_bytes(file_name, content)
      .await
      .context("Failed to upload file")?;
    Ok(pinned.url)
  }

  /// Mint and list a new item whose image lives at `file_url`.
  ///
  /// # Errors
  /// `CreateItemError` for an incomplete form or unparsable price; any
  /// pinning or contract failure otherwise.
  #[instrument(skip(self, form), fields(name = %form.name, price = %form.price))]
  pub async fn create_item(&self, form: &ItemForm, file_url: &str) -> Result<CreatedItem> {
    let price = validate(form, file_url)?;

    let document = json!({
      "name": form.name,
      "description": form.description,
      "image": file_url,
    });
    let token_uri = self
      .pinning
      .pin_json(&document)
      .await
      .context("Failed to upload metadata")?
      .url;

    let asset_id = self.registry.mint(&token_uri).await.context("Mint failed")?;

    let fee = self
      .market
      .listing_fee()
      .await
      .context("Failed to read listing fee")?;

    let listing_id = self
      .market
      .create_listing(self.registry.registry_address(), asset_id, price, fee)
      .await
      .context("Listing failed")?;

    info!(asset_id, listing_id, price = %price, "Item created");
    Ok(CreatedItem {
      asset_id,
      listing_id,
      token_uri,
    })
  }
}

/// Check required fields and convert the ether price to wei.
fn validate(form: &ItemForm, file_url: &str) -> Result<U256, CreateItemError> {
  for (field, value) in [
    ("name", &form.name),
    ("description", &form.description),
    ("price", &form.price),
  ] {
    if value.trim().is_empty() {
      return Err(CreateItemError::IncompleteForm(field));
    }
  }
  if file_url.trim().is_empty() {
    return Err(CreateItemError::IncompleteForm("file"));
  }

  let raw = form.price.trim();
  if raw.starts_with('-') {
    return Err(CreateItemError::InvalidPrice(form.price.clone()));
  }
  match parse_ether(raw) {
    Ok(price) if !price.is_zero() => Ok(price),
    _ => Err(CreateItemError::InvalidPrice(form.price.clone())),
  }
}
