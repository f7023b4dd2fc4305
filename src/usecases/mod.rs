//! Use Cases Layer - Client Workflows
//!
//! Orchestrates the port interfaces into the flows a marketplace client
//! offers. Each use case is a self-contained operation over `Arc`-shared
//! adapters, so one wallet can back several ports at once.
//!
//! Use cases:
//! - `Catalog`: Home page, owned assets, creator dashboard
//! - `ItemCreator`: File upload, metadata pinning, mint and list
//! - `Checkout`: Purchase at the asking price

pub mod catalog;
pub mod checkout;
pub mod create_item;

pub use catalog::{Catalog, CreatorDashboard};
pub use checkout::Checkout;
pub use create_item::{CreateItemError, CreatedItem, ItemCreator, ItemForm};
