//! Domain layer - Contract state machines and marketplace entities.
//!
//! Pure logic for the listing ledger, the asset registry and the execution
//! environment that runs them. No I/O here (hexagonal architecture inner
//! ring). All state types are serializable and testable in isolation.

pub mod balances;
pub mod error;
pub mod listing;
pub mod marketplace;
pub mod registry;
pub mod world;

// Re-export core types for convenience
pub use balances::Balances;
pub use error::MarketError;
pub use listing::{
    AssetId, AssetMetadata, ChainEvent, DEFAULT_LISTING_FEE_WEI, Listing, ListingId, MarketItem,
};
pub use marketplace::Marketplace;
pub use registry::AssetRegistry;
pub use world::{Call, Receipt, WorldState};
