//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the usecases layer requires from
//! the outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `MarketplaceClient`: Listing ledger calls and queries for one account
//! - `AssetRegistryClient`: Minting and token lookups
//! - `MetadataFetcher`: Off-chain metadata documents
//! - `PinningService`: Content upload returning a content address
//! - `ChainRepository`: Local chain snapshots, event log, deployments

pub mod asset_registry;
pub mod marketplace;
pub mod metadata;
pub mod pinning;
pub mod repository;
