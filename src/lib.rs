//! NFT Marketplace — Library Root
//!
//! Listing ledger and asset registry contracts, the execution environments
//! that run them, and the client workflows built on top. Re-exports all
//! modules for the deploy binary and integration tests.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod usecases;
