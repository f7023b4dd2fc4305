//! HTTP Adapters - Off-chain Services over reqwest
//!
//! - `client`: shared client with the configured timeout
//! - `metadata`: token URI → metadata document
//! - `pinning`: IPFS `/api/v0/add` uploads

pub mod client;
pub mod metadata;
pub mod pinning;

pub use client::HttpClient;
pub use metadata::HttpMetadataFetcher;
pub use pinning::IpfsPinningClient;
