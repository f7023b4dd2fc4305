//! Chain Adapters - Contract Execution Environments
//!
//! Two ways to reach the marketplace and registry contracts:
//! - `local`: in-process `WorldState` behind an async mutex, persisted
//!   through the `ChainRepository` port
//! - `evm`: deployed contracts over JSON-RPC via alloy-rs 0.9, with
//!   artifact deployment in `deploy` and connection setup in `provider`

pub mod deploy;
pub mod evm;
pub mod local;
pub mod provider;

pub use deploy::deploy_contracts;
pub use evm::EvmWallet;
pub use local::{LocalChain, LocalWallet};
pub use provider::ChainProvider;
