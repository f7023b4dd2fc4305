//! Persistence Adapters - JSON/JSONL File Storage
//!
//! Implements the `ChainRepository` port using atomic JSON snapshots for
//! the local world state and deployments, and append-only JSONL files for
//! committed events. No database dependency.

pub mod events;
pub mod repository_impl;
pub mod state;

pub use events::EventLog;
pub use repository_impl::RepositoryImpl;
pub use state::StateStore;
