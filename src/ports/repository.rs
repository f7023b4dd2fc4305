//! Repository Port - Local Chain Persistence Interface
//!
//! Persists the local execution environment between runs: an atomic
//! snapshot of the full world state, an append-only JSONL log of
//! committed events, and the record of the last deployment.
//! No database dependency.

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::listing::ChainEvent;
use crate::domain::world::WorldState;

/// A committed event as written to the event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
  /// Unique record identifier.
  pub id: String,
  /// Block that committed the event.
  pub block: u64,
  /// Wall-clock time the record was written.
  pub recorded_at: DateTime<Utc>,
  /// The event itself.
  pub event: ChainEvent,
}

/// Addresses produced by the deploy script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
  /// Network name from config.
  pub network: String,
  /// Chain id the contracts live on.
  pub chain_id: u64,
  /// Account that deployed (and owns) the marketplace.
  pub deployer: Address,
  /// Listing ledger contract.
  pub marketplace: Address,
  /// Asset registry contract.
  pub registry: Address,
  /// Listing fee the ledger was deployed with (wei).
  pub listing_fee: U256,
  /// Deployment time.
  pub deployed_at: DateTime<Utc>,
}

/// Trait for local chain persistence providers.
///
/// Uses JSONL (JSON Lines) for the event log: each line is a
/// self-contained record, easy to stream and robust to partial writes.
#[async_trait]
pub trait ChainRepository: Send + Sync + 'static {
  /// Save a full world-state snapshot (atomic replace).
  async fn save_state(&self, state: &WorldState) -> anyhow::Result<()>;

  /// Load the most recent snapshot, `None` on first run.
  async fn load_state(&self) -> anyhow::Result<Option<WorldState>>;

  /// Append committed events to the log.
  async fn append_events(&self, records: &[EventRecord]) -> anyhow::Result<()>;

  /// Load every logged event, ordered by block.
  async fn load_events(&self) -> anyhow::Result<Vec<EventRecord>>;

  /// Record the latest deployment.
  async fn save_deployment(&self, deployment: &Deployment) -> anyhow::Result<()>;

  /// Load the latest deployment, `None` if nothing was deployed yet.
  async fn load_deployment(&self) -> anyhow::Result<Option<Deployment>>;
}
