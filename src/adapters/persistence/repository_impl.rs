//! Repository Implementation — Concrete Adapter for the ChainRepository Port
//!
//! Wraps `StateStore` (atomic JSON snapshots) and `EventLog` (JSONL
//! append-only files) into a single struct that implements the
//! `ChainRepository` trait from `crate::ports::repository`.

use anyhow::Result;
use async_trait::async_trait;

use super::events::EventLog;
use super::state::StateStore;
use crate::domain::world::WorldState;
use crate::ports::repository::{ChainRepository, Deployment, EventRecord};

/// Concrete repository adapter combining snapshot and event persistence.
pub struct RepositoryImpl {
    /// Atomic JSON state store.
    state_store: StateStore,
    /// JSONL event log.
    event_log: EventLog,
}

impl RepositoryImpl {
    /// Create a new repository from existing store and log instances.
    pub const fn new(state_store: StateStore, event_log: EventLog) -> Self {
        Self {
            state_store,
            event_log,
        }
    }

    /// Create a new repository with a data directory path.
    ///
    /// Initializes both the state store and event log in the
    /// given directory, creating subdirectories as needed.
    pub async fn from_data_dir(data_dir: &str) -> Result<Self> {
        let state_store = StateStore::new(data_dir).await?;
        let event_log = EventLog::new(data_dir).await?;
        Ok(Self::new(state_store, event_log))
    }
}

#[async_trait]
impl ChainRepository for RepositoryImpl {
    async fn save_state(&self, state: &WorldState) -> Result<()> {
        self.state_store.save(state).await
    }

    async fn load_state(&self) -> Result<Option<WorldState>> {
        self.state_store.load().await
    }

    async fn append_events(&self, records: &[EventRecord]) -> Result<()> {
        self.event_log.append(records).await
    }

    async fn load_events(&self) -> Result<Vec<EventRecord>> {
        self.event_log.load_all().await
    }

    async fn save_deployment(&self, deployment: &Deployment) -> Result<()> {
        self.state_store.save_deployment(deployment).await
    }

    async fn load_deployment(&self) -> Result<Option<Deployment>> {
        self.state_store.load_deployment().await
    }
}
