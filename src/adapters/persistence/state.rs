//! State Store - Atomic JSON Snapshots
//!
//! Saves the local world state to `state.json` and the latest deployment
//! to `deployments.json` using atomic writes (write to tmp file, then
//! rename). A crash leaves either the old or the new file, never a
//! partial one.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::fs;
use tracing::{info, instrument};

use crate::domain::world::WorldState;
use crate::ports::repository::Deployment;

/// Atomic JSON store for the world snapshot and deployment record.
pub struct StateStore {
    /// Path to state.json.
    state_path: PathBuf,
    /// Path to deployments.json.
    deployment_path: PathBuf,
}

impl StateStore {
    /// Create a new state store in the given data directory.
    ///
    /// Creates the directory if it doesn't exist.
    pub async fn new(data_dir: &str) -> Result<Self> {
        let dir = Path::new(data_dir);
        fs::create_dir_all(dir)
            .await
            .context("Failed to create data directory")?;

        Ok(Self {
            state_path: dir.join("state.json"),
            deployment_path: dir.join("deployments.json"),
        })
    }

    /// Save a world snapshot atomically (tmp → rename).
    #[instrument(skip(self, state), fields(block = state.block()))]
    pub async fn save(&self, state: &WorldState) -> Result<()> {
        write_atomic(&self.state_path, state).await?;
        info!(
            path = %self.state_path.display(),
            block = state.block(),
            "State snapshot saved"
        );
        Ok(())
    }

    /// Load the most recent world snapshot.
    ///
    /// Returns `None` if no state file exists (first startup).
    #[instrument(skip(self))]
    pub async fn load(&self) -> Result<Option<WorldState>> {
        let state: Option<WorldState> = read_json(&self.state_path).await?;
        match &state {
            Some(s) => info!(block = s.block(), chain_id = s.chain_id(), "State snapshot loaded"),
            None => info!("No state file found, starting from genesis"),
        }
        Ok(state)
    }

    /// Save the deployment record atomically.
    pub async fn save_deployment(&self, deployment: &Deployment) -> Result<()> {
        write_atomic(&self.deployment_path, deployment).await?;
        info!(
            path = %self.deployment_path.display(),
            marketplace = %deployment.marketplace,
            registry = %deployment.registry,
            "Deployment recorded"
        );
        Ok(())
    }

    /// Load the deployment record, if any.
    pub async fn load_deployment(&self) -> Result<Option<Deployment>> {
        read_json(&self.deployment_path).await
    }
}

async fn write_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize snapshot")?;
    let tmp_path = path.with_extension("json.tmp");

    fs::write(&tmp_path, &json)
        .await
        .with_context(|| format!("Failed to write {}", tmp_path.display()))?;

    fs::rename(&tmp_path, path)
        .await
        .with_context(|| format!("Failed to rename into {}", path.display()))?;

    Ok(())
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }

    let json = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let value = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{Address, U256};

    fn temp_dir() -> String {
        std::env::temp_dir()
            .join(format!("nft-marketplace-state-{}", uuid::Uuid::new_v4()))
            .to_string_lossy()
            .into_owned()
    }

    #[tokio::test]
    async fn test_missing_state_is_none() {
        let store = StateStore::new(&temp_dir()).await.unwrap();
        assert!(store.load().await.unwrap().is_none());
        assert!(store.load_deployment().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_snapshot_survives_reload() {
        let dir = temp_dir();
        let deployer = Address::repeat_byte(0x0d);
        let mut world = WorldState::genesis(1337, [(deployer, U256::from(1_000u64))]).unwrap();
        let market = world.deploy_marketplace(deployer, U256::from(25u64)).unwrap().output;
        let registry = world.deploy_registry(deployer, market).unwrap().output;
        world.mint(deployer, registry, "ipfs://a").unwrap();

        StateStore::new(&dir).await.unwrap().save(&world).await.unwrap();
        let loaded = StateStore::new(&dir).await.unwrap().load().await.unwrap().unwrap();

        assert_eq!(loaded, world);
        assert_eq!(loaded.registry(registry).unwrap().token_uri(1).unwrap(), "ipfs://a");
    }
}
