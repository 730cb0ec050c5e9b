//! Hot-reloadable rewards table.
//!
//! The active table sits behind an `Arc` swap: requests clone the `Arc` at
//! entry and keep scoring against that snapshot even if a reload lands
//! mid-request. The table is never mutated in place.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use keel_core::{Error, Result, RewardsTable};

/// Rewards table compiled into the binary; used when `REWARDS_PATH` is
/// unset.
const EMBEDDED_REWARDS: &str = include_str!("../rewards.json");

/// Shared handle to the active rewards table.
#[derive(Clone, Debug)]
pub struct RewardsStore {
    table: Arc<RwLock<Arc<RewardsTable>>>,
    path: Option<PathBuf>,
}

impl RewardsStore {
    /// Load the initial table from `path`, or the embedded default when
    /// `None`.
    pub async fn load(path: Option<PathBuf>) -> Result<Self> {
        let table = read_table(path.as_deref()).await?;
        info!(version = %table.version, cards = table.cards.len(), "rewards table loaded");
        Ok(Self {
            table: Arc::new(RwLock::new(Arc::new(table))),
            path,
        })
    }

    /// Build a store around an already-parsed table (tests).
    pub fn from_table(table: RewardsTable) -> Self {
        Self {
            table: Arc::new(RwLock::new(Arc::new(table))),
            path: None,
        }
    }

    /// Snapshot of the active table.
    pub async fn current(&self) -> Arc<RewardsTable> {
        self.table.read().await.clone()
    }

    /// Version of the active table.
    pub async fn version(&self) -> String {
        self.table.read().await.version.clone()
    }

    /// Re-read the table from its source and swap it in. Returns the new
    /// version. In-flight requests keep the snapshot they started with.
    pub async fn reload(&self) -> Result<String> {
        let fresh = read_table(self.path.as_deref()).await?;
        let version = fresh.version.clone();
        *self.table.write().await = Arc::new(fresh);
        info!(version = %version, "rewards table reloaded");
        Ok(version)
    }
}

async fn read_table(path: Option<&std::path::Path>) -> Result<RewardsTable> {
    match path {
        Some(path) => {
            let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
                Error::Config(format!("cannot read rewards table {}: {}", path.display(), e))
            })?;
            RewardsTable::from_json(&raw)
        }
        None => RewardsTable::from_json(EMBEDDED_REWARDS),
    }
}
