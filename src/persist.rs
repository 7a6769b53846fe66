//! Durable snapshot store and startup recovery.
//!
//! The whole store is one JSON document covering every pool, rewritten after
//! each successful mutation. Commits are atomic: the document is written to
//! a temp file in the same directory, fsynced, and renamed over the store,
//! so a crash mid-write can never leave a torn file behind.
//!
//! Recovery runs once at startup and reconciles the configured pools against
//! whatever the store holds; see [`recover`].

use std::collections::{BTreeMap, VecDeque};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::error::SnapshotError;
use crate::pool::IndexPool;
use crate::registry::PoolRegistry;

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

/// One pool's entry in the snapshot document.
///
/// The wire names are the legacy save-file format (`count` is the capacity,
/// `auth_token` the secret, `allocations` the ordered free queue) so state
/// files from earlier deployments load unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedPool {
    pub name: String,

    #[serde(rename = "count")]
    pub capacity: u32,

    #[serde(rename = "auth_token")]
    pub secret: String,

    #[serde(rename = "allocations")]
    pub free: VecDeque<u32>,
}

impl SavedPool {
    fn of(pool: &IndexPool) -> Self {
        Self {
            name: pool.name().to_string(),
            capacity: pool.capacity(),
            secret: pool.secret().to_string(),
            free: pool.free_indices().collect(),
        }
    }
}

/// The full snapshot document: pool name → saved entry.
pub type SavedSnapshot = BTreeMap<String, SavedPool>;

// ---------------------------------------------------------------------------
// SnapshotStore
// ---------------------------------------------------------------------------

/// Owns the snapshot file path and the durable-commit protocol.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the saved snapshot. A missing file or blank content means no
    /// prior state: a fresh start, not an error.
    pub fn load(&self) -> Result<Option<SavedSnapshot>, SnapshotError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(SnapshotError::Io(err)),
        };
        if content.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&content)?))
    }

    /// Serialize every pool and commit the document.
    ///
    /// The caller must hold the service lock: the document covers all pools,
    /// so concurrent writers would clobber each other's snapshots.
    pub fn save(&self, registry: &PoolRegistry) -> Result<(), SnapshotError> {
        let snapshot: SavedSnapshot = registry
            .iter()
            .map(|pool| (pool.name().to_string(), SavedPool::of(pool)))
            .collect();
        let payload = serde_json::to_vec(&snapshot)?;

        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&payload)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)
            .map_err(|err| SnapshotError::Io(err.error))?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Recovery
// ---------------------------------------------------------------------------

/// Reconcile configured pools against the saved snapshot. Runs once at
/// startup, before the server accepts requests.
///
/// - Pool in both: the saved free queue is adopted as-is; the configured
///   capacity and secret win. A capacity disagreement is warned, not fatal;
///   the pool is served with the mismatched queue until the configuration
///   is fixed.
/// - Pool only in the snapshot: warned and dropped, not served.
/// - Pool only in the configuration: starts with the full range free. With
///   no snapshot document at all this is the expected first run and logs a
///   single info line; with a document present, each such pool is warned.
pub fn recover(configured: Vec<IndexPool>, saved: Option<SavedSnapshot>) -> PoolRegistry {
    let Some(mut saved) = saved else {
        info!("No saved snapshot; starting all pools fresh");
        return PoolRegistry::new(configured);
    };

    let mut pools = Vec::with_capacity(configured.len());
    for pool in configured {
        match saved.remove(pool.name()) {
            Some(entry) => {
                if entry.name != pool.name() {
                    warn!(
                        "Snapshot entry for {} carries mismatched name {}",
                        pool.name(),
                        entry.name
                    );
                }
                if entry.capacity != pool.capacity() {
                    warn!(
                        "Snapshot capacity for {} is {} but configuration says {}; keeping configured capacity",
                        pool.name(),
                        entry.capacity,
                        pool.capacity()
                    );
                }
                pools.push(IndexPool::from_saved(
                    pool.name(),
                    pool.capacity(),
                    pool.secret(),
                    entry.free,
                ));
            }
            None => {
                warn!(
                    "Configuration contains resource not in snapshot: {}; starting with full range free",
                    pool.name()
                );
                pools.push(pool);
            }
        }
    }

    for name in saved.keys() {
        warn!("Snapshot contains resource not in configuration: {}", name);
    }

    PoolRegistry::new(pools)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
