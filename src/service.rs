//! The reserve/release transaction: mutate one pool, snapshot all pools.

use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::auth;
use crate::error::{ServiceError, ServiceResult};
use crate::persist::SnapshotStore;
use crate::registry::PoolRegistry;

/// Service object constructed once at startup and handed to the boundary
/// layer by reference; there are no globals.
///
/// One lock guards "mutate one pool + snapshot all pools" as a single
/// critical section; the snapshot document covers every pool, so the write
/// itself must be serialized globally. The section is bounded by in-memory
/// work plus one local file commit; no network call ever happens under the
/// lock.
#[derive(Debug)]
pub struct ReservationService {
    registry: Mutex<PoolRegistry>,
    store: SnapshotStore,
}

impl ReservationService {
    pub fn new(registry: PoolRegistry, store: SnapshotStore) -> Self {
        Self {
            registry: Mutex::new(registry),
            store,
        }
    }

    /// Check out one free index from `resource`.
    ///
    /// The allocation is acknowledged only after the snapshot commit; if the
    /// write fails, the index goes back to the front of the free queue and
    /// the caller sees [`ServiceError::Snapshot`].
    pub async fn reserve(&self, resource: &str, token: &str) -> ServiceResult<u32> {
        let mut registry = self.registry.lock().await;
        let pool = registry.lookup_mut(resource)?;
        if !auth::check_token(pool, token) {
            warn!("Invalid auth token for resource: {}", resource);
            return Err(ServiceError::Unauthorized {
                name: resource.to_string(),
            });
        }

        let index = match pool.allocate() {
            Ok(index) => index,
            Err(err) => {
                info!("No allocation available: {}", resource);
                return Err(err.into());
            }
        };

        if let Err(err) = self.store.save(&registry) {
            error!(
                "Snapshot write failed after reserve on {}; rolling back: {}",
                resource, err
            );
            if let Ok(pool) = registry.lookup_mut(resource) {
                pool.undo_allocate(index);
            }
            return Err(err.into());
        }

        Ok(index)
    }

    /// Return a checked-out index to `resource`.
    ///
    /// Same contract as [`reserve`](Self::reserve): success is acknowledged
    /// only after the snapshot commit, and a failed write rolls the release
    /// back.
    pub async fn release(&self, resource: &str, index: i64, token: &str) -> ServiceResult<()> {
        let mut registry = self.registry.lock().await;
        let pool = registry.lookup_mut(resource)?;
        if !auth::check_token(pool, token) {
            warn!("Invalid auth token for resource: {}", resource);
            return Err(ServiceError::Unauthorized {
                name: resource.to_string(),
            });
        }

        if let Err(err) = pool.release(index) {
            info!("Release of {} on {} rejected: {}", index, resource, err);
            return Err(err.into());
        }

        if let Err(err) = self.store.save(&registry) {
            error!(
                "Snapshot write failed after release on {}; rolling back: {}",
                resource, err
            );
            if let Ok(pool) = registry.lookup_mut(resource) {
                pool.undo_release();
            }
            return Err(err.into());
        }

        Ok(())
    }
}
