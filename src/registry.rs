//! Name → pool lookup, immutable after startup.

use std::collections::BTreeMap;

use crate::error::{ServiceError, ServiceResult};
use crate::pool::IndexPool;

/// Mapping from resource name to its [`IndexPool`].
///
/// Constructed once, from configuration reconciled against the saved
/// snapshot, before the server accepts requests. Membership never changes
/// at runtime: lookups may mutate a pool's free queue, but nothing adds or
/// removes a pool.
#[derive(Debug, Default)]
pub struct PoolRegistry {
    pools: BTreeMap<String, IndexPool>,
}

impl PoolRegistry {
    pub fn new(pools: impl IntoIterator<Item = IndexPool>) -> Self {
        Self {
            pools: pools
                .into_iter()
                .map(|pool| (pool.name().to_string(), pool))
                .collect(),
        }
    }

    /// Resolve a resource name, failing with
    /// [`ServiceError::UnknownResource`] when it was never configured.
    pub fn lookup(&self, name: &str) -> ServiceResult<&IndexPool> {
        self.pools
            .get(name)
            .ok_or_else(|| ServiceError::UnknownResource {
                name: name.to_string(),
            })
    }

    pub fn lookup_mut(&mut self, name: &str) -> ServiceResult<&mut IndexPool> {
        self.pools
            .get_mut(name)
            .ok_or_else(|| ServiceError::UnknownResource {
                name: name.to_string(),
            })
    }

    /// All pools, in name order. Snapshot serialization relies on this
    /// ordering being deterministic.
    pub fn iter(&self) -> impl Iterator<Item = &IndexPool> {
        self.pools.values()
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }
}
