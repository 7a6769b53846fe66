//! Fixed-capacity index pools.
//!
//! An [`IndexPool`] tracks which integer indices in `[0, capacity)` are free
//! versus checked out. The free queue is FIFO: a just-released index becomes
//! eligible for reuse only after every index released before it.

use std::collections::VecDeque;

use crate::error::{PoolError, PoolResult};

// ---------------------------------------------------------------------------
// IndexPool
// ---------------------------------------------------------------------------

/// A named, fixed-capacity pool of integer-indexed resource units.
///
/// Pools are created once at startup, fresh or restored from a snapshot,
/// and live for the whole process. They are mutated only through
/// [`allocate`](Self::allocate) and [`release`](Self::release); the service
/// layer serializes those calls, so the pool itself carries no lock.
///
/// Invariant: `free` holds distinct indices drawn from `[0, capacity)`, and
/// the complement of `free` is exactly the set of checked-out indices. The
/// one sanctioned exception is a pool restored from a snapshot written under
/// a larger capacity (see [`from_saved`](Self::from_saved)).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexPool {
    name: String,
    capacity: u32,
    secret: String,
    free: VecDeque<u32>,
}

impl IndexPool {
    /// Create a pool with every index in `[0, capacity)` free, in order.
    pub fn fresh(name: impl Into<String>, capacity: u32, secret: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            capacity,
            secret: secret.into(),
            free: (0..capacity).collect(),
        }
    }

    /// Restore a pool from a saved free queue.
    ///
    /// The queue is adopted as-is. If an operator shrank the configured
    /// capacity since the snapshot was written, entries may lie outside
    /// `[0, capacity)`; recovery warns about the mismatch and serves the
    /// pool anyway rather than refusing to start.
    pub fn from_saved(
        name: impl Into<String>,
        capacity: u32,
        secret: impl Into<String>,
        free: VecDeque<u32>,
    ) -> Self {
        Self {
            name: name.into(),
            capacity,
            secret: secret.into(),
            free,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// Currently-free indices, next-to-be-allocated first.
    pub fn free_indices(&self) -> impl Iterator<Item = u32> + '_ {
        self.free.iter().copied()
    }

    pub fn free_len(&self) -> usize {
        self.free.len()
    }

    /// Check out the earliest-released free index.
    ///
    /// Fails with [`PoolError::Exhausted`] when nothing is free at the
    /// moment of the call.
    pub fn allocate(&mut self) -> PoolResult<u32> {
        self.free.pop_front().ok_or(PoolError::Exhausted)
    }

    /// Return a checked-out index to the back of the free queue.
    ///
    /// Fails with [`PoolError::OutOfRange`] for indices outside
    /// `[0, capacity)` and [`PoolError::AlreadyFree`] for indices that are
    /// not currently checked out. Either failure leaves the queue untouched.
    pub fn release(&mut self, index: i64) -> PoolResult<()> {
        if index < 0 || index >= i64::from(self.capacity) {
            return Err(PoolError::OutOfRange {
                index,
                capacity: self.capacity,
            });
        }
        let index = index as u32;
        if self.free.contains(&index) {
            return Err(PoolError::AlreadyFree { index });
        }
        self.free.push_back(index);
        Ok(())
    }

    /// Put a just-allocated index back at the front of the queue, restoring
    /// the exact pre-allocate contents and order. Called only on the failed
    /// snapshot-write path, under the same lock as the allocate.
    pub(crate) fn undo_allocate(&mut self, index: u32) {
        self.free.push_front(index);
    }

    /// Drop the most recently released index from the back of the queue,
    /// restoring the exact pre-release contents and order. Called only on
    /// the failed snapshot-write path, under the same lock as the release.
    pub(crate) fn undo_release(&mut self) {
        self.free.pop_back();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn free_of(pool: &IndexPool) -> Vec<u32> {
        pool.free_indices().collect()
    }

    #[test]
    fn test_fresh_pool_has_full_range_free() {
        let pool = IndexPool::fresh("dev", 4, "s");
        assert_eq!(free_of(&pool), vec![0, 1, 2, 3]);
        assert_eq!(pool.capacity(), 4);
        assert_eq!(pool.name(), "dev");
    }

    #[test]
    fn test_allocate_drains_in_order_then_exhausts() {
        let mut pool = IndexPool::fresh("dev", 3, "s");
        assert_eq!(pool.allocate(), Ok(0));
        assert_eq!(pool.allocate(), Ok(1));
        assert_eq!(pool.allocate(), Ok(2));
        assert_eq!(pool.allocate(), Err(PoolError::Exhausted));
    }

    #[test]
    fn test_fifo_reuse_order() {
        let mut pool = IndexPool::fresh("dev", 5, "s");
        for _ in 0..5 {
            pool.allocate().unwrap();
        }

        // Releasing a, b, c makes them come back in exactly that order.
        pool.release(3).unwrap();
        pool.release(0).unwrap();
        pool.release(4).unwrap();
        assert_eq!(pool.allocate(), Ok(3));
        assert_eq!(pool.allocate(), Ok(0));
        assert_eq!(pool.allocate(), Ok(4));
        assert_eq!(pool.allocate(), Err(PoolError::Exhausted));
    }

    #[test]
    fn test_release_out_of_range_leaves_queue_unchanged() {
        let mut pool = IndexPool::fresh("dev", 2, "s");
        pool.allocate().unwrap();
        let before = free_of(&pool);

        assert_eq!(
            pool.release(-20),
            Err(PoolError::OutOfRange {
                index: -20,
                capacity: 2
            })
        );
        assert_eq!(
            pool.release(2),
            Err(PoolError::OutOfRange {
                index: 2,
                capacity: 2
            })
        );
        assert_eq!(
            pool.release(1000),
            Err(PoolError::OutOfRange {
                index: 1000,
                capacity: 2
            })
        );
        assert_eq!(free_of(&pool), before);
    }

    #[test]
    fn test_release_already_free_leaves_queue_unchanged() {
        let mut pool = IndexPool::fresh("dev", 3, "s");
        pool.allocate().unwrap();
        pool.release(0).unwrap();
        let before = free_of(&pool);

        assert_eq!(pool.release(0), Err(PoolError::AlreadyFree { index: 0 }));
        assert_eq!(pool.release(1), Err(PoolError::AlreadyFree { index: 1 }));
        assert_eq!(free_of(&pool), before);
    }

    #[test]
    fn test_allocate_release_round_trip_restores_free_set() {
        let mut pool = IndexPool::fresh("dev", 6, "s");
        for _ in 0..4 {
            pool.allocate().unwrap();
        }
        pool.release(1).unwrap();

        let before = free_of(&pool);
        let index = pool.allocate().unwrap();
        pool.release(i64::from(index)).unwrap();

        let mut after = free_of(&pool);
        let mut expected = before.clone();
        after.sort_unstable();
        expected.sort_unstable();
        assert_eq!(after, expected);
    }

    #[test]
    fn test_single_free_round_trip_restores_exact_order() {
        let mut pool = IndexPool::fresh("dev", 1, "s");
        let before = free_of(&pool);
        let index = pool.allocate().unwrap();
        pool.release(i64::from(index)).unwrap();
        assert_eq!(free_of(&pool), before);
    }

    #[test]
    fn test_capacity_one_scenario() {
        let mut pool = IndexPool::fresh("singleton_1", 1, "supersecret1");
        assert_eq!(pool.allocate(), Ok(0));
        assert_eq!(pool.allocate(), Err(PoolError::Exhausted));
        assert_eq!(pool.release(0), Ok(()));
        assert_eq!(pool.release(0), Err(PoolError::AlreadyFree { index: 0 }));
        assert_eq!(
            pool.release(-20),
            Err(PoolError::OutOfRange {
                index: -20,
                capacity: 1
            })
        );
    }

    #[test]
    fn test_capacity_ten_scenario() {
        let mut pool = IndexPool::fresh("got10", 10, "supersecret0");
        assert_eq!(pool.allocate(), Ok(0));
        assert_eq!(pool.allocate(), Ok(1));
        assert_eq!(pool.allocate(), Ok(2));
        pool.release(1).unwrap();
        assert_eq!(pool.allocate(), Ok(3));
        assert_eq!(pool.allocate(), Ok(4));
        assert_eq!(pool.allocate(), Ok(5));
        assert_eq!(pool.allocate(), Ok(6));
        pool.release(2).unwrap();
        pool.release(4).unwrap();
        assert_eq!(pool.allocate(), Ok(7));
        assert_eq!(pool.allocate(), Ok(8));
        assert_eq!(pool.allocate(), Ok(9));
        assert_eq!(pool.allocate(), Ok(1));
        pool.release(7).unwrap();
        assert_eq!(pool.allocate(), Ok(2));
        assert_eq!(pool.allocate(), Ok(4));
        assert_eq!(pool.allocate(), Ok(7));
        assert_eq!(pool.allocate(), Err(PoolError::Exhausted));
        assert_eq!(pool.release(8), Ok(()));
    }

    #[test]
    fn test_zero_capacity_pool_is_always_exhausted() {
        let mut pool = IndexPool::fresh("zero", 0, "supersecret4");
        assert_eq!(pool.allocate(), Err(PoolError::Exhausted));
        assert_eq!(
            pool.release(0),
            Err(PoolError::OutOfRange {
                index: 0,
                capacity: 0
            })
        );
    }

    #[test]
    fn test_undo_allocate_restores_front() {
        let mut pool = IndexPool::fresh("dev", 3, "s");
        pool.allocate().unwrap();
        let before = free_of(&pool);
        let index = pool.allocate().unwrap();
        pool.undo_allocate(index);
        assert_eq!(free_of(&pool), before);
    }

    #[test]
    fn test_undo_release_restores_back() {
        let mut pool = IndexPool::fresh("dev", 3, "s");
        pool.allocate().unwrap();
        let before = free_of(&pool);
        pool.release(0).unwrap();
        pool.undo_release();
        assert_eq!(free_of(&pool), before);
    }

    proptest! {
        /// Arbitrary allocate/release sequences keep the free queue
        /// duplicate-free, in range, and never longer than the capacity.
        #[test]
        fn random_op_sequences_keep_invariants(
            ops in prop::collection::vec((any::<bool>(), -4i64..12), 0..256)
        ) {
            let mut pool = IndexPool::fresh("prop", 8, "s");
            for (is_allocate, index) in ops {
                if is_allocate {
                    let _ = pool.allocate();
                } else {
                    let _ = pool.release(index);
                }

                let free: Vec<u32> = pool.free_indices().collect();
                let distinct: std::collections::HashSet<u32> =
                    free.iter().copied().collect();
                prop_assert_eq!(distinct.len(), free.len());
                prop_assert!(free.iter().all(|&i| i < 8));
                prop_assert!(free.len() <= 8);
            }
        }
    }
}
