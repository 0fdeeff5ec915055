use crossbeam_utils::CachePadded;

use crate::error::{GjkError, GjkResult};
use crate::utilities::memory::resource_pool::ResourcePool;

/// Collection of pools used by worker threads.
///
/// Each worker owns one pool; the pools are cache padded so that workers hammering
/// their own pool do not contend on shared cache lines.
pub struct WorkerPools<T> {
    pools: Vec<CachePadded<ResourcePool<T>>>,
    preallocated_per_worker: usize,
}

impl<T: Default> WorkerPools<T> {
    /// Creates a new set of worker pools.
    ///
    /// # Arguments
    ///
    /// * `worker_count` - Number of workers to allocate pools for.
    /// * `preallocated_per_worker` - Number of instances each pool starts with.
    pub fn new(worker_count: usize, preallocated_per_worker: usize) -> Self {
        let pools = (0..worker_count)
            .map(|_| CachePadded::new(ResourcePool::with_preallocated(preallocated_per_worker)))
            .collect();
        Self {
            pools,
            preallocated_per_worker,
        }
    }

    /// Gets the number of worker pools.
    pub fn worker_count(&self) -> usize {
        self.pools.len()
    }

    /// Gets the pool associated with this worker.
    pub fn pool_mut(&mut self, worker_index: usize) -> GjkResult<&mut ResourcePool<T>> {
        let count = self.pools.len();
        self.pools
            .get_mut(worker_index)
            .map(|pool| &mut **pool)
            .ok_or(GjkError::WorkerOutOfRange {
                index: worker_index,
                count,
            })
    }

    /// Iterates the pools mutably, one per worker, so each can be moved to its own thread.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ResourcePool<T>> {
        self.pools.iter_mut().map(|pool| &mut **pool)
    }

    /// Grows or shrinks the set of pools to `worker_count`.
    pub fn resize(&mut self, worker_count: usize) {
        let preallocated = self.preallocated_per_worker;
        self.pools.resize_with(worker_count, || {
            CachePadded::new(ResourcePool::with_preallocated(preallocated))
        });
    }

    /// Drops all waiting instances from every worker pool. Pools can still be used after being cleared.
    pub fn clear(&mut self) {
        for pool in &mut self.pools {
            pool.clear();
        }
    }

    /// Gets the total number of instances created by all worker pools.
    pub fn total_allocated_count(&self) -> usize {
        self.pools.iter().map(|p| p.allocated_count()).sum()
    }
}
