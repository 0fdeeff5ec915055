//! Reusable-instance pools for scratch state on the query hot path.

pub mod resource_pool;
pub mod worker_pools;

pub use resource_pool::ResourcePool;
pub use worker_pools::WorkerPools;
