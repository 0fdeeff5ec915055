//! Checkout/return pool of reusable heap instances.
//!
//! Taking from the pool pops an instance that was returned before, or allocates a
//! fresh default one if none are waiting. Instances are moved out while checked out,
//! so the pool can never hand the same one to two callers.

use tracing::trace;

/// Pool of boxed, reusable instances of `T`.
///
/// Returned instances are not cleared by the pool; callers reset them on checkout.
#[derive(Debug)]
pub struct ResourcePool<T> {
    available: Vec<Box<T>>,
    allocated_count: usize,
}

impl<T: Default> ResourcePool<T> {
    /// Creates an empty pool.
    pub fn new() -> Self {
        Self {
            available: Vec::new(),
            allocated_count: 0,
        }
    }

    /// Creates a pool preloaded with `count` instances.
    pub fn with_preallocated(count: usize) -> Self {
        let mut pool = Self {
            available: Vec::with_capacity(count),
            allocated_count: 0,
        };
        pool.reserve(count);
        pool
    }

    /// Ensures at least `count` instances are waiting in the pool.
    pub fn reserve(&mut self, count: usize) {
        while self.available.len() < count {
            self.available.push(Box::default());
            self.allocated_count += 1;
        }
    }

    /// Takes an instance from the pool.
    ///
    /// Returns a previously returned instance if available, otherwise allocates a new one.
    #[inline(always)]
    pub fn take(&mut self) -> Box<T> {
        match self.available.pop() {
            Some(resource) => resource,
            None => {
                self.allocated_count += 1;
                trace!(
                    allocated = self.allocated_count,
                    "resource pool empty, allocating new instance"
                );
                Box::default()
            }
        }
    }

    /// Returns an instance to the pool for reuse.
    #[inline(always)]
    pub fn give_back(&mut self, resource: Box<T>) {
        self.available.push(resource);
    }

    /// Drops every waiting instance. Checked-out instances are unaffected and may still be returned.
    ///
    /// Instances returned here may have been taken from another pool, so the count never drops below zero.
    pub fn clear(&mut self) {
        self.allocated_count = self.allocated_count.saturating_sub(self.available.len());
        self.available.clear();
    }

    /// Gets the number of returned instances waiting in the pool.
    #[inline(always)]
    pub fn available_count(&self) -> usize {
        self.available.len()
    }

    /// Gets the number of instances currently outstanding or waiting that this pool created.
    #[inline(always)]
    pub fn allocated_count(&self) -> usize {
        self.allocated_count
    }
}

impl<T: Default> Default for ResourcePool<T> {
    fn default() -> Self {
        Self::new()
    }
}
