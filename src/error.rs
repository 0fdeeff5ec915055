//! Error types for query configuration and pool lookup.
//!
//! Geometric queries never fail; misses, separation and overlap are ordinary results.

use thiserror::Error;

/// Errors raised while configuring the query engine or addressing its pools.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GjkError {
    /// A configuration value is out of its valid range.
    #[error("Invalid GJK configuration: {field} = {value} (must be positive and finite)")]
    InvalidConfig {
        /// Name of the offending field.
        field: &'static str,
        /// Value that was rejected.
        value: f64,
    },

    /// A worker index does not address any pool.
    #[error("Worker index {index} out of range for {count} worker pools")]
    WorkerOutOfRange {
        /// Requested worker index.
        index: usize,
        /// Number of worker pools available.
        count: usize,
    },
}

/// Result type for engine configuration and pool operations.
pub type GjkResult<T> = std::result::Result<T, GjkError>;
