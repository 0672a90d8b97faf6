#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Seeded 1-D clustering and risk tier classification.
//!
//! The [`Clusterer`] trait is the seam between the pipeline and the
//! clustering algorithm. [`KMeans`] is the shipped implementation: Lloyd's
//! algorithm with k-means++ seeding and several restarts, reproducible for
//! a fixed seed. [`classify`] turns cluster assignments into
//! [`RiskTier`](accident_map_accident_models::RiskTier)s by ranking
//! clusters by their mean accident count.

pub mod classify;
pub mod kmeans;

use thiserror::Error;

pub use classify::{ClassifyParams, ClusteringConfig, InsufficientDataPolicy, classify};
pub use kmeans::{Clustering, KMeans, KMeansParams};

/// Errors that can occur during clustering.
#[derive(Debug, Error)]
pub enum ClusterError {
    /// There is nothing to cluster.
    #[error("Cannot cluster an empty set of values")]
    Empty,

    /// The requested number of clusters is zero.
    #[error("Number of clusters must be at least 1, got {k}")]
    InvalidK {
        /// Requested number of clusters.
        k: usize,
    },

    /// A value is NaN or infinite.
    #[error("Value at index {index} is not finite")]
    NonFinite {
        /// Position of the offending value.
        index: usize,
    },

    /// Fewer distinct values than requested clusters.
    #[error(
        "Clustering into {required} groups needs at least {required} distinct accident counts, found {distinct}"
    )]
    InsufficientData {
        /// Minimum number of distinct values needed.
        required: usize,
        /// Number of distinct values available.
        distinct: usize,
    },

    /// A clusterer returned labels that do not fit the input.
    #[error("Invalid cluster labels: {message}")]
    InvalidLabels {
        /// Description of what went wrong.
        message: String,
    },
}

/// Partitions 1-D values into `k` groups.
///
/// Implementations must be deterministic for a given `seed` and return one
/// label in `0..k` per input value.
pub trait Clusterer {
    /// Returns the group id of each value.
    ///
    /// # Errors
    ///
    /// Returns [`ClusterError`] if the values cannot be split into `k`
    /// groups.
    fn cluster(&self, values: &[f64], k: usize, seed: u64) -> Result<Vec<usize>, ClusterError>;
}

/// Counts distinct values, treating equal floats as one.
#[must_use]
pub fn distinct_count(values: &[f64]) -> usize {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted.dedup();
    sorted.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_distinct_values() {
        assert_eq!(distinct_count(&[5.0, 2.0, 5.0, 2.0, 1.0]), 3);
        assert_eq!(distinct_count(&[]), 0);
        assert_eq!(distinct_count(&[4.0, 4.0]), 1);
    }
}
