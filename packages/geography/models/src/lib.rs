#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Subdivision boundary and joined dashboard row types.
//!
//! [`SubdivisionRow`] is the final structured row every dashboard view
//! consumes: the classified accident count of a subdivision together with
//! the representative point of its boundary polygon.

use accident_map_accident_models::RiskTier;
use serde::{Deserialize, Serialize};

/// Representative point of a subdivision boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Centroid {
    /// Longitude in the boundary dataset's coordinate system.
    pub longitude: f64,
    /// Latitude in the boundary dataset's coordinate system.
    pub latitude: f64,
}

/// One subdivision with accident data, ready for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubdivisionRow {
    /// Official subdivision name from the boundary dataset.
    pub name: String,
    /// Number of accidents attributed to this subdivision.
    pub count: u64,
    /// Raw cluster id from the clustering step.
    pub cluster: usize,
    /// Risk tier derived from the cluster's rank.
    pub tier: RiskTier,
    /// Centroid longitude.
    pub longitude: f64,
    /// Centroid latitude.
    pub latitude: f64,
}

impl AsRef<Self> for SubdivisionRow {
    fn as_ref(&self) -> &Self {
        self
    }
}

/// Names that fell out of the join on either side.
///
/// Mismatches are a data-quality gap rather than a fault, so they are only
/// reported for diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinReport {
    /// Canonical accident names with no boundary of the same name.
    pub unmatched_locations: Vec<String>,
    /// Boundary names with no accident data.
    pub boundaries_without_data: Vec<String>,
}

impl JoinReport {
    /// Returns `true` if every name on both sides matched.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.unmatched_locations.is_empty() && self.boundaries_without_data.is_empty()
    }
}
