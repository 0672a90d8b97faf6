#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Subdivision boundary loading, centroids, and the accident join.
//!
//! Boundaries are read from a `GeoJSON` `FeatureCollection` into
//! [`MultiPolygon`](geo::MultiPolygon)s keyed by their official name.
//! The join attaches classified accident counts to those boundaries and
//! derives each subdivision's centroid for map points and tooltips.

pub mod boundaries;
pub mod join;

use thiserror::Error;

pub use boundaries::{Boundary, BoundaryConfig, BoundarySet, parse_boundaries};
pub use join::{JoinOutcome, JoinedSubdivision, join_classified};

/// Errors that can occur while loading boundaries.
#[derive(Debug, Error)]
pub enum GeographyError {
    /// The file is not valid UTF-8.
    #[error("Boundary file is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// `GeoJSON` parsing failed.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] Box<geojson::Error>),

    /// The document is valid `GeoJSON` but not a `FeatureCollection`.
    #[error("Expected a GeoJSON FeatureCollection, found {found}")]
    NotFeatureCollection {
        /// What the document contained instead.
        found: &'static str,
    },

    /// Two boundaries share the same name, so the join key is ambiguous.
    #[error("Duplicate boundary name '{name}'")]
    DuplicateName {
        /// The repeated name.
        name: String,
    },

    /// No feature had both a name and a polygonal geometry.
    #[error("No usable boundaries found (name property '{name_property}')")]
    Empty {
        /// Property that was expected to hold the name.
        name_property: String,
    },
}

impl From<geojson::Error> for GeographyError {
    fn from(e: geojson::Error) -> Self {
        Self::GeoJson(Box::new(e))
    }
}
