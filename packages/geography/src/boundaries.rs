//! Boundary dataset parsing.
//!
//! Each `GeoJSON` feature becomes one [`Boundary`]. Features with a blank
//! name or a non-polygonal geometry are skipped with a warning, mirroring
//! how sparse attribute tables are usually exported from shapefiles.

use std::collections::BTreeSet;

use accident_map_geography_models::Centroid;
use geo::{Centroid as _, MultiPolygon};
use geojson::{Feature, GeoJson};
use serde::{Deserialize, Serialize};

use crate::GeographyError;

/// Layout of the boundary dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryConfig {
    /// Feature property holding the subdivision's official name
    /// (e.g. `"ADM3_EN"`).
    pub name_property: String,
}

/// A named subdivision polygon.
#[derive(Debug, Clone, PartialEq)]
pub struct Boundary {
    /// Official subdivision name.
    pub name: String,
    /// Polygon or multi-polygon outline.
    pub geometry: MultiPolygon<f64>,
}

impl Boundary {
    /// Area-weighted centroid of the whole outline.
    ///
    /// For a multi-part geometry this is the centroid of the combined area,
    /// not of any single part. Returns `None` for an empty geometry.
    #[must_use]
    pub fn centroid(&self) -> Option<Centroid> {
        self.geometry.centroid().map(|p| Centroid {
            longitude: p.x(),
            latitude: p.y(),
        })
    }
}

/// All boundaries of one dataset, in file order, with unique names.
#[derive(Debug, Clone, Default)]
pub struct BoundarySet {
    boundaries: Vec<Boundary>,
}

impl BoundarySet {
    /// Builds a set from boundaries, rejecting duplicate names.
    ///
    /// # Errors
    ///
    /// Returns [`GeographyError::DuplicateName`] if two boundaries share a
    /// name.
    pub fn new(boundaries: Vec<Boundary>) -> Result<Self, GeographyError> {
        let mut seen = BTreeSet::new();
        for b in &boundaries {
            if !seen.insert(b.name.as_str()) {
                return Err(GeographyError::DuplicateName {
                    name: b.name.clone(),
                });
            }
        }
        Ok(Self { boundaries })
    }

    /// Iterates boundaries in file order.
    pub fn iter(&self) -> std::slice::Iter<'_, Boundary> {
        self.boundaries.iter()
    }

    /// Number of boundaries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.boundaries.len()
    }

    /// Returns `true` if there are no boundaries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.boundaries.is_empty()
    }

    /// Looks up a boundary by exact name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Boundary> {
        self.boundaries.iter().find(|b| b.name == name)
    }
}

impl<'a> IntoIterator for &'a BoundarySet {
    type Item = &'a Boundary;
    type IntoIter = std::slice::Iter<'a, Boundary>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Parses a boundary dataset from raw `GeoJSON` bytes.
///
/// # Errors
///
/// Returns [`GeographyError`] if the bytes are not a `GeoJSON`
/// `FeatureCollection`, two boundaries share a name, or no feature yields a
/// usable boundary.
pub fn parse_boundaries(
    bytes: &[u8],
    config: &BoundaryConfig,
) -> Result<BoundarySet, GeographyError> {
    let text = std::str::from_utf8(bytes)?;
    let geojson: GeoJson = text.parse()?;

    let collection = match geojson {
        GeoJson::FeatureCollection(fc) => fc,
        GeoJson::Feature(_) => {
            return Err(GeographyError::NotFeatureCollection { found: "Feature" });
        }
        GeoJson::Geometry(_) => {
            return Err(GeographyError::NotFeatureCollection { found: "Geometry" });
        }
    };

    let total = collection.features.len();
    let boundaries: Vec<Boundary> = collection
        .features
        .into_iter()
        .enumerate()
        .filter_map(|(i, feature)| feature_to_boundary(i, feature, &config.name_property))
        .collect();

    if boundaries.is_empty() {
        return Err(GeographyError::Empty {
            name_property: config.name_property.clone(),
        });
    }

    log::info!(
        "Loaded {} of {total} boundary features (name property '{}')",
        boundaries.len(),
        config.name_property
    );

    BoundarySet::new(boundaries)
}

/// Converts a single feature, or returns `None` if it has no usable name or
/// polygonal geometry.
fn feature_to_boundary(index: usize, feature: Feature, name_property: &str) -> Option<Boundary> {
    let Some(name) = feature
        .property(name_property)
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
    else {
        log::warn!("Skipping feature {index}: missing '{name_property}' property");
        return None;
    };

    let Some(geometry) = feature.geometry else {
        log::warn!("Skipping boundary '{name}': no geometry");
        return None;
    };

    let geometry = match geo::Geometry::<f64>::try_from(geometry) {
        Ok(geo::Geometry::MultiPolygon(mp)) => mp,
        Ok(geo::Geometry::Polygon(p)) => MultiPolygon(vec![p]),
        Ok(_) => {
            log::warn!("Skipping boundary '{name}': geometry is not a polygon");
            return None;
        }
        Err(e) => {
            log::warn!("Skipping boundary '{name}': {e}");
            return None;
        }
    };

    if geometry.0.is_empty() {
        log::warn!("Skipping boundary '{name}': empty geometry");
        return None;
    }

    Some(Boundary { name, geometry })
}
