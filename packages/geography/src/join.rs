//! Attaches classified accident counts to boundary polygons.
//!
//! The join keeps only boundaries that have a classified row with exactly
//! the same name. Everything else is left out of the dashboard and listed
//! in the [`JoinReport`].

use std::collections::BTreeMap;

use accident_map_accident_models::ClassifiedSubdivision;
use accident_map_geography_models::{JoinReport, SubdivisionRow};
use geo::MultiPolygon;

use crate::BoundarySet;

/// A dashboard row together with the outline it was joined to.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedSubdivision {
    /// The row shown in tables, summaries, and tooltips.
    pub row: SubdivisionRow,
    /// Boundary outline for the choropleth.
    pub geometry: MultiPolygon<f64>,
}

impl AsRef<SubdivisionRow> for JoinedSubdivision {
    fn as_ref(&self) -> &SubdivisionRow {
        &self.row
    }
}

/// Result of joining classified counts onto boundaries.
#[derive(Debug, Clone, Default)]
pub struct JoinOutcome {
    /// Matched subdivisions, in boundary-file order.
    pub subdivisions: Vec<JoinedSubdivision>,
    /// Names that did not match on either side.
    pub report: JoinReport,
}

/// Joins classified rows onto boundaries by exact name.
///
/// Boundaries without a classified row never produce output, so there are
/// no placeholder rows with a missing count.
#[must_use]
pub fn join_classified(
    boundaries: &BoundarySet,
    classified: &[ClassifiedSubdivision],
) -> JoinOutcome {
    let mut by_name: BTreeMap<&str, &ClassifiedSubdivision> = classified
        .iter()
        .map(|c| (c.name.as_str(), c))
        .collect();

    let mut subdivisions = Vec::new();
    let mut boundaries_without_data = Vec::new();

    for boundary in boundaries {
        let Some(row) = by_name.remove(boundary.name.as_str()) else {
            boundaries_without_data.push(boundary.name.clone());
            continue;
        };

        let Some(centroid) = boundary.centroid() else {
            log::warn!("Boundary '{}' has no centroid, dropping it", boundary.name);
            continue;
        };

        subdivisions.push(JoinedSubdivision {
            row: SubdivisionRow {
                name: boundary.name.clone(),
                count: row.count,
                cluster: row.cluster,
                tier: row.tier,
                longitude: centroid.longitude,
                latitude: centroid.latitude,
            },
            geometry: boundary.geometry.clone(),
        });
    }

    let unmatched_locations: Vec<String> = by_name.into_keys().map(str::to_string).collect();

    for name in &unmatched_locations {
        log::info!("No boundary named '{name}', excluding it from the dashboard");
    }
    log::debug!(
        "{} boundaries have no accident data",
        boundaries_without_data.len()
    );
    log::info!(
        "Joined {} subdivisions ({} unmatched accident names)",
        subdivisions.len(),
        unmatched_locations.len()
    );

    JoinOutcome {
        subdivisions,
        report: JoinReport {
            unmatched_locations,
            boundaries_without_data,
        },
    }
}

#[cfg(test)]
mod tests {
    use accident_map_accident_models::RiskTier;

    use super::*;
    use crate::boundaries::tests::{collection, config, square_feature};
    use crate::parse_boundaries;

    fn classified(name: &str, count: u64, cluster: usize, tier: RiskTier) -> ClassifiedSubdivision {
        ClassifiedSubdivision {
            name: name.to_string(),
            count,
            cluster,
            tier,
        }
    }

    fn boundaries(names: &[&str]) -> BoundarySet {
        let features = names
            .iter()
            .enumerate()
            .map(|(i, n)| {
                #[allow(clippy::cast_precision_loss)]
                let x = i as f64 * 2.0;
                square_feature(n, x, 0.0, 1.0)
            })
            .collect();
        parse_boundaries(&collection(features), &config()).unwrap()
    }

    #[test]
    fn keeps_only_matched_boundaries() {
        let set = boundaries(&["Gubeng", "Wonokromo", "Tandes"]);
        let rows = vec![
            classified("Gubeng", 5, 1, RiskTier::HighRisk),
            classified("Wonokromo", 2, 0, RiskTier::Safe),
        ];

        let outcome = join_classified(&set, &rows);
        let names: Vec<&str> = outcome
            .subdivisions
            .iter()
            .map(|s| s.row.name.as_str())
            .collect();

        assert_eq!(names, vec!["Gubeng", "Wonokromo"]);
        assert_eq!(outcome.report.boundaries_without_data, vec!["Tandes"]);
        assert!(outcome.report.unmatched_locations.is_empty());
    }

    #[test]
    fn never_emits_boundary_without_accidents() {
        let set = boundaries(&["X", "Y"]);
        let rows = vec![classified("Y", 3, 0, RiskTier::HighRisk)];
        let outcome = join_classified(&set, &rows);
        assert!(outcome.subdivisions.iter().all(|s| s.row.name != "X"));
    }

    #[test]
    fn reports_unmatched_accident_names() {
        let set = boundaries(&["Karang Pilang"]);
        let rows = vec![
            classified("Karangpilang", 4, 0, RiskTier::HighRisk),
            classified("Karang Pilang", 1, 1, RiskTier::Safe),
        ];
        let outcome = join_classified(&set, &rows);
        assert_eq!(outcome.subdivisions.len(), 1);
        assert_eq!(outcome.subdivisions[0].row.count, 1);
        assert_eq!(outcome.report.unmatched_locations, vec!["Karangpilang"]);
        assert!(!outcome.report.is_clean());
    }

    #[test]
    fn carries_cluster_tier_and_centroid() {
        let set = boundaries(&["Gubeng"]);
        let rows = vec![classified("Gubeng", 7, 2, RiskTier::Caution)];
        let outcome = join_classified(&set, &rows);
        let row = &outcome.subdivisions[0].row;
        assert_eq!(row.count, 7);
        assert_eq!(row.cluster, 2);
        assert_eq!(row.tier, RiskTier::Caution);
        assert!((row.longitude - 0.5).abs() < 1e-9);
        assert!((row.latitude - 0.5).abs() < 1e-9);
    }
}
