#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Filtering and summary statistics over joined subdivision rows.
//!
//! Every dashboard view (metric panels, tier blocks, table, and map) is
//! computed from the same filtered subset, so the numbers always agree.

use std::collections::BTreeSet;

use accident_map_analytics_models::{DashboardSummary, TierSummary};
use accident_map_geography_models::SubdivisionRow;
use serde::{Deserialize, Serialize};

/// Which subdivisions the dashboard currently shows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type", content = "names")]
pub enum ActiveSubset {
    /// Every joined subdivision.
    #[default]
    All,
    /// Only the named subdivisions.
    Names(BTreeSet<String>),
}

impl ActiveSubset {
    /// Builds a subset from names. An empty list means [`Self::All`].
    #[must_use]
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: BTreeSet<String> = names.into_iter().map(Into::into).collect();
        if set.is_empty() {
            Self::All
        } else {
            Self::Names(set)
        }
    }

    /// Returns `true` if `name` is in the subset.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        match self {
            Self::All => true,
            Self::Names(names) => names.contains(name),
        }
    }
}

/// Returns the rows in the active subset, in input order.
///
/// Selected names that match no row are ignored with a warning.
pub fn filter<'a, T: AsRef<SubdivisionRow>>(rows: &'a [T], subset: &ActiveSubset) -> Vec<&'a T> {
    if let ActiveSubset::Names(names) = subset {
        let known: BTreeSet<&str> = rows.iter().map(|r| row_of(r).name.as_str()).collect();
        for name in names.iter().filter(|n| !known.contains(n.as_str())) {
            log::warn!("Ignoring unknown subdivision '{name}' in selection");
        }
    }

    rows.iter()
        .filter(|r| subset.contains(&row_of(*r).name))
        .collect()
}

fn row_of<T: AsRef<SubdivisionRow>>(row: &T) -> &SubdivisionRow {
    row.as_ref()
}

/// Computes the headline numbers over the rows in the active subset.
///
/// The result always carries one [`TierSummary`] per tier, highest risk
/// first.
#[must_use]
pub fn summarize<T: AsRef<SubdivisionRow>>(rows: &[T], subset: &ActiveSubset) -> DashboardSummary {
    let selected = filter(rows, subset);
    let mut summary = DashboardSummary::default();

    for row in selected.into_iter().map(row_of) {
        summary.total_accidents += row.count;
        summary.subdivision_count += 1;
        if let Some(t) = summary.tiers.iter_mut().find(|t| t.tier == row.tier) {
            t.total_accidents += row.count;
            t.subdivisions += 1;
        }
    }

    log::debug!(
        "Summary: {} accidents across {} subdivisions",
        summary.total_accidents,
        summary.subdivision_count
    );

    summary
}

/// Sum of the per-tier totals. Equals the summary total.
#[must_use]
pub fn tier_total(tiers: &[TierSummary]) -> u64 {
    tiers.iter().map(|t| t.total_accidents).sum()
}
