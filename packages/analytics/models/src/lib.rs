#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Summary statistics shown above the dashboard table.

use accident_map_accident_models::RiskTier;
use serde::{Deserialize, Serialize};

/// Totals for one risk tier within the active subset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierSummary {
    /// The tier being summarized.
    pub tier: RiskTier,
    /// Sum of accident counts of the tier's subdivisions.
    pub total_accidents: u64,
    /// Number of subdivisions in the tier.
    pub subdivisions: usize,
}

impl TierSummary {
    /// An empty summary for `tier`.
    #[must_use]
    pub const fn empty(tier: RiskTier) -> Self {
        Self {
            tier,
            total_accidents: 0,
            subdivisions: 0,
        }
    }
}

/// Headline numbers for the active subset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    /// Sum of accident counts over the subset.
    pub total_accidents: u64,
    /// Number of distinct subdivisions in the subset.
    pub subdivision_count: usize,
    /// One entry per tier, highest risk first. Always has every tier,
    /// including those with no members.
    pub tiers: Vec<TierSummary>,
}

impl DashboardSummary {
    /// Returns the summary for `tier`.
    #[must_use]
    pub fn tier(&self, tier: RiskTier) -> Option<&TierSummary> {
        self.tiers.iter().find(|t| t.tier == tier)
    }
}

impl Default for DashboardSummary {
    fn default() -> Self {
        Self {
            total_accidents: 0,
            subdivision_count: 0,
            tiers: RiskTier::all()
                .iter()
                .copied()
                .map(TierSummary::empty)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_has_every_tier_in_order() {
        let summary = DashboardSummary::default();
        let tiers: Vec<RiskTier> = summary.tiers.iter().map(|t| t.tier).collect();
        assert_eq!(tiers, RiskTier::all());
        assert!(summary.tiers.iter().all(|t| t.total_accidents == 0));
        assert_eq!(summary.tier(RiskTier::Safe).unwrap().subdivisions, 0);
    }
}
