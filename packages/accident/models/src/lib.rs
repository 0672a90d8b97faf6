#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Accident aggregate rows and risk tier definitions.
//!
//! This crate defines the types that flow between the aggregation and
//! classification stages: per-subdivision accident counts and the three
//! fixed risk tiers those counts are ranked into.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Number of risk tiers the dashboard always reports.
pub const TIER_COUNT: usize = 3;

/// Risk tier assigned to a subdivision after clustering.
///
/// Tiers are not bound to raw cluster ids. Every run ranks the clusters by
/// mean accident count and hands out tiers in rank order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskTier {
    /// Cluster with the highest mean accident count.
    HighRisk,
    /// Any cluster ranked between the highest and the lowest.
    Caution,
    /// Cluster with the lowest mean accident count.
    Safe,
}

impl RiskTier {
    /// Returns all tiers in display order (highest risk first).
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::HighRisk, Self::Caution, Self::Safe]
    }

    /// Short human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::HighRisk => "High-risk",
            Self::Caution => "Caution",
            Self::Safe => "Safe",
        }
    }

    /// Zone label shown on the dashboard tier blocks.
    #[must_use]
    pub const fn zone_label(self) -> &'static str {
        match self {
            Self::HighRisk => "Zona Merah (Rawan)",
            Self::Caution => "Zona Kuning (Waspada)",
            Self::Safe => "Zona Hijau (Aman)",
        }
    }

    /// Fixed display colour as a `#rrggbb` hex string.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::HighRisk => "#e74c3c",
            Self::Caution => "#f1c40f",
            Self::Safe => "#2ecc71",
        }
    }

    /// Returns the tier for a cluster at `rank` when `clusters` populated
    /// clusters are ranked by descending mean count.
    ///
    /// Rank 0 is always [`Self::HighRisk`] and the last rank is
    /// [`Self::Safe`]; anything in between is [`Self::Caution`]. With a
    /// single cluster the only rank is `HighRisk`.
    ///
    /// Returns `None` if `rank` is out of range.
    #[must_use]
    pub const fn for_rank(rank: usize, clusters: usize) -> Option<Self> {
        if rank >= clusters {
            None
        } else if rank == 0 {
            Some(Self::HighRisk)
        } else if rank + 1 == clusters {
            Some(Self::Safe)
        } else {
            Some(Self::Caution)
        }
    }
}

/// A raw accident record as read from the accident table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccidentRecord {
    /// Free-text location naming the containing subdivision
    /// (e.g. `"KEC. GUBENG, KOTA SURABAYA"`).
    pub location: String,
}

/// Accident count for one canonical subdivision name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubdivisionCount {
    /// Canonical subdivision name (the join key).
    pub name: String,
    /// Number of accident records normalized to this name.
    pub count: u64,
}

/// A subdivision count with its cluster assignment and risk tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedSubdivision {
    /// Canonical subdivision name.
    pub name: String,
    /// Number of accidents.
    pub count: u64,
    /// Raw cluster id from the clustering step. Only meaningful within
    /// a single run.
    pub cluster: usize,
    /// Tier derived from the cluster's rank.
    pub tier: RiskTier,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr as _;

    use super::*;

    #[test]
    fn three_clusters_get_all_tiers_in_order() {
        assert_eq!(RiskTier::for_rank(0, 3), Some(RiskTier::HighRisk));
        assert_eq!(RiskTier::for_rank(1, 3), Some(RiskTier::Caution));
        assert_eq!(RiskTier::for_rank(2, 3), Some(RiskTier::Safe));
        assert_eq!(RiskTier::for_rank(3, 3), None);
    }

    #[test]
    fn two_clusters_skip_caution() {
        assert_eq!(RiskTier::for_rank(0, 2), Some(RiskTier::HighRisk));
        assert_eq!(RiskTier::for_rank(1, 2), Some(RiskTier::Safe));
    }

    #[test]
    fn single_cluster_is_high_risk() {
        assert_eq!(RiskTier::for_rank(0, 1), Some(RiskTier::HighRisk));
        assert_eq!(RiskTier::for_rank(0, 0), None);
    }

    #[test]
    fn tier_string_forms() {
        assert_eq!(RiskTier::HighRisk.to_string(), "HIGH_RISK");
        assert_eq!(RiskTier::from_str("SAFE").unwrap(), RiskTier::Safe);
        assert_eq!(RiskTier::all().len(), TIER_COUNT);
    }

    #[test]
    fn tier_colors_are_distinct_hex() {
        for tier in RiskTier::all() {
            let color = tier.color();
            assert!(color.starts_with('#') && color.len() == 7, "{tier:?}");
        }
        assert_ne!(RiskTier::HighRisk.color(), RiskTier::Safe.color());
    }
}
