//! Ranks clusters of accident counts into risk tiers.

use std::collections::BTreeMap;

use accident_map_accident_models::{ClassifiedSubdivision, RiskTier, SubdivisionCount, TIER_COUNT};
use serde::{Deserialize, Serialize};

use crate::{ClusterError, Clusterer, KMeans, KMeansParams, distinct_count};

/// What to do when there are fewer distinct counts than requested clusters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsufficientDataPolicy {
    /// Cluster into as many groups as there are distinct counts.
    #[default]
    ReduceK,
    /// Fail with [`ClusterError::InsufficientData`].
    Reject,
}

/// Parameters for [`classify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifyParams {
    /// Requested number of clusters.
    pub k: usize,
    /// Seed handed to the clusterer.
    pub seed: u64,
    /// Policy for small inputs.
    pub insufficient_data: InsufficientDataPolicy,
}

impl Default for ClassifyParams {
    fn default() -> Self {
        Self {
            k: TIER_COUNT,
            seed: 42,
            insufficient_data: InsufficientDataPolicy::default(),
        }
    }
}

/// The `[clustering]` section of a dashboard config.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusteringConfig {
    /// Requested number of clusters.
    pub k: usize,
    /// Random seed for centre initialization.
    pub seed: u64,
    /// Policy for inputs with fewer distinct counts than `k`.
    pub insufficient_data: InsufficientDataPolicy,
    /// k-means tuning.
    #[serde(flatten)]
    pub kmeans: KMeansParams,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        let params = ClassifyParams::default();
        Self {
            k: params.k,
            seed: params.seed,
            insufficient_data: params.insufficient_data,
            kmeans: KMeansParams::default(),
        }
    }
}

impl ClusteringConfig {
    /// Parameters for [`classify`].
    #[must_use]
    pub const fn classify_params(&self) -> ClassifyParams {
        ClassifyParams {
            k: self.k,
            seed: self.seed,
            insufficient_data: self.insufficient_data,
        }
    }

    /// The configured k-means clusterer.
    #[must_use]
    pub const fn kmeans(&self) -> KMeans {
        KMeans::new(self.kmeans)
    }
}

/// Clusters subdivision counts and assigns each subdivision a risk tier.
///
/// Clusters are ranked by mean count, highest first (ties broken by cluster
/// id). The top cluster is [`RiskTier::HighRisk`], the bottom one
/// [`RiskTier::Safe`], and any in between [`RiskTier::Caution`]. An empty
/// input classifies to an empty output.
///
/// # Errors
///
/// Returns [`ClusterError`] if `k` is zero, the policy is
/// [`InsufficientDataPolicy::Reject`] and there are fewer than `k` distinct
/// counts, or the clusterer fails or returns malformed labels.
#[allow(clippy::cast_precision_loss)]
pub fn classify(
    counts: &[SubdivisionCount],
    clusterer: &dyn Clusterer,
    params: &ClassifyParams,
) -> Result<Vec<ClassifiedSubdivision>, ClusterError> {
    if params.k == 0 {
        return Err(ClusterError::InvalidK { k: params.k });
    }
    if counts.is_empty() {
        log::warn!("No subdivisions to classify");
        return Ok(Vec::new());
    }

    let values: Vec<f64> = counts.iter().map(|c| c.count as f64).collect();
    let distinct = distinct_count(&values);

    let k = if distinct >= params.k {
        params.k
    } else {
        match params.insufficient_data {
            InsufficientDataPolicy::ReduceK => {
                log::warn!(
                    "Only {distinct} distinct accident count(s); reducing clusters from {} to {distinct}",
                    params.k
                );
                distinct
            }
            InsufficientDataPolicy::Reject => {
                return Err(ClusterError::InsufficientData {
                    required: params.k,
                    distinct,
                });
            }
        }
    };

    let labels = clusterer.cluster(&values, k, params.seed)?;
    if labels.len() != values.len() {
        return Err(ClusterError::InvalidLabels {
            message: format!("expected {} labels, got {}", values.len(), labels.len()),
        });
    }
    if let Some(bad) = labels.iter().find(|&&l| l >= k) {
        return Err(ClusterError::InvalidLabels {
            message: format!("label {bad} is out of range for {k} clusters"),
        });
    }

    let tiers = rank_clusters(counts, &labels);

    Ok(counts
        .iter()
        .zip(&labels)
        .map(|(c, &cluster)| ClassifiedSubdivision {
            name: c.name.clone(),
            count: c.count,
            cluster,
            tier: tiers[&cluster],
        })
        .collect())
}

/// Maps each populated cluster id to its tier by mean count rank.
#[allow(clippy::cast_precision_loss)]
fn rank_clusters(counts: &[SubdivisionCount], labels: &[usize]) -> BTreeMap<usize, RiskTier> {
    let mut totals: BTreeMap<usize, (u64, u64)> = BTreeMap::new();
    for (c, &l) in counts.iter().zip(labels) {
        let entry = totals.entry(l).or_default();
        entry.0 += c.count;
        entry.1 += 1;
    }

    let mut means: Vec<(usize, f64)> = totals
        .into_iter()
        .map(|(id, (sum, n))| (id, sum as f64 / n as f64))
        .collect();
    means.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

    let populated = means.len();
    means
        .iter()
        .enumerate()
        .filter_map(|(rank, &(id, mean))| {
            let tier = RiskTier::for_rank(rank, populated)?;
            log::debug!("Cluster {id}: mean {mean:.2} -> {tier}");
            Some((id, tier))
        })
        .collect()
}
