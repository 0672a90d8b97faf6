//! Lloyd's k-means over a single axis.
//!
//! Each restart seeds its centres with k-means++ and iterates
//! assignment/update steps until the assignment is stable, the centres
//! stop moving, or the iteration cap is hit. All restarts share one
//! [`StdRng`] seeded from the caller's seed, so a fit is fully
//! reproducible. The restart with the lowest inertia wins.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::{ClusterError, Clusterer, distinct_count};

/// Tuning knobs for [`KMeans`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KMeansParams {
    /// Number of independent restarts (at least 1).
    pub n_init: usize,
    /// Iteration cap per restart.
    pub max_iter: usize,
    /// Convergence threshold on the squared centre shift, relative to the
    /// variance of the data.
    pub tolerance: f64,
}

impl Default for KMeansParams {
    fn default() -> Self {
        Self {
            n_init: 10,
            max_iter: 300,
            tolerance: 1e-4,
        }
    }
}

/// Result of a k-means fit.
#[derive(Debug, Clone, PartialEq)]
pub struct Clustering {
    /// Cluster id of each input value.
    pub labels: Vec<usize>,
    /// Final centre of each cluster.
    pub centers: Vec<f64>,
    /// Sum of squared distances from each value to its centre.
    pub inertia: f64,
    /// Iterations used by the winning restart.
    pub iterations: usize,
}

/// Seeded 1-D k-means.
#[derive(Debug, Clone, Default)]
pub struct KMeans {
    params: KMeansParams,
}

impl KMeans {
    /// Creates a k-means clusterer with the given parameters.
    #[must_use]
    pub const fn new(params: KMeansParams) -> Self {
        Self { params }
    }

    /// Returns the parameters.
    #[must_use]
    pub const fn params(&self) -> &KMeansParams {
        &self.params
    }

    /// Fits `k` clusters to `values`.
    ///
    /// # Errors
    ///
    /// Returns [`ClusterError`] if `values` is empty, contains a non-finite
    /// value, `k` is zero, or there are fewer than `k` distinct values.
    pub fn fit(&self, values: &[f64], k: usize, seed: u64) -> Result<Clustering, ClusterError> {
        if values.is_empty() {
            return Err(ClusterError::Empty);
        }
        if k == 0 {
            return Err(ClusterError::InvalidK { k });
        }
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(ClusterError::NonFinite { index });
        }
        let distinct = distinct_count(values);
        if distinct < k {
            return Err(ClusterError::InsufficientData {
                required: k,
                distinct,
            });
        }

        let tolerance = self.params.tolerance * variance(values);
        let mut rng = StdRng::seed_from_u64(seed);
        let mut best: Option<Clustering> = None;

        for run in 0..self.params.n_init.max(1) {
            let centers = kmeans_plus_plus(values, k, &mut rng);
            let result = lloyd(values, centers, self.params.max_iter, tolerance);

            log::trace!(
                "k-means run {run}: inertia={:.4} after {} iterations",
                result.inertia,
                result.iterations
            );

            if best.as_ref().is_none_or(|b| result.inertia < b.inertia) {
                best = Some(result);
            }
        }

        best.ok_or(ClusterError::Empty)
    }
}

impl Clusterer for KMeans {
    fn cluster(&self, values: &[f64], k: usize, seed: u64) -> Result<Vec<usize>, ClusterError> {
        self.fit(values, k, seed).map(|c| c.labels)
    }
}

/// Population variance.
#[allow(clippy::cast_precision_loss)]
fn variance(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n
}

/// Picks `k` initial centres: the first uniformly, each following one with
/// probability proportional to its squared distance from the nearest
/// centre chosen so far.
fn kmeans_plus_plus(values: &[f64], k: usize, rng: &mut StdRng) -> Vec<f64> {
    let mut centers = Vec::with_capacity(k);
    let first = values[rng.gen_range(0..values.len())];
    centers.push(first);

    let mut dist: Vec<f64> = values.iter().map(|v| (v - first).powi(2)).collect();

    while centers.len() < k {
        let total: f64 = dist.iter().sum();

        let idx = if total > 0.0 {
            let target = rng.gen_range(0.0..total);
            let mut acc = 0.0;
            let mut chosen = dist.iter().rposition(|&d| d > 0.0).unwrap_or(0);
            for (i, &d) in dist.iter().enumerate() {
                acc += d;
                if acc > target {
                    chosen = i;
                    break;
                }
            }
            chosen
        } else {
            rng.gen_range(0..values.len())
        };

        let center = values[idx];
        centers.push(center);
        for (d, v) in dist.iter_mut().zip(values) {
            *d = d.min((v - center).powi(2));
        }
    }

    centers
}

/// Runs Lloyd iterations from the given starting centres.
fn lloyd(values: &[f64], mut centers: Vec<f64>, max_iter: usize, tolerance: f64) -> Clustering {
    let mut labels = assign(values, &centers);
    let mut iterations = 0;

    for _ in 0..max_iter {
        iterations += 1;

        let next = update(values, &labels, &centers);
        let shift: f64 = centers
            .iter()
            .zip(&next)
            .map(|(a, b)| (a - b).powi(2))
            .sum();
        centers = next;

        let next_labels = assign(values, &centers);
        let stable = next_labels == labels;
        labels = next_labels;

        if stable || shift <= tolerance {
            break;
        }
    }

    let inertia = values
        .iter()
        .zip(&labels)
        .map(|(v, &l)| (v - centers[l]).powi(2))
        .sum();

    Clustering {
        labels,
        centers,
        inertia,
        iterations,
    }
}

/// Assigns each value to its nearest centre. Ties go to the lowest index.
fn assign(values: &[f64], centers: &[f64]) -> Vec<usize> {
    values
        .iter()
        .map(|v| {
            let mut best = 0;
            let mut best_dist = f64::INFINITY;
            for (j, c) in centers.iter().enumerate() {
                let d = (v - c).abs();
                if d < best_dist {
                    best_dist = d;
                    best = j;
                }
            }
            best
        })
        .collect()
}

/// Moves each centre to the mean of its members. A cluster that lost all
/// its members is re-seeded at the value farthest from its current centre.
#[allow(clippy::cast_precision_loss)]
fn update(values: &[f64], labels: &[usize], centers: &[f64]) -> Vec<f64> {
    let k = centers.len();
    let mut sums = vec![0.0; k];
    let mut counts = vec![0usize; k];
    for (v, &l) in values.iter().zip(labels) {
        sums[l] += v;
        counts[l] += 1;
    }

    let mut next: Vec<f64> = (0..k)
        .map(|j| {
            if counts[j] > 0 {
                sums[j] / counts[j] as f64
            } else {
                centers[j]
            }
        })
        .collect();

    if counts.contains(&0) {
        let mut far: Vec<usize> = (0..values.len()).collect();
        far.sort_by(|&a, &b| {
            let da = (values[a] - centers[labels[a]]).abs();
            let db = (values[b] - centers[labels[b]]).abs();
            db.total_cmp(&da)
        });
        let mut far = far.into_iter();
        for j in (0..k).filter(|&j| counts[j] == 0) {
            if let Some(i) = far.next() {
                log::debug!("Re-seeding empty cluster {j} at {}", values[i]);
                next[j] = values[i];
            }
        }
    }

    next
}

#[cfg(test)]
mod tests {
    use super::*;

    fn groups_of(result: &Clustering, values: &[f64]) -> Vec<Vec<f64>> {
        let mut groups = vec![Vec::new(); result.centers.len()];
        for (v, &l) in values.iter().zip(&result.labels) {
            groups[l].push(*v);
        }
        for g in &mut groups {
            g.sort_by(f64::total_cmp);
        }
        groups.sort_by(|a, b| a[0].total_cmp(&b[0]));
        groups
    }

    #[test]
    fn separates_well_separated_groups() {
        let values = [1.0, 2.0, 3.0, 50.0, 52.0, 51.0, 200.0, 210.0];
        let result = KMeans::default().fit(&values, 3, 42).unwrap();
        assert_eq!(
            groups_of(&result, &values),
            vec![
                vec![1.0, 2.0, 3.0],
                vec![50.0, 51.0, 52.0],
                vec![200.0, 210.0],
            ]
        );
    }

    #[test]
    fn is_reproducible_for_a_seed() {
        let values = [3.0, 9.0, 14.0, 15.0, 22.0, 40.0, 41.0, 7.0, 60.0, 33.0];
        let a = KMeans::default().fit(&values, 3, 7).unwrap();
        let b = KMeans::default().fit(&values, 3, 7).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn every_label_is_in_range_and_used() {
        let values = [1.0, 1.0, 4.0, 9.0, 9.0, 12.0, 30.0];
        let result = KMeans::default().fit(&values, 3, 42).unwrap();
        assert_eq!(result.labels.len(), values.len());
        for j in 0..3 {
            assert!(result.labels.contains(&j), "cluster {j} is empty");
        }
    }

    #[test]
    fn centres_are_group_means() {
        let values = [2.0, 5.0];
        let result = KMeans::default().fit(&values, 2, 42).unwrap();
        let mut centers = result.centers.clone();
        centers.sort_by(f64::total_cmp);
        assert_eq!(centers, vec![2.0, 5.0]);
        assert!(result.inertia.abs() < f64::EPSILON);
    }

    #[test]
    fn restarts_never_increase_inertia() {
        let values = [1.0, 2.0, 10.0, 11.0, 12.0, 25.0, 26.0, 40.0];
        let single = KMeans::new(KMeansParams {
            n_init: 1,
            ..KMeansParams::default()
        })
        .fit(&values, 3, 42)
        .unwrap();
        let many = KMeans::default().fit(&values, 3, 42).unwrap();
        assert!(many.inertia <= single.inertia);
    }

    #[test]
    fn rejects_bad_input() {
        let km = KMeans::default();
        assert!(matches!(km.fit(&[], 3, 0), Err(ClusterError::Empty)));
        assert!(matches!(
            km.fit(&[1.0, 2.0], 0, 0),
            Err(ClusterError::InvalidK { k: 0 })
        ));
        assert!(matches!(
            km.fit(&[1.0, f64::NAN], 1, 0),
            Err(ClusterError::NonFinite { index: 1 })
        ));
        assert!(matches!(
            km.fit(&[5.0, 5.0, 2.0], 3, 0),
            Err(ClusterError::InsufficientData {
                required: 3,
                distinct: 2
            })
        ));
    }

    #[test]
    fn single_cluster_takes_everything() {
        let values = [4.0, 4.0, 4.0];
        let result = KMeans::default().fit(&values, 1, 42).unwrap();
        assert_eq!(result.labels, vec![0, 0, 0]);
        assert!((result.centers[0] - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn update_reseeds_empty_cluster_at_farthest_value() {
        let values = [0.0, 1.0, 10.0];
        let labels = [0, 0, 0];
        let centers = [1.0, 100.0];
        let next = update(&values, &labels, &centers);
        assert!((next[0] - 11.0 / 3.0).abs() < 1e-12);
        assert!((next[1] - 10.0).abs() < f64::EPSILON);
    }
}
