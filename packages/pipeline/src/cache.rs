//! In-memory memoization of pipeline runs.
//!
//! Changing the active subset in interactive mode must not re-run the
//! pipeline. [`PipelineCache`] keys each [`Dataset`] on a SHA-256
//! fingerprint of both input files and the serialized config, so only a
//! change to the data or the config triggers a new run. The cache holds a
//! bounded number of datasets and evicts the least recently used one.

use std::collections::VecDeque;
use std::sync::Arc;

use accident_map_cluster::Clusterer;
use sha2::{Digest, Sha256};

use crate::config::DashboardConfig;
use crate::progress::StageProgress;
use crate::{Dataset, PipelineError, PipelineInput};

/// Hex SHA-256 over both input files and the config.
///
/// File labels are not part of the key, so the same bytes read from a
/// different path share an entry.
///
/// # Errors
///
/// Returns [`PipelineError::Serialize`] if the config cannot be
/// serialized.
pub fn fingerprint(
    input: &PipelineInput,
    config: &DashboardConfig,
) -> Result<String, PipelineError> {
    let mut hasher = Sha256::new();
    for bytes in [&input.accidents.bytes, &input.boundaries.bytes] {
        hasher.update((bytes.len() as u64).to_le_bytes());
        hasher.update(bytes);
    }
    hasher.update(serde_json::to_vec(config)?);
    Ok(hex::encode(hasher.finalize()))
}

/// Datasets kept by [`PipelineCache::new`].
pub const DEFAULT_CAPACITY: usize = 4;

/// Pipeline results keyed by input fingerprint, least recently used first.
///
/// The key does not cover the clusterer, so one cache should only ever be
/// used with the clusterer its config describes.
#[derive(Debug)]
pub struct PipelineCache {
    entries: VecDeque<(String, Arc<Dataset>)>,
    capacity: usize,
    hits: u64,
    misses: u64,
}

impl Default for PipelineCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl PipelineCache {
    /// Creates an empty cache holding up to [`DEFAULT_CAPACITY`] datasets.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty cache holding up to `capacity` datasets (at least
    /// one).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            hits: 0,
            misses: 0,
        }
    }

    /// Returns the cached dataset for these inputs, running the pipeline on
    /// a miss.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if fingerprinting or the pipeline run
    /// fails. Failed runs are not cached.
    pub fn get_or_run(
        &mut self,
        config: &DashboardConfig,
        input: &PipelineInput,
        clusterer: &dyn Clusterer,
        progress: &Arc<dyn StageProgress>,
    ) -> Result<Arc<Dataset>, PipelineError> {
        let key = fingerprint(input, config)?;

        if let Some(pos) = self.entries.iter().position(|(k, _)| *k == key)
            && let Some(entry) = self.entries.remove(pos)
        {
            self.hits += 1;
            log::debug!("Pipeline cache hit ({})", &key[..12]);
            progress.abandon();
            let dataset = Arc::clone(&entry.1);
            self.entries.push_back(entry);
            return Ok(dataset);
        }

        self.misses += 1;
        log::debug!("Pipeline cache miss ({})", &key[..12]);
        let dataset = Arc::new(crate::run(config, input, clusterer, progress)?);

        while self.entries.len() >= self.capacity {
            if let Some((evicted, _)) = self.entries.pop_front() {
                log::debug!("Pipeline cache evicted {}", &evicted[..12]);
            }
        }
        self.entries.push_back((key, Arc::clone(&dataset)));
        Ok(dataset)
    }

    /// Number of cached datasets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of lookups served from the cache.
    #[must_use]
    pub const fn hits(&self) -> u64 {
        self.hits
    }

    /// Number of lookups that ran the pipeline.
    #[must_use]
    pub const fn misses(&self) -> u64 {
        self.misses
    }

    /// Maximum number of cached datasets.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drops every cached dataset.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use accident_map_cluster::{ClusterError, KMeans};

    use super::*;
    use crate::config::{DEFAULT_CONFIG_ID, load_config};
    use crate::InputFile;
    use crate::progress::null_progress;
    use crate::tests::{boundaries_geojson, gubeng_wonokromo_csv};

    /// Counts how often the pipeline actually clusters.
    #[derive(Default)]
    struct CountingClusterer {
        calls: Cell<usize>,
    }

    impl Clusterer for CountingClusterer {
        fn cluster(&self, values: &[f64], k: usize, seed: u64) -> Result<Vec<usize>, ClusterError> {
            self.calls.set(self.calls.get() + 1);
            KMeans::default().cluster(values, k, seed)
        }
    }

    fn input(csv: &str) -> PipelineInput {
        PipelineInput {
            accidents: InputFile::from_bytes("accidents.csv", csv),
            boundaries: InputFile::from_bytes(
                "boundaries.geojson",
                boundaries_geojson(&["Gubeng", "Wonokromo"]),
            ),
        }
    }

    #[test]
    fn same_inputs_hit_the_cache() {
        let config = load_config(DEFAULT_CONFIG_ID).unwrap();
        let clusterer = CountingClusterer::default();
        let mut cache = PipelineCache::new();

        let first = cache
            .get_or_run(&config, &input(&gubeng_wonokromo_csv()), &clusterer, &null_progress())
            .unwrap();
        let second = cache
            .get_or_run(&config, &input(&gubeng_wonokromo_csv()), &clusterer, &null_progress())
            .unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(clusterer.calls.get(), 1);
        assert_eq!((cache.hits(), cache.misses()), (1, 1));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn changed_bytes_or_config_miss() {
        let config = load_config(DEFAULT_CONFIG_ID).unwrap();
        let clusterer = CountingClusterer::default();
        let mut cache = PipelineCache::new();

        let csv = gubeng_wonokromo_csv();
        cache
            .get_or_run(&config, &input(&csv), &clusterer, &null_progress())
            .unwrap();

        let more = format!("{csv}8,\"KEC. GUBENG, KOTA SURABAYA\"\n");
        cache
            .get_or_run(&config, &input(&more), &clusterer, &null_progress())
            .unwrap();

        let mut reseeded = config.clone();
        reseeded.clustering.seed = 1;
        cache
            .get_or_run(&reseeded, &input(&csv), &clusterer, &null_progress())
            .unwrap();

        assert_eq!(clusterer.calls.get(), 3);
        assert_eq!(cache.misses(), 3);
        assert_eq!(cache.len(), 3);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn evicts_least_recently_used() {
        let config = load_config(DEFAULT_CONFIG_ID).unwrap();
        let clusterer = CountingClusterer::default();
        let mut cache = PipelineCache::with_capacity(2);

        let csv = gubeng_wonokromo_csv();
        let a = input(&csv);
        let b = input(&format!("{csv}8,2024-01-08,\"KEC. GUBENG, KOTA SURABAYA\"\n"));
        let c = input(&format!("{csv}8,2024-01-08,\"KEC. WONOKROMO, KOTA SURABAYA\"\n"));

        for step in [&a, &b, &a, &c] {
            cache
                .get_or_run(&config, step, &clusterer, &null_progress())
                .unwrap();
        }
        assert_eq!(cache.len(), 2);
        assert_eq!(clusterer.calls.get(), 3);

        // `a` was used after `b`, so `b` went first.
        cache
            .get_or_run(&config, &a, &clusterer, &null_progress())
            .unwrap();
        assert_eq!(clusterer.calls.get(), 3);
        cache
            .get_or_run(&config, &b, &clusterer, &null_progress())
            .unwrap();
        assert_eq!(clusterer.calls.get(), 4);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn capacity_is_at_least_one() {
        assert_eq!(PipelineCache::with_capacity(0).capacity(), 1);
        assert_eq!(PipelineCache::new().capacity(), DEFAULT_CAPACITY);
    }

    #[test]
    fn fingerprint_ignores_file_labels() {
        let config = load_config(DEFAULT_CONFIG_ID).unwrap();
        let a = input(&gubeng_wonokromo_csv());
        let mut b = input(&gubeng_wonokromo_csv());
        b.accidents.label = "elsewhere.csv".to_string();

        let fa = fingerprint(&a, &config).unwrap();
        assert_eq!(fa, fingerprint(&b, &config).unwrap());
        assert_eq!(fa.len(), 64);
    }

    #[test]
    fn failed_runs_are_not_cached() {
        let config = load_config(DEFAULT_CONFIG_ID).unwrap();
        let mut cache = PipelineCache::new();
        let result = cache.get_or_run(
            &config,
            &input("No,Place\n1,Gubeng\n"),
            &KMeans::default(),
            &null_progress(),
        );
        assert!(result.is_err());
        assert!(cache.is_empty());
    }
}
