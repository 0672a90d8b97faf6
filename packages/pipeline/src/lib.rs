#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Accident dashboard pipeline.
//!
//! [`run`] chains the stages over two in-memory input files:
//!
//! 1. Parse the accident table
//! 2. Normalize locations and count accidents per subdivision
//! 3. Cluster the counts and assign risk tiers
//! 4. Parse the boundary dataset
//! 5. Join tiers onto boundaries and derive centroids
//!
//! Every stage is a pure function of the previous stage's output. The
//! resulting [`Dataset`] is what all dashboard views filter and render.

pub mod cache;
pub mod config;
pub mod progress;

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use accident_map_accident_models::SubdivisionCount;
use accident_map_cluster::{ClusterError, Clusterer, classify};
use accident_map_geography::{
    GeographyError, JoinOutcome, JoinedSubdivision, join_classified, parse_boundaries,
};
use accident_map_geography_models::{JoinReport, SubdivisionRow};
use accident_map_normalize::NormalizeError;
use accident_map_source::SourceError;
use accident_map_source::aggregate::aggregate_records;
use accident_map_source::csv_table::parse_accidents;
use thiserror::Error;

use crate::config::{ConfigError, DashboardConfig};
use crate::progress::StageProgress;

pub use cache::PipelineCache;

/// Number of stages reported by [`run`].
const STAGE_COUNT: u64 = 5;

/// Errors that can occur during a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// An input file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// Path that was read.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The accident table could not be parsed.
    #[error("Accident table {path}: {source}")]
    Accidents {
        /// Label of the accident file.
        path: String,
        /// Underlying error.
        source: SourceError,
    },

    /// The boundary dataset could not be parsed.
    #[error("Boundary dataset {path}: {source}")]
    Boundaries {
        /// Label of the boundary file.
        path: String,
        /// Underlying error.
        source: GeographyError,
    },

    /// Config loading failed.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// The location correction table is unusable.
    #[error("Normalizer error: {0}")]
    Normalize(#[from] NormalizeError),

    /// Clustering failed.
    #[error("Clustering error: {0}")]
    Cluster(#[from] ClusterError),

    /// The config could not be serialized for fingerprinting.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// One input file held fully in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    /// Path or other label used in error messages.
    pub label: String,
    /// Raw file contents.
    pub bytes: Vec<u8>,
}

impl InputFile {
    /// Reads a whole file into memory. The handle is closed before this
    /// returns.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Io`] if the file cannot be read.
    pub fn read(path: &Path) -> Result<Self, PipelineError> {
        let bytes = std::fs::read(path).map_err(|source| PipelineError::Io {
            path: path.display().to_string(),
            source,
        })?;
        log::debug!("Read {} bytes from {}", bytes.len(), path.display());
        Ok(Self {
            label: path.display().to_string(),
            bytes,
        })
    }

    /// Wraps bytes that did not come from a file.
    #[must_use]
    pub fn from_bytes(label: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            label: label.into(),
            bytes: bytes.into(),
        }
    }
}

/// The two files a pipeline run consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineInput {
    /// Accident table (CSV).
    pub accidents: InputFile,
    /// Boundary dataset (`GeoJSON`).
    pub boundaries: InputFile,
}

impl PipelineInput {
    /// Reads both input files.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Io`] if either file cannot be read.
    pub fn read(accidents: &Path, boundaries: &Path) -> Result<Self, PipelineError> {
        Ok(Self {
            accidents: InputFile::read(accidents)?,
            boundaries: InputFile::read(boundaries)?,
        })
    }
}

/// Result of a pipeline run, before any subset filtering.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Id of the config that produced this dataset.
    pub config_id: String,
    /// Number of accident records read.
    pub records: usize,
    /// Per-subdivision counts before the join.
    pub counts: Vec<SubdivisionCount>,
    /// Joined subdivisions in boundary-file order.
    pub subdivisions: Vec<JoinedSubdivision>,
    /// Names that fell out of the join.
    pub report: JoinReport,
}

impl Dataset {
    /// Iterates the joined rows.
    pub fn rows(&self) -> impl Iterator<Item = &SubdivisionRow> {
        self.subdivisions.iter().map(|s| &s.row)
    }

    /// Names of every joined subdivision, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.rows().map(|r| r.name.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Total accidents across joined subdivisions.
    #[must_use]
    pub fn total_accidents(&self) -> u64 {
        self.rows().map(|r| r.count).sum()
    }
}

/// Runs every stage over the given input.
///
/// # Errors
///
/// Returns [`PipelineError`] if either file is malformed, the config's
/// corrections are unstable, or clustering fails.
pub fn run(
    config: &DashboardConfig,
    input: &PipelineInput,
    clusterer: &dyn Clusterer,
    progress: &Arc<dyn StageProgress>,
) -> Result<Dataset, PipelineError> {
    let start = Instant::now();
    progress.begin(STAGE_COUNT);

    let result = run_stages(config, input, clusterer, &**progress);

    match &result {
        Ok(dataset) => {
            progress.complete(&format!("{} subdivisions ready", dataset.subdivisions.len()));
            log::info!(
                "Pipeline '{}' finished in {:.2}s: {} records, {} subdivisions on the map",
                config.id,
                start.elapsed().as_secs_f64(),
                dataset.records,
                dataset.subdivisions.len()
            );
        }
        Err(e) => {
            progress.abandon();
            log::error!("Pipeline '{}' failed: {e}", config.id);
        }
    }

    result
}

fn stage<T>(
    progress: &dyn StageProgress,
    name: &str,
    f: impl FnOnce() -> Result<T, PipelineError>,
) -> Result<T, PipelineError> {
    progress.stage(name);
    let value = f()?;
    progress.stage_done();
    Ok(value)
}

fn run_stages(
    config: &DashboardConfig,
    input: &PipelineInput,
    clusterer: &dyn Clusterer,
    progress: &dyn StageProgress,
) -> Result<Dataset, PipelineError> {
    let records = stage(progress, "Reading accident table", || {
        parse_accidents(&input.accidents.bytes, &config.accidents).map_err(|source| {
            PipelineError::Accidents {
                path: input.accidents.label.clone(),
                source,
            }
        })
    })?;

    let counts = stage(progress, "Counting accidents per subdivision", || {
        let normalizer = config.normalizer()?;
        Ok(aggregate_records(&records, &normalizer))
    })?;

    let classified = stage(progress, "Clustering risk tiers", || {
        Ok(classify(
            &counts,
            clusterer,
            &config.clustering.classify_params(),
        )?)
    })?;

    let boundaries = stage(progress, "Reading boundaries", || {
        parse_boundaries(&input.boundaries.bytes, &config.boundaries).map_err(|source| {
            PipelineError::Boundaries {
                path: input.boundaries.label.clone(),
                source,
            }
        })
    })?;

    let JoinOutcome {
        subdivisions,
        report,
    } = stage(progress, "Joining boundaries", || {
        Ok(join_classified(&boundaries, &classified))
    })?;

    Ok(Dataset {
        config_id: config.id.clone(),
        records: records.len(),
        counts,
        subdivisions,
        report,
    })
}
