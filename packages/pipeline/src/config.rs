//! Dashboard configurations.
//!
//! A [`DashboardConfig`] describes one city's datasets: which CSV column
//! holds the accident location, how that location is formatted, which
//! `GeoJSON` property names a boundary, and how counts are clustered.
//!
//! Configs shipped with the tool live in `packages/pipeline/configs/` and
//! are baked into the binary with [`include_str!`]. Any other TOML file can
//! be loaded by path.

use std::path::Path;

use accident_map_cluster::ClusteringConfig;
use accident_map_geography::BoundaryConfig;
use accident_map_normalize::{LocationFormat, NormalizeError, Normalizer};
use accident_map_source::csv_table::AccidentTableConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Id of the config used when none is given.
pub const DEFAULT_CONFIG_ID: &str = "surabaya";

/// TOML configs embedded at compile time.
const CONFIG_TOMLS: &[(&str, &str)] = &[("surabaya", include_str!("../configs/surabaya.toml"))];

/// Total number of embedded configs (used in tests).
#[cfg(test)]
const EXPECTED_CONFIG_COUNT: usize = 1;

/// Errors that can occur while loading a config.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The TOML is malformed or does not match the config layout.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A config file could not be read.
    #[error("Failed to read config {path}: {source}")]
    Io {
        /// Path that was read.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The id matches no embedded config and no file on disk.
    #[error("Unknown config '{id}' (embedded configs: {known})")]
    Unknown {
        /// Requested id or path.
        id: String,
        /// Comma-separated embedded config ids.
        known: String,
    },
}

/// Everything the pipeline needs to know about one pair of datasets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Registry id (e.g. `"surabaya"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Optional longer description.
    #[serde(default)]
    pub description: Option<String>,
    /// Accident table layout.
    pub accidents: AccidentTableConfig,
    /// Boundary dataset layout.
    pub boundaries: BoundaryConfig,
    /// Location string format and spelling corrections.
    pub location: LocationFormat,
    /// Clustering parameters.
    #[serde(default)]
    pub clustering: ClusteringConfig,
}

impl DashboardConfig {
    /// Builds the normalizer for this config's location format.
    ///
    /// # Errors
    ///
    /// Returns [`NormalizeError`] if the correction table is unstable.
    pub fn normalizer(&self) -> Result<Normalizer, NormalizeError> {
        Normalizer::new(self.location.clone())
    }
}

/// Parses a config from a TOML string.
///
/// # Errors
///
/// Returns [`ConfigError::Toml`] if the TOML is malformed or incomplete.
pub fn parse_config(toml_str: &str) -> Result<DashboardConfig, ConfigError> {
    Ok(toml::from_str(toml_str)?)
}

/// Returns all embedded configs.
///
/// # Panics
///
/// Panics if an embedded TOML config is malformed. The configs are baked
/// in at compile time, so this is caught by the registry tests.
#[must_use]
pub fn all_configs() -> Vec<DashboardConfig> {
    CONFIG_TOMLS
        .iter()
        .map(|(name, toml)| {
            parse_config(toml).unwrap_or_else(|e| panic!("Failed to parse {name}.toml: {e}"))
        })
        .collect()
}

/// Loads a config by embedded id, falling back to a TOML file path.
///
/// # Errors
///
/// Returns [`ConfigError`] if the id is unknown and is not a readable,
/// valid TOML file.
pub fn load_config(id_or_path: &str) -> Result<DashboardConfig, ConfigError> {
    if let Some(config) = all_configs().into_iter().find(|c| c.id == id_or_path) {
        log::debug!("Using embedded config '{id_or_path}'");
        return Ok(config);
    }

    let path = Path::new(id_or_path);
    if !path.is_file() {
        return Err(ConfigError::Unknown {
            id: id_or_path.to_string(),
            known: CONFIG_TOMLS
                .iter()
                .map(|(id, _)| *id)
                .collect::<Vec<_>>()
                .join(", "),
        });
    }

    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let config = parse_config(&text)?;
    log::info!("Loaded config '{}' from {}", config.id, path.display());
    Ok(config)
}
