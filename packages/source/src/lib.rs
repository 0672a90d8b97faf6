#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Accident table loading and per-subdivision aggregation.
//!
//! [`csv_table`] parses the raw accident table into [`AccidentRecord`]s and
//! [`aggregate`] turns normalized locations into per-subdivision counts.
//!
//! [`AccidentRecord`]: accident_map_accident_models::AccidentRecord

pub mod aggregate;
pub mod csv_table;

/// Errors that can occur while loading the accident table.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// CSV parsing failed.
    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    /// The configured location column is not in the header row.
    #[error("Missing column '{column}' (found: {found})")]
    MissingColumn {
        /// Column that was expected.
        column: String,
        /// Comma-separated list of the columns actually present.
        found: String,
    },

    /// The table configuration is unusable.
    #[error("Invalid accident table config: {message}")]
    Config {
        /// Description of what went wrong.
        message: String,
    },
}
