#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Accident dashboard presentation.
//!
//! [`render_dashboard`] filters the joined rows to the active subset and
//! renders every view from that one subset: headline metrics and tier
//! blocks plus the detail table on the terminal, and optionally the table,
//! choropleth, and summary as files. A failing map export is reported and
//! skipped; it never takes the other views down with it.

pub mod color;
pub mod export;
pub mod terminal;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use accident_map_analytics::{ActiveSubset, filter, summarize};
use accident_map_analytics_models::DashboardSummary;
use accident_map_geography::JoinedSubdivision;
use accident_map_geography_models::{JoinReport, SubdivisionRow};
use chrono::Utc;
use console::style;
use thiserror::Error;

use crate::export::{MAP_FILE, SUMMARY_FILE, SummaryExport, TABLE_FILE};

/// Errors that can occur while rendering.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Writing to the terminal or an export file failed.
    #[error("Failed to write {path}: {source}")]
    Io {
        /// Destination being written.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Writing or flushing an export stream failed.
    #[error("Export write failed: {0}")]
    Write(#[from] std::io::Error),

    /// CSV export failed.
    #[error("CSV export error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization failed.
    #[error("JSON export error: {0}")]
    Json(#[from] serde_json::Error),

    /// The choropleth could not be built.
    #[error("Map rendering failed: {message}")]
    Map {
        /// Description of what went wrong.
        message: String,
    },
}

/// What to render besides the terminal dashboard.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Heading printed above the metrics.
    pub title: String,
    /// Config id recorded in the summary export.
    pub config_id: String,
    /// Directory for file exports. `None` renders to the terminal only.
    pub output_dir: Option<PathBuf>,
}

/// What a render produced.
#[derive(Debug, Clone)]
pub struct RenderOutcome {
    /// Summary of the active subset.
    pub summary: DashboardSummary,
    /// Export files written, in write order.
    pub written: Vec<PathBuf>,
    /// Problems that were reported but did not stop the render.
    pub warnings: Vec<String>,
}

/// Renders the dashboard for the active subset.
///
/// # Errors
///
/// Returns [`RenderError`] if writing to `out`, the table export, or the
/// summary export fails. Choropleth failures are logged, printed, and
/// listed in [`RenderOutcome::warnings`] instead.
pub fn render_dashboard<W: Write>(
    out: &mut W,
    subdivisions: &[JoinedSubdivision],
    report: &JoinReport,
    subset: &ActiveSubset,
    options: &RenderOptions,
) -> Result<RenderOutcome, RenderError> {
    let selected = filter(subdivisions, subset);
    let rows: Vec<&SubdivisionRow> = selected.iter().map(|s| &s.row).collect();
    let summary = summarize(&selected, &ActiveSubset::All);

    let terminal_err = |source: std::io::Error| RenderError::Io {
        path: "terminal".to_string(),
        source,
    };

    if !options.title.is_empty() {
        writeln!(out, "{}", style(&options.title).bold().underlined()).map_err(terminal_err)?;
        writeln!(out).map_err(terminal_err)?;
    }
    terminal::write_summary(out, &summary).map_err(terminal_err)?;
    writeln!(out).map_err(terminal_err)?;
    terminal::write_table(out, &rows).map_err(terminal_err)?;

    let mut outcome = RenderOutcome {
        summary,
        written: Vec::new(),
        warnings: Vec::new(),
    };

    let Some(dir) = &options.output_dir else {
        return Ok(outcome);
    };

    std::fs::create_dir_all(dir).map_err(|source| RenderError::Io {
        path: dir.display().to_string(),
        source,
    })?;

    let table_path = dir.join(TABLE_FILE);
    export::write_table_csv(create(&table_path)?, &rows)?;
    outcome.written.push(table_path);

    let map_path = dir.join(MAP_FILE);
    match create(&map_path).and_then(|f| export::write_choropleth(f, &selected)) {
        Ok(()) => outcome.written.push(map_path),
        Err(e) => {
            log::error!("Choropleth export failed: {e}");
            writeln!(out, "{}", style(format!("Map unavailable: {e}")).red())
                .map_err(terminal_err)?;
            std::fs::remove_file(&map_path).ok();
            outcome.warnings.push(e.to_string());
        }
    }

    let summary_path = dir.join(SUMMARY_FILE);
    let export = SummaryExport {
        generated_at: Utc::now(),
        config_id: &options.config_id,
        subset,
        summary: &outcome.summary,
        join_report: report,
    };
    export::write_summary_json(create(&summary_path)?, &export)?;
    outcome.written.push(summary_path);

    for path in &outcome.written {
        log::info!("Wrote {}", path.display());
    }

    Ok(outcome)
}

fn create(path: &Path) -> Result<BufWriter<File>, RenderError> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|source| RenderError::Io {
            path: path.display().to_string(),
            source,
        })
}
