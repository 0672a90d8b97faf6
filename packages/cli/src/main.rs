#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Traffic accident risk dashboard.
//!
//! ```text
//! accident_map run --accidents laka.csv --boundaries kecamatan.geojson \
//!     [--config surabaya] [--select Gubeng,Wonokromo] [--output-dir out]
//! accident_map subdivisions --accidents laka.csv --boundaries kecamatan.geojson
//! accident_map configs
//! ```
//!
//! Running with no subcommand enters interactive mode.
//!
//! Uses `indicatif-log-bridge` (via [`accident_map_cli_utils::init_logger`])
//! so log lines and progress bars never fight for the terminal.

mod interactive;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use accident_map_analytics::ActiveSubset;
use accident_map_cli_utils::{IndicatifProgress, MultiProgress};
use accident_map_pipeline::config::{
    DEFAULT_CONFIG_ID, DashboardConfig, all_configs, load_config,
};
use accident_map_pipeline::{Dataset, PipelineCache, PipelineError, PipelineInput};
use accident_map_render::{RenderOptions, render_dashboard, terminal};
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "accident_map", about = "Traffic accident risk dashboard")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct InputArgs {
    /// Accident table (CSV with a header row)
    #[arg(long)]
    accidents: PathBuf,
    /// Boundary dataset (`GeoJSON` `FeatureCollection`)
    #[arg(long)]
    boundaries: PathBuf,
    /// Embedded config id or path to a TOML config
    #[arg(long, default_value = DEFAULT_CONFIG_ID)]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the dashboard and render it
    Run {
        #[command(flatten)]
        input: InputArgs,
        /// Comma-separated subdivision names to show (default: all)
        #[arg(long, value_delimiter = ',')]
        select: Vec<String>,
        /// Directory for the CSV, `GeoJSON`, and summary exports
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// List joined subdivisions and names that did not join
    Subdivisions {
        #[command(flatten)]
        input: InputArgs,
    },
    /// List embedded configs
    Configs,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = accident_map_cli_utils::init_logger();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        return interactive::run(&multi);
    };

    match command {
        Commands::Run {
            input,
            select,
            output_dir,
        } => {
            let config = load_config(&input.config)?;
            let mut cache = PipelineCache::new();
            let dataset = load_dataset(
                &multi,
                &mut cache,
                &config,
                &input.accidents,
                &input.boundaries,
            )?;

            let subset = ActiveSubset::from_names(
                select.iter().map(|s| s.trim()).filter(|s| !s.is_empty()),
            );
            render(&config, &dataset, &subset, output_dir)?;
        }
        Commands::Subdivisions { input } => {
            let config = load_config(&input.config)?;
            let mut cache = PipelineCache::new();
            let dataset = load_dataset(
                &multi,
                &mut cache,
                &config,
                &input.accidents,
                &input.boundaries,
            )?;

            let mut stdout = std::io::stdout().lock();
            let rows: Vec<_> = dataset.rows().collect();
            terminal::write_table(&mut stdout, &rows)?;
            println!();
            terminal::write_join_report(&mut stdout, &dataset.report)?;
        }
        Commands::Configs => {
            let configs = all_configs();
            println!("{:<16} NAME", "ID");
            println!("{}", "-".repeat(60));
            for config in &configs {
                println!("{:<16} {}", config.id, config.name);
            }
            println!("\n{} config(s)", configs.len());
        }
    }

    Ok(())
}

/// Reads both input files and builds (or reuses) the dataset.
pub(crate) fn load_dataset(
    multi: &MultiProgress,
    cache: &mut PipelineCache,
    config: &DashboardConfig,
    accidents: &Path,
    boundaries: &Path,
) -> Result<Arc<Dataset>, PipelineError> {
    let input = PipelineInput::read(accidents, boundaries)?;
    let progress = IndicatifProgress::stages_bar(multi, "Building dashboard");
    let dataset = cache.get_or_run(config, &input, &config.clustering.kmeans(), &progress)?;

    log::debug!(
        "Dataset '{}': {} record(s), {} subdivision(s)",
        dataset.config_id,
        dataset.records,
        dataset.subdivisions.len()
    );

    Ok(dataset)
}

/// Renders the dashboard for `subset` to stdout.
pub(crate) fn render(
    config: &DashboardConfig,
    dataset: &Dataset,
    subset: &ActiveSubset,
    output_dir: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = RenderOptions {
        title: config.name.clone(),
        config_id: config.id.clone(),
        output_dir,
    };

    let mut stdout = std::io::stdout().lock();
    let outcome = render_dashboard(
        &mut stdout,
        &dataset.subdivisions,
        &dataset.report,
        subset,
        &options,
    )?;

    for path in &outcome.written {
        println!("Wrote {}", path.display());
    }

    Ok(())
}
