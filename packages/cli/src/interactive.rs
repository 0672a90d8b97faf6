//! Interactive dashboard session.
//!
//! Prompts for the config and input files, builds the dataset once, then
//! loops over a menu whose main entry is a multi-select of subdivision
//! names. Every selection re-renders the whole dashboard from the cached
//! dataset.

use std::path::PathBuf;
use std::sync::Arc;

use accident_map_analytics::ActiveSubset;
use accident_map_cli_utils::MultiProgress;
use accident_map_pipeline::config::{
    DEFAULT_CONFIG_ID, DashboardConfig, all_configs, load_config,
};
use accident_map_pipeline::{Dataset, PipelineCache};
use accident_map_render::terminal;
use dialoguer::{Confirm, Input, MultiSelect, Select};

/// Top-level actions in the dashboard menu.
enum DashboardAction {
    Select,
    ShowAll,
    JoinReport,
    Export,
    Reload,
    Quit,
}

impl DashboardAction {
    const ALL: &[Self] = &[
        Self::Select,
        Self::ShowAll,
        Self::JoinReport,
        Self::Export,
        Self::Reload,
        Self::Quit,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Select => "Choose subdivisions",
            Self::ShowAll => "Show all subdivisions",
            Self::JoinReport => "Show join report",
            Self::Export => "Export current view",
            Self::Reload => "Reload input files",
            Self::Quit => "Quit",
        }
    }
}

struct Session<'a> {
    multi: &'a MultiProgress,
    config: DashboardConfig,
    accidents: PathBuf,
    boundaries: PathBuf,
    cache: PipelineCache,
    dataset: Arc<Dataset>,
    subset: ActiveSubset,
}

impl Session<'_> {
    fn reload(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.dataset = crate::load_dataset(
            self.multi,
            &mut self.cache,
            &self.config,
            &self.accidents,
            &self.boundaries,
        )?;
        Ok(())
    }

    fn render(&self, output_dir: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
        println!();
        crate::render(&self.config, &self.dataset, &self.subset, output_dir)
    }
}

/// Runs the interactive dashboard.
///
/// # Errors
///
/// Returns an error if a prompt, the initial pipeline run, or rendering
/// fails. Failed reloads are reported and the previous dataset is kept.
pub fn run(multi: &MultiProgress) -> Result<(), Box<dyn std::error::Error>> {
    let config = pick_config()?;

    let accidents: String = Input::new()
        .with_prompt("Accident table (CSV)")
        .interact_text()?;
    let boundaries: String = Input::new()
        .with_prompt("Boundary dataset (GeoJSON)")
        .interact_text()?;

    let accidents = PathBuf::from(accidents.trim());
    let boundaries = PathBuf::from(boundaries.trim());
    let mut cache = PipelineCache::new();
    let dataset = crate::load_dataset(multi, &mut cache, &config, &accidents, &boundaries)?;

    let mut session = Session {
        multi,
        config,
        accidents,
        boundaries,
        cache,
        dataset,
        subset: ActiveSubset::All,
    };
    session.render(None)?;

    let labels: Vec<&str> = DashboardAction::ALL
        .iter()
        .map(DashboardAction::label)
        .collect();

    loop {
        println!();
        let idx = Select::new()
            .with_prompt("Dashboard")
            .items(&labels)
            .default(0)
            .interact()?;

        match DashboardAction::ALL[idx] {
            DashboardAction::Select => {
                session.subset = pick_subset(&session.dataset, &session.subset)?;
                session.render(None)?;
            }
            DashboardAction::ShowAll => {
                session.subset = ActiveSubset::All;
                session.render(None)?;
            }
            DashboardAction::JoinReport => {
                println!();
                let mut stdout = std::io::stdout().lock();
                terminal::write_join_report(&mut stdout, &session.dataset.report)?;
            }
            DashboardAction::Export => {
                let dir: String = Input::new()
                    .with_prompt("Output directory")
                    .default("dashboard".to_string())
                    .interact_text()?;
                session.render(Some(PathBuf::from(dir.trim())))?;
            }
            DashboardAction::Reload => {
                if let Err(e) = session.reload() {
                    log::error!("Reload failed: {e}");
                    println!("Reload failed, keeping the previous data: {e}");
                    continue;
                }
                session.render(None)?;
            }
            DashboardAction::Quit => break,
        }
    }

    Ok(())
}

/// Picks an embedded config or loads one from a TOML path.
fn pick_config() -> Result<DashboardConfig, Box<dyn std::error::Error>> {
    let configs = all_configs();
    let mut labels: Vec<String> = configs
        .iter()
        .map(|c| format!("{} ({})", c.name, c.id))
        .collect();
    labels.push("Load a TOML file...".to_string());

    let default = configs
        .iter()
        .position(|c| c.id == DEFAULT_CONFIG_ID)
        .unwrap_or(0);

    let idx = Select::new()
        .with_prompt("Config")
        .items(&labels)
        .default(default)
        .interact()?;

    if let Some(config) = configs.into_iter().nth(idx) {
        return Ok(config);
    }

    let path: String = Input::new().with_prompt("Config path").interact_text()?;
    Ok(load_config(path.trim())?)
}

/// Multi-select over the dataset's names, pre-checked with the current
/// subset. Checking nothing falls back to every subdivision.
fn pick_subset(
    dataset: &Dataset,
    current: &ActiveSubset,
) -> Result<ActiveSubset, Box<dyn std::error::Error>> {
    let names = dataset.names();
    if names.is_empty() {
        println!("No subdivisions to choose from.");
        return Ok(ActiveSubset::All);
    }

    let defaults: Vec<bool> = names
        .iter()
        .map(|name| matches!(current, ActiveSubset::Names(_)) && current.contains(name))
        .collect();

    let picked = MultiSelect::new()
        .with_prompt("Subdivisions (space to toggle, enter to confirm)")
        .items(&names)
        .defaults(&defaults)
        .max_length(20)
        .interact()?;

    if picked.is_empty() {
        let show_all = Confirm::new()
            .with_prompt("Nothing selected. Show all subdivisions?")
            .default(true)
            .interact()?;
        if !show_all {
            return Ok(current.clone());
        }
    }

    Ok(ActiveSubset::from_names(picked.into_iter().map(|i| names[i])))
}
