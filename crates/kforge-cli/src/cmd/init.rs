use crate::output::print_json;
use anyhow::{bail, Context};
use kforge_core::generator::{generate_phases, ContentGenerator};
use kforge_core::migration::{shape, Shape};
use kforge_core::{Phase, StateStore};
use std::path::{Path, PathBuf};

/// Generator backed by a JSON file produced ahead of time by the content
/// service. The description is accepted for interface parity only.
pub struct PhasesFile {
    path: PathBuf,
}

impl PhasesFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ContentGenerator for PhasesFile {
    fn generate(
        &self,
        _description: &str,
        _context: Option<&str>,
    ) -> kforge_core::Result<serde_json::Value> {
        let data = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&data)?)
    }
}

/// Read and structurally validate a phase list from `path`.
pub fn load_phases(path: &Path, description: Option<&str>) -> anyhow::Result<Vec<Phase>> {
    generate_phases(&PhasesFile::new(path), description.unwrap_or_default(), None)
        .with_context(|| format!("failed to load phases from '{}'", path.display()))
}

pub fn run(
    store: &StateStore,
    phases_path: &Path,
    description: Option<&str>,
    force: bool,
    json: bool,
) -> anyhow::Result<()> {
    if let Some(existing) = store.load() {
        if shape(&existing) != Shape::Uninitialized && !force {
            bail!("project already initialized; use 'kforge roadmap create' or pass --force");
        }
    }
    let phases = load_phases(phases_path, description)?;
    if force {
        store.reset();
    }
    if store.is_persistent() && store.write_default_config()? {
        tracing::debug!("wrote default config.yaml");
    }
    let state = store.initialize(phases);
    let progress = state.progress();

    if json {
        print_json(&serde_json::json!({
            "initialized": state.project_initialized,
            "tasks": progress.total,
            "current_task": state.current_task(),
        }))?;
    } else {
        println!("Initialized roadmap with {} tasks", progress.total);
        if let Some(current) = state.current_task() {
            println!("First task: {}", current.task);
        }
    }
    Ok(())
}

pub fn reset(store: &StateStore, json: bool) -> anyhow::Result<()> {
    store.reset();
    if json {
        print_json(&serde_json::json!({ "reset": true }))?;
    } else {
        println!("Project state removed");
    }
    Ok(())
}
