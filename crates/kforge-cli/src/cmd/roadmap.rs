use crate::cmd::init::load_phases;
use crate::output::{print_json, print_table};
use anyhow::bail;
use clap::Subcommand;
use kforge_core::progress::progress_of;
use kforge_core::StateStore;
use std::path::{Path, PathBuf};

#[derive(Subcommand)]
pub enum RoadmapSubcommand {
    /// List roadmaps in this project
    List,
    /// Create a roadmap from a JSON phase file and make it active
    Create {
        #[arg(required = true)]
        title: Vec<String>,
        #[arg(long)]
        phases: PathBuf,
    },
    /// Rename a roadmap
    Rename {
        id: String,
        #[arg(required = true)]
        title: Vec<String>,
    },
    /// Start a fresh attempt at a roadmap's curriculum
    Clone {
        id: String,
        #[arg(long)]
        title: Option<String>,
    },
    /// Delete a roadmap
    Delete { id: String },
    /// Make a roadmap active
    Use { id: String },
    /// Append phases from a JSON phase file
    Append {
        id: String,
        #[arg(long)]
        phases: PathBuf,
    },
}

pub fn run(store: &StateStore, subcmd: RoadmapSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        RoadmapSubcommand::List => list(store, json),
        RoadmapSubcommand::Create { title, phases } => {
            create(store, &title.join(" "), &phases, json)
        }
        RoadmapSubcommand::Rename { id, title } => rename(store, &id, &title.join(" "), json),
        RoadmapSubcommand::Clone { id, title } => clone(store, &id, title.as_deref(), json),
        RoadmapSubcommand::Delete { id } => delete(store, &id, json),
        RoadmapSubcommand::Use { id } => activate(store, &id, json),
        RoadmapSubcommand::Append { id, phases } => append(store, &id, &phases, json),
    }
}

fn list(store: &StateStore, json: bool) -> anyhow::Result<()> {
    let roadmaps = store.list_roadmaps();
    let active_id = store.active_roadmap().map(|r| r.id);

    if json {
        let items: Vec<serde_json::Value> = roadmaps
            .iter()
            .map(|r| {
                let p = progress_of(&r.tasks);
                serde_json::json!({
                    "id": r.id,
                    "title": r.title,
                    "active": active_id.as_deref() == Some(r.id.as_str()),
                    "completed": p.completed,
                    "total": p.total,
                    "percentage": p.percentage,
                    "xp": r.total_xp,
                })
            })
            .collect();
        return print_json(&items);
    }

    if roadmaps.is_empty() {
        println!("No roadmaps. Run: kforge roadmap create <title> --phases <file>");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = roadmaps
        .iter()
        .map(|r| {
            let p = progress_of(&r.tasks);
            vec![
                r.id.clone(),
                r.title.clone(),
                format!("{}%", p.percentage),
                r.total_xp.to_string(),
            ]
        })
        .collect();
    let marked = roadmaps
        .iter()
        .position(|r| active_id.as_deref() == Some(r.id.as_str()));
    print_table(&["ID", "TITLE", "DONE", "XP"], &rows, marked);
    Ok(())
}

fn create(store: &StateStore, title: &str, phases: &Path, json: bool) -> anyhow::Result<()> {
    let phases = load_phases(phases, None)?;
    let roadmap = store.create_roadmap(title, phases);

    if json {
        print_json(&serde_json::json!({
            "id": roadmap.id,
            "title": roadmap.title,
            "tasks": roadmap.tasks.len(),
        }))?;
    } else {
        println!("Created roadmap '{}' [{}]", roadmap.title, roadmap.id);
    }
    Ok(())
}

fn rename(store: &StateStore, id: &str, title: &str, json: bool) -> anyhow::Result<()> {
    if !store.rename_roadmap(id, title) {
        bail!("roadmap '{id}' not found");
    }
    if json {
        print_json(&serde_json::json!({ "id": id, "title": title }))?;
    } else {
        println!("Renamed [{id}] to '{title}'");
    }
    Ok(())
}

fn clone(store: &StateStore, id: &str, title: Option<&str>, json: bool) -> anyhow::Result<()> {
    let Some(copy) = store.clone_roadmap(id, title) else {
        bail!("roadmap '{id}' not found");
    };
    if json {
        print_json(&serde_json::json!({ "source": id, "id": copy.id, "title": copy.title }))?;
    } else {
        println!("Cloned [{id}] as '{}' [{}]", copy.title, copy.id);
    }
    Ok(())
}

fn delete(store: &StateStore, id: &str, json: bool) -> anyhow::Result<()> {
    if !store.delete_roadmap(id) {
        bail!("roadmap '{id}' not found");
    }
    let active = store.active_roadmap().map(|r| r.id);
    if json {
        print_json(&serde_json::json!({ "deleted": id, "active": active }))?;
    } else {
        println!("Deleted [{id}]");
        if let Some(active) = active {
            println!("Active roadmap: [{active}]");
        }
    }
    Ok(())
}

fn activate(store: &StateStore, id: &str, json: bool) -> anyhow::Result<()> {
    if !store.set_active_roadmap(id) {
        bail!("roadmap '{id}' not found");
    }
    if json {
        print_json(&serde_json::json!({ "active": id }))?;
    } else {
        println!("Active roadmap: [{id}]");
    }
    Ok(())
}

fn append(store: &StateStore, id: &str, phases: &Path, json: bool) -> anyhow::Result<()> {
    let phases = load_phases(phases, None)?;
    let added = phases.len();
    if !store.append_phases(id, phases) {
        bail!("roadmap '{id}' not found");
    }
    if json {
        print_json(&serde_json::json!({ "id": id, "phases_added": added }))?;
    } else {
        println!("Appended {added} phase(s) to [{id}]");
    }
    Ok(())
}
