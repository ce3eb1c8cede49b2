use crate::output::{print_json, progress_bar};
use kforge_core::StateStore;

pub fn run(store: &StateStore, json: bool) -> anyhow::Result<()> {
    let Some(state) = store.load() else {
        if json {
            return print_json(&serde_json::json!({ "initialized": false }));
        }
        println!("No roadmap yet. Run: kforge init --phases <file>");
        return Ok(());
    };

    let active = state.active_roadmap();
    let progress = state.progress();
    let current = state.current_task();

    if json {
        #[derive(serde::Serialize)]
        struct StatusOutput<'a> {
            initialized: bool,
            roadmap_id: Option<&'a str>,
            roadmap_title: Option<&'a str>,
            progress: kforge_core::Progress,
            complete: bool,
            current_task: Option<kforge_core::CurrentTask>,
            roadmap_xp: u64,
            total_xp: u64,
            badges: &'a [String],
        }

        let output = StatusOutput {
            initialized: state.project_initialized,
            roadmap_id: active.as_deref().map(|r| r.id.as_str()),
            roadmap_title: active.as_deref().map(|r| r.title.as_str()),
            progress,
            complete: state.is_complete(),
            current_task: current,
            roadmap_xp: active.as_deref().map(|r| r.total_xp).unwrap_or(0),
            total_xp: state.total_xp,
            badges: active
                .as_deref()
                .map(|r| r.unlocked_badges.as_slice())
                .unwrap_or(&[]),
        };
        return print_json(&output);
    }

    // -- Human-readable output ------------------------------------------------

    let Some(roadmap) = active.as_deref() else {
        println!("No active roadmap. Run: kforge roadmap create <title> --phases <file>");
        return Ok(());
    };

    println!("Roadmap: {}", roadmap.title);
    println!(
        "Progress: {} ({}/{} tasks)",
        progress_bar(progress.percentage, 20),
        progress.completed,
        progress.total
    );
    println!("XP: {} (project total {})", roadmap.total_xp, state.total_xp);

    match current {
        Some(c) => {
            println!("\nPhase {}: {}", c.phase_index + 1, c.phase.title);
            println!("  Current task: {}", c.task);
        }
        None => println!("\nAll tasks done."),
    }

    if !roadmap.unlocked_badges.is_empty() {
        println!("\nBadges: {}", roadmap.unlocked_badges.join(", "));
    }
    Ok(())
}
