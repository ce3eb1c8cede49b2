use crate::output::{print_json, print_table, progress_bar};
use kforge_core::StateStore;

pub fn run(store: &StateStore, json: bool) -> anyhow::Result<()> {
    let Some(stats) = store.statistics() else {
        if json {
            return print_json(&serde_json::json!(null));
        }
        println!("No roadmap yet.");
        return Ok(());
    };

    if json {
        return print_json(&stats);
    }

    println!("Roadmaps: {}", stats.roadmap_count);
    println!(
        "Progress: {} ({}/{} tasks)",
        progress_bar(stats.percentage, 20),
        stats.completed,
        stats.total
    );
    println!("XP: {}  Badges: {}", stats.total_xp, stats.badge_count);
    println!(
        "Streak: {} day(s) (longest {})",
        stats.current_streak_days, stats.longest_streak_days
    );

    if !stats.phases.is_empty() {
        println!();
        let rows: Vec<Vec<String>> = stats
            .phases
            .iter()
            .enumerate()
            .map(|(i, p)| {
                vec![
                    (i + 1).to_string(),
                    p.title.clone(),
                    format!("{}/{}", p.completed, p.total),
                ]
            })
            .collect();
        print_table(&["#", "PHASE", "DONE"], &rows, None);
    }
    Ok(())
}
