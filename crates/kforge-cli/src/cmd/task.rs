use crate::output::print_json;
use anyhow::Context;
use kforge_core::StateStore;

pub fn complete(
    store: &StateStore,
    feedback: Option<String>,
    xp: Option<u64>,
    json: bool,
) -> anyhow::Result<()> {
    store.require_active()?;
    let task = store.current_task();
    let xp = xp.unwrap_or(store.config().default_task_xp);
    let completion = store
        .complete_current_task(feedback, Some(xp))
        .context("no active roadmap")?;

    if json {
        print_json(&serde_json::json!({
            "completed": task.as_ref().map(|t| &t.task),
            "has_next": completion.has_next,
            "xp_awarded": completion.xp_awarded,
            "unlocked": completion.unlocked,
            "unlocked_badge_key": completion.unlocked_badge_key(),
            "next_task": store.current_task(),
        }))?;
        return Ok(());
    }

    match task {
        Some(t) if completion.xp_awarded > 0 => {
            println!("Completed: {} (+{} XP)", t.task, completion.xp_awarded)
        }
        Some(t) => println!("Completed: {}", t.task),
        None => println!("Nothing left to complete"),
    }
    for badge in &completion.unlocked {
        println!("Badge unlocked: {badge}");
    }
    if completion.has_next {
        if let Some(next) = store.current_task() {
            println!("Next: {}", next.task);
        }
    } else {
        println!("Roadmap complete!");
    }
    Ok(())
}

pub fn skip(store: &StateStore, json: bool) -> anyhow::Result<()> {
    store.require_active()?;
    let moved = store
        .skip_current_task()
        .context("no active roadmap")?;
    let next = store.current_task();

    if json {
        print_json(&serde_json::json!({ "moved": moved, "current_task": next }))?;
    } else if moved {
        match next {
            Some(t) => println!("Skipped. Now on: {}", t.task),
            None => println!("Skipped."),
        }
    } else {
        println!("No later task to skip to");
    }
    Ok(())
}

pub fn award(store: &StateStore, badges: &[String], xp: u64, json: bool) -> anyhow::Result<()> {
    store.require_active()?;
    let newly = store
        .award(badges, xp)
        .context("no active roadmap")?;

    if json {
        print_json(&serde_json::json!({ "unlocked": newly, "xp": xp }))?;
    } else {
        for badge in &newly {
            println!("Badge unlocked: {badge}");
        }
        if xp > 0 {
            println!("+{xp} XP");
        }
    }
    Ok(())
}
