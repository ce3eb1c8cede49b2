use crate::progress::progress_of;
use crate::state::ProjectState;
use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseStats {
    pub title: String,
    pub completed: usize,
    pub total: usize,
}

/// Figures derived from a [`ProjectState`], recomputed after every save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub roadmap_count: usize,
    pub completed: usize,
    pub total: usize,
    pub percentage: u32,
    pub total_xp: u64,
    pub badge_count: usize,
    /// Per-phase counts for the active roadmap.
    pub phases: Vec<PhaseStats>,
    pub current_streak_days: u32,
    pub longest_streak_days: u32,
    pub last_completed_at: Option<DateTime<Utc>>,
}

impl Statistics {
    pub fn compute(state: &ProjectState, now: DateTime<Utc>) -> Self {
        let all = state.all_roadmaps();
        let active = state.active_roadmap();

        let (progress, phases, total_xp, badge_count) = match &active {
            Some(r) => {
                let phases = r
                    .roadmap
                    .iter()
                    .enumerate()
                    .map(|(i, phase)| PhaseStats {
                        title: phase.title.clone(),
                        completed: r
                            .tasks
                            .iter()
                            .filter(|t| t.phase_index == i && t.completed)
                            .count(),
                        total: phase.tasks.len(),
                    })
                    .collect();
                (
                    progress_of(&r.tasks),
                    phases,
                    r.total_xp,
                    r.unlocked_badges.len(),
                )
            }
            None => (
                progress_of(&[]),
                Vec::new(),
                state.total_xp,
                state.unlocked_badges.len(),
            ),
        };

        let stamps: Vec<DateTime<Utc>> = all
            .iter()
            .flat_map(|r| r.tasks.iter().filter_map(|t| t.completed_at))
            .collect();
        let days: BTreeSet<NaiveDate> = stamps.iter().map(|t| t.date_naive()).collect();
        let (current_streak_days, longest_streak_days) = streaks(&days, now.date_naive());

        Self {
            roadmap_count: all.len(),
            completed: progress.completed,
            total: progress.total,
            percentage: progress.percentage,
            total_xp,
            badge_count,
            phases,
            current_streak_days,
            longest_streak_days,
            last_completed_at: stamps.into_iter().max(),
        }
    }
}

/// `(current, longest)` runs of consecutive completion days. The current run
/// is broken once a full day passes with no completion.
fn streaks(days: &BTreeSet<NaiveDate>, today: NaiveDate) -> (u32, u32) {
    let mut longest = 0;
    let mut run = 0;
    let mut prev: Option<NaiveDate> = None;
    for &day in days {
        run = match prev {
            Some(p) if p.checked_add_days(Days::new(1)) == Some(day) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        prev = Some(day);
    }

    let current = match prev {
        Some(last) if last >= today.checked_sub_days(Days::new(1)).unwrap_or(today) => run,
        _ => 0,
    };
    (current, longest)
}
