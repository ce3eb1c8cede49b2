//! Cursor movement, task completion, and progress arithmetic over a single
//! [`RoadmapInstance`]. Nothing here touches the filesystem.

use crate::roadmap::RoadmapInstance;
use crate::state::ProjectState;
use crate::types::{phase_complete_badge, unlock, Phase, TaskState, ROADMAP_COMPLETE};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Current task
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentTask {
    pub phase: Phase,
    pub task: String,
    pub phase_index: usize,
    pub task_index: usize,
}

/// The task under the cursor, or `None` once the cursor has left the roadmap.
pub fn get_current_task(instance: &RoadmapInstance) -> Option<CurrentTask> {
    let phase = instance.roadmap.get(instance.current_phase_index)?;
    let task = phase.tasks.get(instance.current_task_index)?;
    Some(CurrentTask {
        phase: phase.clone(),
        task: task.clone(),
        phase_index: instance.current_phase_index,
        task_index: instance.current_task_index,
    })
}

// ---------------------------------------------------------------------------
// Cursor
// ---------------------------------------------------------------------------

/// Move the cursor to the next task in traversal order.
///
/// Stays within the current phase while tasks remain there, otherwise moves
/// to the first task of the next phase that has any. Returns `false` and
/// leaves the cursor untouched when there is nowhere left to go.
pub fn advance_cursor(instance: &mut RoadmapInstance) -> bool {
    let Some(phase) = instance.roadmap.get(instance.current_phase_index) else {
        return false;
    };
    if instance.current_task_index + 1 < phase.tasks.len() {
        instance.current_task_index += 1;
        return true;
    }
    let next = instance
        .roadmap
        .iter()
        .enumerate()
        .skip(instance.current_phase_index + 1)
        .find(|(_, p)| !p.tasks.is_empty())
        .map(|(i, _)| i);
    match next {
        Some(i) => {
            instance.current_phase_index = i;
            instance.current_task_index = 0;
            true
        }
        None => false,
    }
}

// ---------------------------------------------------------------------------
// Completion
// ---------------------------------------------------------------------------

/// Outcome of [`complete_current_task`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Completion {
    pub has_next: bool,
    /// Badge keys newly unlocked by this call, in unlock order.
    pub unlocked: Vec<String>,
    /// XP actually credited; 0 when the task was already complete.
    pub xp_awarded: u64,
}

impl Completion {
    /// The single most significant newly unlocked key. Finishing the roadmap
    /// outranks finishing a phase.
    pub fn unlocked_badge_key(&self) -> Option<&str> {
        self.unlocked
            .iter()
            .find(|k| k.as_str() == ROADMAP_COMPLETE)
            .or_else(|| self.unlocked.last())
            .map(String::as_str)
    }
}

/// Complete the task under the cursor and move on.
///
/// Completing an already-completed task credits nothing. When the roadmap
/// runs out of tasks the cursor is parked past the last phase.
pub fn complete_current_task(
    instance: &mut RoadmapInstance,
    feedback: Option<String>,
    xp: Option<u64>,
) -> Completion {
    let phase_before = instance.current_phase_index;
    let task_before = instance.current_task_index;
    let xp = xp.unwrap_or(0);

    let mut xp_awarded = 0;
    if let Some(task) = instance.task_state_mut(phase_before, task_before) {
        if task.complete(feedback, xp) {
            xp_awarded = xp;
        }
    }
    instance.total_xp = instance.total_xp.saturating_add(xp_awarded);

    let has_next = advance_cursor(instance);
    let phase_advanced = instance.current_phase_index != phase_before;

    let mut unlocked = Vec::new();
    if phase_advanced || !has_next {
        let phase_count = instance.roadmap.len();
        let finished = if phase_before < phase_count {
            Some(phase_before)
        } else {
            phase_count.checked_sub(1)
        };
        if let Some(finished) = finished {
            let key = phase_complete_badge(finished + 1);
            if unlock(&mut instance.unlocked_badges, &key) {
                unlocked.push(key);
            }
        }
    }
    if !has_next {
        if unlock(&mut instance.unlocked_badges, ROADMAP_COMPLETE) {
            unlocked.push(ROADMAP_COMPLETE.to_string());
        }
        instance.current_phase_index = instance.roadmap.len();
        instance.current_task_index = 0;
    }

    instance.touch();
    Completion {
        has_next,
        unlocked,
        xp_awarded,
    }
}

/// Move past the current task without completing it.
pub fn skip_current_task(instance: &mut RoadmapInstance) -> bool {
    let moved = advance_cursor(instance);
    if moved {
        instance.touch();
    }
    moved
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
    /// Rounded to nearest, but held at 99 while any task is pending.
    pub percentage: u32,
}

/// Completed/total over a TaskState list. An empty list reports 0%.
///
/// Rounding never reports 100% while a task is still pending.
pub fn progress_of(tasks: &[TaskState]) -> Progress {
    let total = tasks.len();
    let completed = tasks.iter().filter(|t| t.completed).count();
    let percentage = if total == 0 {
        0
    } else {
        let rounded = (completed as f64 / total as f64 * 100.0).round() as u32;
        if completed < total {
            rounded.min(99)
        } else {
            rounded
        }
    };
    Progress {
        completed,
        total,
        percentage,
    }
}

/// True when every TaskState is completed; vacuously true for an empty list.
pub fn all_complete(tasks: &[TaskState]) -> bool {
    tasks.iter().all(|t| t.completed)
}

/// Progress of the active roadmap (or the legacy single-roadmap view).
pub fn get_progress(state: &ProjectState) -> Progress {
    state
        .active_roadmap()
        .map(|r| progress_of(&r.tasks))
        .unwrap_or_default()
}

/// Whether the active roadmap has every task completed. `false` when there
/// is no roadmap at all.
pub fn is_complete(state: &ProjectState) -> bool {
    state
        .active_roadmap()
        .is_some_and(|r| all_complete(&r.tasks))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Phase;

    fn roadmap(shape: &[usize]) -> RoadmapInstance {
        let phases = shape
            .iter()
            .enumerate()
            .map(|(p, &n)| {
                Phase::new(
                    format!("P{}", p + 1),
                    (0..n).map(|t| format!("task {p}.{t}")).collect(),
                )
            })
            .collect();
        RoadmapInstance::new("test", phases)
    }

    #[test]
    fn current_task_follows_cursor() {
        let mut r = roadmap(&[2, 1]);
        let current = get_current_task(&r).unwrap();
        assert_eq!((current.phase_index, current.task_index), (0, 0));
        assert_eq!(current.task, "task 0.0");
        assert_eq!(current.phase.title, "P1");

        r.current_task_index = 5;
        assert!(get_current_task(&r).is_none());
        r.current_phase_index = 9;
        r.current_task_index = 0;
        assert!(get_current_task(&r).is_none());
    }

    #[test]
    fn advance_moves_within_then_across_phases() {
        let mut r = roadmap(&[2, 1]);
        assert!(advance_cursor(&mut r));
        assert_eq!((r.current_phase_index, r.current_task_index), (0, 1));
        assert!(advance_cursor(&mut r));
        assert_eq!((r.current_phase_index, r.current_task_index), (1, 0));
        assert!(!advance_cursor(&mut r));
        assert_eq!((r.current_phase_index, r.current_task_index), (1, 0));
    }

    #[test]
    fn advance_skips_empty_phases() {
        let mut r = roadmap(&[1, 0, 0, 1]);
        assert!(advance_cursor(&mut r));
        assert_eq!((r.current_phase_index, r.current_task_index), (3, 0));
    }

    #[test]
    fn advance_is_terminal_once_false() {
        for shape in [&[3, 2, 1][..], &[1][..], &[0][..], &[][..], &[2, 0, 4][..]] {
            let mut r = roadmap(shape);
            let mut steps = 0;
            while advance_cursor(&mut r) {
                steps += 1;
                assert!(steps <= 100, "cursor failed to terminate for {shape:?}");
            }
            let parked = (r.current_phase_index, r.current_task_index);
            for _ in 0..3 {
                assert!(!advance_cursor(&mut r));
                assert_eq!((r.current_phase_index, r.current_task_index), parked);
            }
        }
    }

    #[test]
    fn completion_is_idempotent_at_end() {
        let mut r = roadmap(&[1]);
        let first = complete_current_task(&mut r, Some("nice".into()), Some(20));
        assert!(!first.has_next);
        assert_eq!(first.xp_awarded, 20);
        let stamped = r.tasks[0].completed_at;

        let second = complete_current_task(&mut r, Some("again".into()), Some(20));
        assert!(!second.has_next);
        assert_eq!(second.xp_awarded, 0);
        assert!(second.unlocked.is_empty());
        assert_eq!(r.total_xp, 20);
        assert!(r.tasks[0].completed);
        assert_eq!(r.tasks[0].completed_at, stamped);
        assert_eq!(r.tasks[0].feedback.as_deref(), Some("nice"));
    }

    #[test]
    fn badges_for_two_single_task_phases() {
        let mut r = roadmap(&[1, 1]);

        let first = complete_current_task(&mut r, None, Some(10));
        assert!(first.has_next);
        assert_eq!(first.unlocked_badge_key(), Some("phase_1_complete"));

        let second = complete_current_task(&mut r, None, Some(10));
        assert!(!second.has_next);
        assert_eq!(second.unlocked_badge_key(), Some("roadmap_complete"));
        assert_eq!(second.unlocked, vec!["phase_2_complete", "roadmap_complete"]);
        assert_eq!(r.total_xp, 20);
        assert!(get_current_task(&r).is_none());
    }

    #[test]
    fn moving_within_a_phase_unlocks_nothing() {
        let mut r = roadmap(&[2]);
        let c = complete_current_task(&mut r, None, None);
        assert!(c.has_next);
        assert!(c.unlocked.is_empty());
        assert_eq!(c.unlocked_badge_key(), None);
        assert_eq!(r.tasks[0].xp, 0);
    }

    #[test]
    fn skip_leaves_task_pending() {
        let mut r = roadmap(&[2]);
        assert!(skip_current_task(&mut r));
        assert!(!r.tasks[0].completed);
        assert_eq!(r.current_task_index, 1);
        assert!(!skip_current_task(&mut r));
        assert_eq!(r.current_task_index, 1);
    }

    #[test]
    fn progress_bounds_and_empty_asymmetry() {
        let empty = progress_of(&[]);
        assert_eq!(empty, Progress::default());
        assert!(all_complete(&[]));

        let mut tasks: Vec<TaskState> = (0..200).map(|t| TaskState::pending(0, t)).collect();
        for t in tasks.iter_mut().take(199) {
            t.complete(None, 0);
        }
        let p = progress_of(&tasks);
        assert_eq!((p.completed, p.total), (199, 200));
        assert_eq!(p.percentage, 99);

        tasks[199].complete(None, 0);
        assert_eq!(progress_of(&tasks).percentage, 100);
        assert!(all_complete(&tasks));
    }

    #[test]
    fn progress_rounds_half_up() {
        let mut tasks: Vec<TaskState> = (0..3).map(|t| TaskState::pending(0, t)).collect();
        tasks[0].complete(None, 0);
        tasks[1].complete(None, 0);
        assert_eq!(progress_of(&tasks).percentage, 67);
    }
}
