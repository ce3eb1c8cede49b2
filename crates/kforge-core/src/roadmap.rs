use crate::types::{build_task_states, Phase, TaskState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// RoadmapInstance
// ---------------------------------------------------------------------------

/// One concrete, stateful attempt at a roadmap.
///
/// The cursor `(current_phase_index, current_task_index)` either points at a
/// pending task or sits past the last phase, which means the roadmap is done.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapInstance {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub roadmap: Vec<Phase>,
    #[serde(default)]
    pub current_phase_index: usize,
    #[serde(default)]
    pub current_task_index: usize,
    #[serde(default)]
    pub tasks: Vec<TaskState>,
    #[serde(default)]
    pub total_xp: u64,
    #[serde(default)]
    pub unlocked_badges: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl RoadmapInstance {
    /// Build a fresh instance with a new id and one pending TaskState per task.
    pub fn new(title: impl Into<String>, roadmap: Vec<Phase>) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), title, roadmap)
    }

    pub fn with_id(id: impl Into<String>, title: impl Into<String>, roadmap: Vec<Phase>) -> Self {
        let now = Utc::now();
        let tasks = build_task_states(&roadmap, 0);
        let mut instance = Self {
            id: id.into(),
            title: title.into(),
            roadmap,
            current_phase_index: 0,
            current_task_index: 0,
            tasks,
            total_xp: 0,
            unlocked_badges: Vec::new(),
            created_at: now,
            last_updated: now,
        };
        instance.settle_cursor();
        instance
    }

    /// A new attempt at the same curriculum: new id, cursor at the start, no
    /// completions, no XP, no badges.
    pub fn fresh_attempt(&self, title: impl Into<String>) -> Self {
        let now = Utc::now();
        let tasks = self
            .tasks
            .iter()
            .map(|t| TaskState::pending(t.phase_index, t.task_index))
            .collect();
        let mut instance = Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            roadmap: self.roadmap.clone(),
            current_phase_index: 0,
            current_task_index: 0,
            tasks,
            total_xp: 0,
            unlocked_badges: Vec::new(),
            created_at: now,
            last_updated: now,
        };
        instance.settle_cursor();
        instance
    }

    pub fn rename(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.touch();
    }

    /// Append phases, numbering their TaskStates after the existing phases.
    pub fn append_phases(&mut self, phases: Vec<Phase>) {
        let first = self.roadmap.len();
        self.tasks.extend(build_task_states(&phases, first));
        self.roadmap.extend(phases);
        self.settle_cursor();
        self.touch();
    }

    /// Move a cursor that does not sit on a task (empty phase, stale index)
    /// forward to the next real task, or past the last phase if none remain.
    /// A cursor already past the last phase is left alone.
    pub fn settle_cursor(&mut self) {
        let Some(phase) = self.roadmap.get(self.current_phase_index) else {
            return;
        };
        if self.current_task_index < phase.tasks.len() {
            return;
        }
        let next = self
            .roadmap
            .iter()
            .enumerate()
            .skip(self.current_phase_index + 1)
            .find(|(_, p)| !p.tasks.is_empty())
            .map(|(i, _)| i)
            .unwrap_or(self.roadmap.len());
        self.current_phase_index = next;
        self.current_task_index = 0;
    }

    pub fn task_state(&self, phase_index: usize, task_index: usize) -> Option<&TaskState> {
        self.tasks.iter().find(|t| t.is_at(phase_index, task_index))
    }

    pub fn task_state_mut(
        &mut self,
        phase_index: usize,
        task_index: usize,
    ) -> Option<&mut TaskState> {
        self.tasks
            .iter_mut()
            .find(|t| t.is_at(phase_index, task_index))
    }

    /// Number of tasks in the roadmap definition.
    pub fn total_tasks(&self) -> usize {
        crate::types::task_count(&self.roadmap)
    }

    /// True when every TaskState resolves into `roadmap` and every task has one.
    pub fn tasks_consistent(&self) -> bool {
        let in_range = self.tasks.iter().all(|t| {
            self.roadmap
                .get(t.phase_index)
                .is_some_and(|p| t.task_index < p.tasks.len())
        });
        let covered = self.roadmap.iter().enumerate().all(|(p, phase)| {
            (0..phase.tasks.len()).all(|t| self.task_state(p, t).is_some())
        });
        in_range && covered
    }

    pub fn touch(&mut self) {
        self.last_updated = Utc::now();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn two_phase() -> Vec<Phase> {
        vec![
            Phase::new("P1", vec!["t1".into(), "t2".into()]),
            Phase::new("P2", vec!["t3".into()]),
        ]
    }

    #[test]
    fn new_instance_starts_at_origin() {
        let r = RoadmapInstance::new("Rust", two_phase());
        assert_eq!((r.current_phase_index, r.current_task_index), (0, 0));
        assert_eq!(r.tasks.len(), 3);
        assert_eq!(r.total_xp, 0);
        assert!(r.unlocked_badges.is_empty());
        assert!(r.tasks_consistent());
        assert!(!r.id.is_empty());
    }

    #[test]
    fn ids_are_unique() {
        let a = RoadmapInstance::new("a", two_phase());
        let b = RoadmapInstance::new("b", two_phase());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn fresh_attempt_resets_progress_and_is_independent() {
        let mut original = RoadmapInstance::new("Rust", two_phase());
        original.tasks[0].complete(None, 10);
        original.total_xp = 10;
        original.current_task_index = 1;
        original.unlocked_badges.push("phase_1_complete".into());

        let mut copy = original.fresh_attempt("Rust (again)");
        assert_ne!(copy.id, original.id);
        assert_eq!(copy.roadmap, original.roadmap);
        assert_eq!((copy.current_phase_index, copy.current_task_index), (0, 0));
        assert!(copy.tasks.iter().all(|t| !t.completed));
        assert_eq!(copy.total_xp, 0);
        assert!(copy.unlocked_badges.is_empty());

        copy.roadmap[0].title = "changed".into();
        copy.roadmap[0].tasks.push("extra".into());
        assert_eq!(original.roadmap[0].title, "P1");
        assert_eq!(original.roadmap[0].tasks.len(), 2);
    }

    #[test]
    fn append_phases_continues_phase_numbering() {
        let mut r = RoadmapInstance::new("Rust", two_phase());
        r.append_phases(vec![
            Phase::new("P3", vec!["x".into()]),
            Phase::new("P4", vec!["y".into()]),
        ]);
        assert_eq!(r.roadmap.len(), 4);
        let appended: Vec<usize> = r.tasks[3..].iter().map(|t| t.phase_index).collect();
        assert_eq!(appended, vec![2, 3]);
        assert!(r.tasks_consistent());
    }

    #[test]
    fn append_after_completion_resumes_cursor() {
        let mut r = RoadmapInstance::new("Rust", two_phase());
        r.current_phase_index = 2;
        r.current_task_index = 0;
        r.append_phases(vec![Phase::new("P3", vec!["x".into()])]);
        assert_eq!((r.current_phase_index, r.current_task_index), (2, 0));
    }

    #[test]
    fn settle_cursor_skips_empty_leading_phase() {
        let r = RoadmapInstance::new(
            "Rust",
            vec![Phase::new("Intro", vec![]), Phase::new("P2", vec!["t".into()])],
        );
        assert_eq!((r.current_phase_index, r.current_task_index), (1, 0));

        let empty = RoadmapInstance::new("Nothing", vec![Phase::new("Intro", vec![])]);
        assert_eq!(empty.current_phase_index, 1);
    }

    #[test]
    fn tasks_consistent_detects_out_of_range() {
        let mut r = RoadmapInstance::new("Rust", two_phase());
        r.tasks.push(TaskState::pending(5, 0));
        assert!(!r.tasks_consistent());
    }
}
