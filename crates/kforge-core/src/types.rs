use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// One phase of a roadmap: a titled, ordered list of task descriptions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Phase {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub tasks: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

impl Phase {
    pub fn new(title: impl Into<String>, tasks: Vec<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            tasks,
            duration: None,
        }
    }
}

/// Total number of tasks across every phase.
pub fn task_count(phases: &[Phase]) -> usize {
    phases.iter().map(|p| p.tasks.len()).sum()
}

// ---------------------------------------------------------------------------
// TaskState
// ---------------------------------------------------------------------------

/// Progress record for one task, identified by its position in the roadmap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskState {
    pub phase_index: usize,
    pub task_index: usize,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    #[serde(default)]
    pub xp: u64,
}

impl TaskState {
    pub fn pending(phase_index: usize, task_index: usize) -> Self {
        Self {
            phase_index,
            task_index,
            completed: false,
            completed_at: None,
            feedback: None,
            xp: 0,
        }
    }

    pub fn is_at(&self, phase_index: usize, task_index: usize) -> bool {
        self.phase_index == phase_index && self.task_index == task_index
    }

    /// Mark complete. Returns `false` (and changes nothing) if already completed.
    pub fn complete(&mut self, feedback: Option<String>, xp: u64) -> bool {
        if self.completed {
            return false;
        }
        self.completed = true;
        self.completed_at = Some(Utc::now());
        self.feedback = feedback;
        self.xp = xp;
        true
    }
}

/// Build one pending TaskState per task, numbering phases from `first_phase_index`.
pub fn build_task_states(phases: &[Phase], first_phase_index: usize) -> Vec<TaskState> {
    phases
        .iter()
        .enumerate()
        .flat_map(|(offset, phase)| {
            (0..phase.tasks.len()).map(move |t| TaskState::pending(first_phase_index + offset, t))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Badge keys
// ---------------------------------------------------------------------------

pub const ROADMAP_COMPLETE: &str = "roadmap_complete";

/// Badge key for finishing phase `number` (1-based).
pub fn phase_complete_badge(number: usize) -> String {
    format!("phase_{number}_complete")
}

/// Insert `key` unless present. Returns true if it was newly added.
pub fn unlock(badges: &mut Vec<String>, key: &str) -> bool {
    if badges.iter().any(|b| b == key) {
        return false;
    }
    badges.push(key.to_string());
    true
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn phases() -> Vec<Phase> {
        vec![
            Phase::new("Basics", vec!["a".into(), "b".into()]),
            Phase::new("Empty", vec![]),
            Phase::new("Advanced", vec!["c".into()]),
        ]
    }

    #[test]
    fn build_task_states_covers_every_task() {
        let states = build_task_states(&phases(), 0);
        let positions: Vec<(usize, usize)> =
            states.iter().map(|s| (s.phase_index, s.task_index)).collect();
        assert_eq!(positions, vec![(0, 0), (0, 1), (2, 0)]);
        assert!(states.iter().all(|s| !s.completed && s.xp == 0));
        assert_eq!(task_count(&phases()), 3);
    }

    #[test]
    fn build_task_states_offsets_phase_index() {
        let states = build_task_states(&phases()[..1], 4);
        assert!(states.iter().all(|s| s.phase_index == 4));
    }

    #[test]
    fn complete_is_idempotent() {
        let mut task = TaskState::pending(0, 0);
        assert!(task.complete(Some("done".into()), 15));
        let stamped = task.completed_at;
        assert!(!task.complete(Some("again".into()), 99));
        assert_eq!(task.completed_at, stamped);
        assert_eq!(task.xp, 15);
        assert_eq!(task.feedback.as_deref(), Some("done"));
    }

    #[test]
    fn unlock_deduplicates() {
        let mut badges = Vec::new();
        assert!(unlock(&mut badges, &phase_complete_badge(1)));
        assert!(!unlock(&mut badges, "phase_1_complete"));
        assert_eq!(badges, vec!["phase_1_complete"]);
    }

    #[test]
    fn phase_wire_format_is_camel_case() {
        let json = r#"{"title":"P1","tasks":["t1"],"duration":"1 week"}"#;
        let phase: Phase = serde_json::from_str(json).unwrap();
        assert_eq!(phase.duration.as_deref(), Some("1 week"));
        assert!(phase.description.is_none());

        let task: TaskState =
            serde_json::from_str(r#"{"phaseIndex":1,"taskIndex":2,"completed":false}"#).unwrap();
        assert!(task.is_at(1, 2));
        assert_eq!(task.xp, 0);
    }
}
