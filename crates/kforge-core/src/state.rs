use crate::migration;
use crate::progress::{self, Completion, CurrentTask, Progress};
use crate::roadmap::RoadmapInstance;
use crate::types::{build_task_states, unlock, Phase, TaskState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// Legacy single-roadmap fields
// ---------------------------------------------------------------------------

/// The flattened single-roadmap shape written before multiple roadmaps per
/// project existed. Present on disk only for records that predate them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyRoadmap {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roadmap: Option<Vec<Phase>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_phase_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_task_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<TaskState>>,
}

impl LegacyRoadmap {
    pub fn is_present(&self) -> bool {
        self.roadmap.is_some()
    }
}

// ---------------------------------------------------------------------------
// ProjectState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectState {
    #[serde(default)]
    pub roadmaps: Vec<RoadmapInstance>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_roadmap_id: Option<String>,
    #[serde(default)]
    pub project_initialized: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_path: Option<PathBuf>,
    #[serde(default)]
    pub total_xp: u64,
    #[serde(default)]
    pub unlocked_badges: Vec<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub last_updated: DateTime<Utc>,
    #[serde(flatten)]
    pub legacy: LegacyRoadmap,
}

/// Build a freshly initialized project in the single-roadmap shape, cursor at
/// the first task and every task pending.
pub fn initialize_new_state(roadmap: Vec<Phase>, project_path: Option<PathBuf>) -> ProjectState {
    let mut state = ProjectState::new(project_path);
    state.project_initialized = true;
    state.legacy = LegacyRoadmap {
        tasks: Some(build_task_states(&roadmap, 0)),
        roadmap: Some(roadmap),
        current_phase_index: Some(0),
        current_task_index: Some(0),
    };
    state
}

impl ProjectState {
    pub fn new(project_path: Option<PathBuf>) -> Self {
        let now = Utc::now();
        Self {
            roadmaps: Vec::new(),
            active_roadmap_id: None,
            project_initialized: false,
            project_path,
            total_xp: 0,
            unlocked_badges: Vec::new(),
            created_at: now,
            last_updated: now,
            legacy: LegacyRoadmap::default(),
        }
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// The roadmap cursor-advancing calls operate on. For a record that only
    /// has the legacy shape this is a synthesized view; the record itself is
    /// not touched.
    pub fn active_roadmap(&self) -> Option<Cow<'_, RoadmapInstance>> {
        if self.roadmaps.is_empty() {
            return migration::legacy_view(self).map(Cow::Owned);
        }
        let id = self.active_roadmap_id.as_deref()?;
        self.find_roadmap(id).map(Cow::Borrowed)
    }

    /// Every roadmap in list order, including a synthesized legacy view.
    pub fn all_roadmaps(&self) -> Vec<Cow<'_, RoadmapInstance>> {
        if self.roadmaps.is_empty() {
            return migration::legacy_view(self)
                .map(Cow::Owned)
                .into_iter()
                .collect();
        }
        self.roadmaps.iter().map(Cow::Borrowed).collect()
    }

    pub fn find_roadmap(&self, id: &str) -> Option<&RoadmapInstance> {
        self.roadmaps.iter().find(|r| r.id == id)
    }

    fn find_roadmap_mut(&mut self, id: &str) -> Option<&mut RoadmapInstance> {
        self.roadmaps.iter_mut().find(|r| r.id == id)
    }

    /// Active roadmap for mutation. Materializes a legacy record first.
    pub fn active_roadmap_mut(&mut self) -> Option<&mut RoadmapInstance> {
        migration::to_multi_roadmap(self);
        let id = self.active_roadmap_id.clone()?;
        self.find_roadmap_mut(&id)
    }

    pub fn current_task(&self) -> Option<CurrentTask> {
        progress::get_current_task(self.active_roadmap()?.as_ref())
    }

    pub fn progress(&self) -> Progress {
        progress::get_progress(self)
    }

    pub fn is_complete(&self) -> bool {
        progress::is_complete(self)
    }

    /// `active_roadmap_id` resolves whenever roadmaps exist, and only then.
    pub fn active_pointer_valid(&self) -> bool {
        match &self.active_roadmap_id {
            Some(id) => self.find_roadmap(id).is_some(),
            None => self.roadmaps.is_empty(),
        }
    }

    // -----------------------------------------------------------------------
    // Progress mutations
    // -----------------------------------------------------------------------

    /// Complete the active roadmap's current task, crediting XP and badges to
    /// both the roadmap and the project aggregates.
    pub fn complete_current_task(
        &mut self,
        feedback: Option<String>,
        xp: Option<u64>,
    ) -> Option<Completion> {
        let roadmap = self.active_roadmap_mut()?;
        let completion = progress::complete_current_task(roadmap, feedback, xp);
        self.total_xp = self.total_xp.saturating_add(completion.xp_awarded);
        for key in &completion.unlocked {
            unlock(&mut self.unlocked_badges, key);
        }
        Some(completion)
    }

    pub fn skip_current_task(&mut self) -> Option<bool> {
        let roadmap = self.active_roadmap_mut()?;
        Some(progress::skip_current_task(roadmap))
    }

    /// Accept badge keys and an XP delta discovered outside the engine.
    /// Returns the keys that were newly unlocked on the active roadmap.
    pub fn award(&mut self, badge_keys: &[String], xp: u64) -> Option<Vec<String>> {
        let roadmap = self.active_roadmap_mut()?;
        let newly: Vec<String> = badge_keys
            .iter()
            .filter(|key| unlock(&mut roadmap.unlocked_badges, key))
            .cloned()
            .collect();
        roadmap.total_xp = roadmap.total_xp.saturating_add(xp);
        roadmap.touch();
        for key in badge_keys {
            unlock(&mut self.unlocked_badges, key);
        }
        self.total_xp = self.total_xp.saturating_add(xp);
        Some(newly)
    }

    // -----------------------------------------------------------------------
    // RoadmapInstance CRUD
    // -----------------------------------------------------------------------

    /// Add a new roadmap and make it active.
    pub fn create_roadmap(&mut self, title: impl Into<String>, phases: Vec<Phase>) -> &RoadmapInstance {
        migration::to_multi_roadmap(self);
        let instance = RoadmapInstance::new(title, phases);
        self.push_active(instance)
    }

    pub fn rename_roadmap(&mut self, id: &str, title: impl Into<String>) -> bool {
        migration::to_multi_roadmap(self);
        match self.find_roadmap_mut(id) {
            Some(r) => {
                r.rename(title);
                true
            }
            None => false,
        }
    }

    /// Copy a roadmap's curriculum into a new, active, unstarted roadmap.
    pub fn clone_roadmap(&mut self, id: &str, title: Option<String>) -> Option<&RoadmapInstance> {
        migration::to_multi_roadmap(self);
        let source = self.find_roadmap(id)?;
        let title = title.unwrap_or_else(|| format!("{} (copy)", source.title));
        let copy = source.fresh_attempt(title);
        Some(self.push_active(copy))
    }

    /// Remove a roadmap. Deleting the active one promotes the first remaining
    /// roadmap, or clears the pointer when none remain.
    pub fn delete_roadmap(&mut self, id: &str) -> bool {
        migration::to_multi_roadmap(self);
        let before = self.roadmaps.len();
        self.roadmaps.retain(|r| r.id != id);
        if self.roadmaps.len() == before {
            return false;
        }
        if self.active_roadmap_id.as_deref() == Some(id) {
            self.active_roadmap_id = self.roadmaps.first().map(|r| r.id.clone());
        }
        true
    }

    pub fn set_active(&mut self, id: &str) -> bool {
        migration::to_multi_roadmap(self);
        if self.find_roadmap(id).is_none() {
            return false;
        }
        self.active_roadmap_id = Some(id.to_string());
        true
    }

    pub fn append_phases(&mut self, id: &str, phases: Vec<Phase>) -> bool {
        migration::to_multi_roadmap(self);
        match self.find_roadmap_mut(id) {
            Some(r) => {
                r.append_phases(phases);
                true
            }
            None => false,
        }
    }

    fn push_active(&mut self, instance: RoadmapInstance) -> &RoadmapInstance {
        self.active_roadmap_id = Some(instance.id.clone());
        self.project_initialized = true;
        self.roadmaps.push(instance);
        &self.roadmaps[self.roadmaps.len() - 1]
    }

    // -----------------------------------------------------------------------
    // Repair
    // -----------------------------------------------------------------------

    /// Bring a loaded record back inside its structural invariants: a
    /// resolvable active pointer, a TaskState for every task, and cursors
    /// that rest on a task. Returns true if anything changed.
    pub fn repair(&mut self) -> bool {
        let mut changed = false;

        if !self.active_pointer_valid() {
            self.active_roadmap_id = self.roadmaps.first().map(|r| r.id.clone());
            changed = true;
        }

        for roadmap in &mut self.roadmaps {
            let missing: Vec<TaskState> = build_task_states(&roadmap.roadmap, 0)
                .into_iter()
                .filter(|t| roadmap.task_state(t.phase_index, t.task_index).is_none())
                .collect();
            if !missing.is_empty() {
                roadmap.tasks.extend(missing);
                changed = true;
            }
            let cursor = (roadmap.current_phase_index, roadmap.current_task_index);
            roadmap.settle_cursor();
            if cursor != (roadmap.current_phase_index, roadmap.current_task_index) {
                changed = true;
            }
        }

        changed
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
