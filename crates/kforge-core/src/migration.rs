//! Single-roadmap → multi-roadmap migration.
//!
//! A stored record is in exactly one [`Shape`]. Reads of a legacy record go
//! through [`legacy_view`], which never mutates. Writers that manage roadmap
//! instances call [`to_multi_roadmap`] first; from then on only the
//! multi-roadmap shape is persisted.

use crate::roadmap::RoadmapInstance;
use crate::state::{LegacyRoadmap, ProjectState};
use crate::types::build_task_states;

/// Stable id given to the roadmap synthesized from a legacy record.
pub const LEGACY_ROADMAP_ID: &str = "legacy";
pub const LEGACY_ROADMAP_TITLE: &str = "Learning Roadmap";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Neither shape present: no roadmap has been generated yet.
    Uninitialized,
    /// Only the flattened single-roadmap fields are present.
    Legacy,
    /// One or more roadmap instances exist; legacy fields are ignored.
    MultiRoadmap,
}

pub fn shape(state: &ProjectState) -> Shape {
    if !state.roadmaps.is_empty() {
        Shape::MultiRoadmap
    } else if state.legacy.is_present() {
        Shape::Legacy
    } else {
        Shape::Uninitialized
    }
}

/// Synthesize the roadmap instance a legacy record describes. `None` unless
/// the record is in the legacy shape.
pub fn legacy_view(state: &ProjectState) -> Option<RoadmapInstance> {
    if shape(state) != Shape::Legacy {
        return None;
    }
    let legacy = &state.legacy;
    let roadmap = legacy.roadmap.clone().unwrap_or_default();
    let tasks = legacy
        .tasks
        .clone()
        .unwrap_or_else(|| build_task_states(&roadmap, 0));
    let mut instance = RoadmapInstance {
        id: LEGACY_ROADMAP_ID.to_string(),
        title: LEGACY_ROADMAP_TITLE.to_string(),
        roadmap,
        current_phase_index: legacy.current_phase_index.unwrap_or(0),
        current_task_index: legacy.current_task_index.unwrap_or(0),
        tasks,
        total_xp: state.total_xp,
        unlocked_badges: state.unlocked_badges.clone(),
        created_at: state.created_at,
        last_updated: state.last_updated,
    };
    instance.settle_cursor();
    Some(instance)
}

/// Materialize a legacy record as its first roadmap instance and drop the
/// legacy fields. Returns true if a migration happened.
pub fn to_multi_roadmap(state: &mut ProjectState) -> bool {
    let Some(instance) = legacy_view(state) else {
        return false;
    };
    tracing::debug!(
        tasks = instance.tasks.len(),
        "migrating legacy single-roadmap state"
    );
    state.active_roadmap_id = Some(instance.id.clone());
    state.roadmaps.push(instance);
    state.legacy = LegacyRoadmap::default();
    true
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
