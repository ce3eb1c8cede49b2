//! The single mediator between callers and persisted [`ProjectState`].
//!
//! Reads are served from an in-memory cache scoped to this store, falling back
//! to `<root>/.knowledgeforge/state.json`. Every read-modify-write runs under
//! one operation lock, and change subscribers are notified after that lock is
//! released. Without a project root the store runs cache-only.

use crate::config::Config;
use crate::error::{ForgeError, Result};
use crate::events::{ChangeBus, SubscriptionId};
use crate::paths;
use crate::progress::{Completion, CurrentTask, Progress};
use crate::roadmap::RoadmapInstance;
use crate::state::{initialize_new_state, ProjectState};
use crate::stats::Statistics;
use crate::types::Phase;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, error, warn};

pub struct StateStore {
    root: Option<PathBuf>,
    config: Config,
    cache: Mutex<Option<ProjectState>>,
    stats: Mutex<Option<Statistics>>,
    op_lock: Mutex<()>,
    bus: ChangeBus,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl StateStore {
    /// Open the store for a project, reading its config. An unreadable config
    /// is logged and replaced with defaults.
    pub fn open(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let config = Config::load(&root).unwrap_or_else(|e| {
            warn!(error = %e, "unreadable config, using defaults");
            Config::default()
        });
        for w in config.validate() {
            warn!(level = ?w.level, "{}", w.message);
        }
        Self::with_config(Some(root), config)
    }

    /// A store with no project root: state lives for this session only.
    pub fn ephemeral() -> Self {
        Self::with_config(None, Config::default())
    }

    pub fn with_config(root: Option<PathBuf>, config: Config) -> Self {
        Self {
            root,
            config,
            cache: Mutex::new(None),
            stats: Mutex::new(None),
            op_lock: Mutex::new(()),
            bus: ChangeBus::new(),
        }
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn is_persistent(&self) -> bool {
        self.root.is_some()
    }

    // -----------------------------------------------------------------------
    // Change notification
    // -----------------------------------------------------------------------

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&ProjectState) + Send + Sync + 'static,
    {
        self.bus.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    // -----------------------------------------------------------------------
    // Load / save
    // -----------------------------------------------------------------------

    /// Current state from the cache, else from the durable file. A missing or
    /// corrupt file yields `None`.
    ///
    /// The cache lock is held across a miss, so a fill from disk can never
    /// overwrite a newer state persisted by a concurrent operation.
    pub fn load(&self) -> Option<ProjectState> {
        let mut cache = lock(&self.cache);
        if let Some(state) = cache.as_ref() {
            debug!("state cache hit");
            return Some(state.clone());
        }
        let root = self.root.as_deref()?;
        let mut state = read_durable(root)?;
        if state.project_path.is_none() {
            state.project_path = Some(root.to_path_buf());
        }
        if state.repair() {
            warn!(path = %paths::state_path(root).display(), "repaired inconsistent project state");
        }
        *cache = Some(state.clone());
        Some(state)
    }

    /// Persist `state` and notify subscribers. Stamps `last_updated`.
    pub fn save(&self, state: &mut ProjectState) {
        {
            let _op = lock(&self.op_lock);
            self.persist(state);
        }
        self.bus.publish(state);
    }

    /// Forget the project: clear the cache and delete the durable file.
    pub fn reset(&self) {
        let _op = lock(&self.op_lock);
        *lock(&self.cache) = None;
        *lock(&self.stats) = None;
        if let Some(root) = self.root.as_deref() {
            if let Err(e) = crate::io::remove_if_exists(&paths::state_path(root)) {
                error!(error = %e, "failed to remove durable state file");
            }
        }
    }

    /// Statistics as of the last save, computing them from the loaded state
    /// if nothing has been saved this session.
    pub fn statistics(&self) -> Option<Statistics> {
        if let Some(stats) = lock(&self.stats).as_ref() {
            return Some(stats.clone());
        }
        let state = self.load()?;
        let stats = Statistics::compute(&state, Utc::now());
        *lock(&self.stats) = Some(stats.clone());
        Some(stats)
    }

    /// Write the store's config to `config.yaml` unless one already exists.
    pub fn write_default_config(&self) -> Result<bool> {
        let root = self.root.as_deref().ok_or(ForgeError::NoProjectRoot)?;
        if paths::config_path(root).exists() {
            return Ok(false);
        }
        self.config.save(root)?;
        Ok(true)
    }

    /// Create and persist a fresh project in the single-roadmap shape.
    pub fn initialize(&self, roadmap: Vec<Phase>) -> ProjectState {
        let mut state = initialize_new_state(roadmap, self.root.clone());
        self.save(&mut state);
        state
    }

    fn persist(&self, state: &mut ProjectState) {
        state.last_updated = Utc::now();
        *lock(&self.cache) = Some(state.clone());

        if let Some(root) = self.root.as_deref() {
            if let Err(e) = write_durable(root, state, self.config.write_ignore_marker) {
                error!(error = %e, "failed to write durable state; continuing cache-only");
            }
        }

        *lock(&self.stats) = Some(Statistics::compute(state, Utc::now()));
        debug!(roadmaps = state.roadmaps.len(), "state saved");
    }

    // -----------------------------------------------------------------------
    // Serialized read-modify-write
    // -----------------------------------------------------------------------

    /// Load, apply `f`, and persist if `f` returns `Some`. Returns `None`
    /// without writing when there is no state or `f` declines.
    fn update<R>(&self, f: impl FnOnce(&mut ProjectState) -> Option<R>) -> Option<R> {
        let (result, state) = {
            let _op = lock(&self.op_lock);
            let mut state = self.load()?;
            let result = f(&mut state)?;
            self.persist(&mut state);
            (result, state)
        };
        self.bus.publish(&state);
        Some(result)
    }

    /// Like [`Self::update`], starting from an empty project when none exists.
    fn update_or_init<R>(&self, f: impl FnOnce(&mut ProjectState) -> R) -> R {
        let (result, state) = {
            let _op = lock(&self.op_lock);
            let mut state = self
                .load()
                .unwrap_or_else(|| ProjectState::new(self.root.clone()));
            let result = f(&mut state);
            self.persist(&mut state);
            (result, state)
        };
        self.bus.publish(&state);
        result
    }

    // -----------------------------------------------------------------------
    // Roadmap CRUD
    // -----------------------------------------------------------------------

    pub fn create_roadmap(&self, title: &str, phases: Vec<Phase>) -> RoadmapInstance {
        self.update_or_init(|state| state.create_roadmap(title, phases).clone())
    }

    pub fn rename_roadmap(&self, id: &str, title: &str) -> bool {
        self.update(|state| state.rename_roadmap(id, title).then_some(()))
            .is_some()
    }

    pub fn clone_roadmap(&self, id: &str, title: Option<&str>) -> Option<RoadmapInstance> {
        self.update(|state| {
            state
                .clone_roadmap(id, title.map(str::to_string))
                .cloned()
        })
    }

    pub fn delete_roadmap(&self, id: &str) -> bool {
        self.update(|state| state.delete_roadmap(id).then_some(()))
            .is_some()
    }

    pub fn set_active_roadmap(&self, id: &str) -> bool {
        self.update(|state| state.set_active(id).then_some(()))
            .is_some()
    }

    pub fn append_phases(&self, id: &str, phases: Vec<Phase>) -> bool {
        self.update(|state| state.append_phases(id, phases).then_some(()))
            .is_some()
    }

    // -----------------------------------------------------------------------
    // Progress
    // -----------------------------------------------------------------------

    pub fn complete_current_task(
        &self,
        feedback: Option<String>,
        xp: Option<u64>,
    ) -> Option<Completion> {
        self.update(|state| state.complete_current_task(feedback, xp))
    }

    /// Move past the current task without completing it. `None` when there is
    /// no active roadmap; `Some(false)` when there is nowhere to move.
    pub fn skip_current_task(&self) -> Option<bool> {
        self.update(|state| state.skip_current_task())
    }

    pub fn award(&self, badge_keys: &[String], xp: u64) -> Option<Vec<String>> {
        self.update(|state| state.award(badge_keys, xp))
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub fn active_roadmap(&self) -> Option<RoadmapInstance> {
        self.load()?.active_roadmap().map(|r| r.into_owned())
    }

    /// The active roadmap, or why there is none.
    pub fn require_active(&self) -> Result<RoadmapInstance> {
        let state = self.load().ok_or(ForgeError::NotInitialized)?;
        if let Some(active) = state.active_roadmap() {
            return Ok(active.into_owned());
        }
        match state.active_roadmap_id {
            Some(id) => Err(ForgeError::RoadmapNotFound(id)),
            None => Err(ForgeError::NotInitialized),
        }
    }

    pub fn list_roadmaps(&self) -> Vec<RoadmapInstance> {
        self.load()
            .map(|s| s.all_roadmaps().into_iter().map(|r| r.into_owned()).collect())
            .unwrap_or_default()
    }

    pub fn find_roadmap(&self, id: &str) -> Option<RoadmapInstance> {
        self.list_roadmaps().into_iter().find(|r| r.id == id)
    }

    pub fn current_task(&self) -> Option<CurrentTask> {
        self.load()?.current_task()
    }

    pub fn progress(&self) -> Progress {
        self.load().map(|s| s.progress()).unwrap_or_default()
    }

    pub fn is_complete(&self) -> bool {
        self.load().is_some_and(|s| s.is_complete())
    }
}

// ---------------------------------------------------------------------------
// Durable file
// ---------------------------------------------------------------------------

fn read_durable(root: &Path) -> Option<ProjectState> {
    let path = paths::state_path(root);
    let data = match std::fs::read_to_string(&path) {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "unreadable state file; treating as uninitialized");
            return None;
        }
    };
    match serde_json::from_str(&data) {
        Ok(state) => Some(state),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "corrupt state file; treating as uninitialized");
            None
        }
    }
}

fn write_durable(root: &Path, state: &ProjectState, ignore_marker: bool) -> Result<()> {
    std::fs::create_dir_all(paths::forge_dir(root))?;
    if ignore_marker {
        crate::io::write_if_missing(&paths::ignore_path(root), paths::IGNORE_CONTENTS.as_bytes())?;
    }
    let data = serde_json::to_string_pretty(state)?;
    crate::io::atomic_write(&paths::state_path(root), data.as_bytes())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
