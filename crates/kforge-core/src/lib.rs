//! Roadmap progress state engine: roadmaps, phases and tasks, the "current
//! task" cursor, XP and badges, persisted to a per-project cache and durable
//! JSON file with transparent migration of single-roadmap records.

pub mod config;
pub mod error;
pub mod events;
pub mod generator;
pub mod io;
pub mod migration;
pub mod paths;
pub mod progress;
pub mod roadmap;
pub mod state;
pub mod stats;
pub mod store;
pub mod types;

pub use error::{ForgeError, Result};
pub use progress::{Completion, CurrentTask, Progress};
pub use roadmap::RoadmapInstance;
pub use state::{initialize_new_state, ProjectState};
pub use store::StateStore;
pub use types::{Phase, TaskState};
