use thiserror::Error;

#[derive(Debug, Error)]
pub enum ForgeError {
    #[error("not initialized: run 'kforge init'")]
    NotInitialized,

    #[error("roadmap not found: {0}")]
    RoadmapNotFound(String),

    #[error("invalid roadmap: {0}")]
    InvalidRoadmap(String),

    #[error("no project root: durable persistence is disabled")]
    NoProjectRoot,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ForgeError>;
