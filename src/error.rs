use thiserror::Error;

use crate::core::{ColumnId, ProjectId, TaskId};

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Not authenticated")]
    Unauthorized,

    #[error("Backend error ({status}): {detail}")]
    Api { status: u16, detail: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Project not found: {0}")]
    ProjectNotFound(ProjectId),

    #[error("Column not found: {0}")]
    ColumnNotFound(ColumnId),

    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Prompt failed: {0}")]
    Prompt(String),

    #[error("Drag already in progress for task {active} (requested {requested})")]
    ConcurrentDrag { active: TaskId, requested: TaskId },

    #[error("No drag in progress for task {0}")]
    NoDragSession(TaskId),

    #[error("No drag in progress")]
    NotDragging,

    #[error("Failed to save placement of task {task_id}: {reason}")]
    Persistence { task_id: TaskId, reason: String },

    #[error("Discarded stale refresh #{received} (latest applied #{latest})")]
    StaleReconciliation { received: u64, latest: u64 },

    #[error("No home directory")]
    NoHomeDir,

    #[error("Operation timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Task join error: {0}")]
    TaskJoin(String),
}

pub type Result<T> = std::result::Result<T, Error>;
