use serde::{Deserialize, Serialize};

use super::ids::{ColumnId, ProjectId};

/// An ordered bucket of tasks within a board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: ColumnId,
    pub name: String,
    #[serde(default)]
    pub position: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<ProjectId>,
}

impl Column {
    pub fn new(id: ColumnId, name: &str, position: u32) -> Self {
        Self {
            id,
            name: name.to_string(),
            position,
            project_id: None,
        }
    }
}

/// Body for `POST /columns`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewColumn {
    pub project_id: ProjectId,
    pub name: String,
}

impl NewColumn {
    pub fn new(project_id: ProjectId, name: &str) -> crate::Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(crate::Error::Validation("Column name is required".to_string()));
        }
        Ok(Self {
            project_id,
            name: name.to_string(),
        })
    }
}

/// Body for `PUT /columns/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnUpdate {
    pub name: String,
    pub position: u32,
}
