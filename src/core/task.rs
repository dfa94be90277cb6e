//! Task cards and their placement on the board.
//!
//! A task lives in exactly one column; its `position` ranks it among the
//! other tasks of that column. Positions are only meaningful inside a column
//! and are not required to be contiguous or unique across columns.

use serde::{Deserialize, Serialize};

use super::ids::{ColumnId, ProjectId, TaskId, UserId};

/// Where a task sits: its column and its rank inside that column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Placement {
    pub column_id: ColumnId,
    pub position: u32,
}

impl Placement {
    pub fn new(column_id: ColumnId, position: u32) -> Self {
        Self {
            column_id,
            position,
        }
    }
}

impl std::fmt::Display for Placement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "column {} @ {}", self.column_id, self.position)
    }
}

/// A task card as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub column_id: ColumnId,
    #[serde(default)]
    pub position: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<ProjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<UserId>,
    /// Kept verbatim; the backend does not promise a timezone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Task {
    /// Create a task with only the required fields set.
    pub fn new(id: TaskId, title: &str, column_id: ColumnId, position: u32) -> Self {
        Self {
            id,
            title: title.to_string(),
            description: None,
            column_id,
            position,
            project_id: None,
            priority: None,
            assigned_to: None,
            created_by: None,
            created_at: None,
        }
    }

    pub fn placement(&self) -> Placement {
        Placement::new(self.column_id, self.position)
    }

    pub fn set_placement(&mut self, placement: Placement) {
        self.column_id = placement.column_id;
        self.position = placement.position;
    }
}

/// Body for `POST /tasks`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTask {
    pub project_id: ProjectId,
    pub column_id: ColumnId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<UserId>,
}

impl NewTask {
    /// Build a creation request, rejecting blank titles.
    ///
    /// A blank description is sent as absent, not as an empty string.
    pub fn new(
        project_id: ProjectId,
        column_id: ColumnId,
        title: &str,
        description: Option<&str>,
    ) -> crate::Result<Self> {
        let title = title.trim();
        if title.is_empty() {
            return Err(crate::Error::Validation("Task title is required".to_string()));
        }
        Ok(Self {
            project_id,
            column_id,
            title: title.to_string(),
            description: description.and_then(non_blank),
            assigned_to: None,
        })
    }

    pub fn assigned_to(mut self, user: Option<UserId>) -> Self {
        self.assigned_to = user;
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = non_blank(description);
        self
    }
}

fn non_blank(text: &str) -> Option<String> {
    Some(text.trim()).filter(|t| !t.is_empty()).map(str::to_string)
}

/// Partial update body for `PUT /tasks/{id}`. Unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_id: Option<ColumnId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
}

impl TaskPatch {
    /// The body sent when a drop is persisted: `{column_id, position}`.
    pub fn placement(placement: Placement) -> Self {
        Self {
            column_id: Some(placement.column_id),
            position: Some(placement.position),
            ..Self::default()
        }
    }

    pub fn title(title: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            ..Self::default()
        }
    }

    /// An empty description clears it.
    pub fn description(description: &str) -> Self {
        Self {
            description: Some(description.trim().to_string()),
            ..Self::default()
        }
    }

    pub fn assign(user: UserId) -> Self {
        Self {
            assigned_to: Some(user),
            ..Self::default()
        }
    }

    /// Apply the set fields to a task.
    pub fn apply(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = Some(description.clone()).filter(|d| !d.is_empty());
        }
        if let Some(user) = self.assigned_to {
            task.assigned_to = Some(user);
        }
        if let Some(column_id) = self.column_id {
            task.column_id = column_id;
        }
        if let Some(position) = self.position {
            task.position = position;
        }
    }
}
