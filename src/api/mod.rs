//! Backend access.
//!
//! [`BoardApi`] is everything the board needs from the server. The TUI and
//! the reorder flow only ever see `Arc<dyn BoardApi>`, so the HTTP client and
//! the in-memory backend are interchangeable.

pub mod auth;
pub mod http;
pub mod memory;

use async_trait::async_trait;

use crate::core::{
    Column, ColumnId, ColumnUpdate, NewColumn, NewProject, NewTask, Placement, Project, ProjectId,
    ProjectSnapshot, Task, TaskId, TaskPatch,
};
use crate::Result;

pub use auth::{Credentials, LoginResponse, ProfileUpdate, Registration};
pub use http::HttpBoardApi;
pub use memory::MemoryBoardApi;

#[async_trait]
pub trait BoardApi: Send + Sync {
    /// Project, columns and tasks of one board.
    async fn fetch_project_snapshot(&self, project_id: ProjectId) -> Result<ProjectSnapshot>;

    /// Store a task's column and position. Returns the task as saved.
    async fn update_task_placement(&self, task_id: TaskId, placement: Placement) -> Result<Task>;

    async fn fetch_tasks(&self, project_id: ProjectId) -> Result<Vec<Task>>;

    async fn list_projects(&self) -> Result<Vec<Project>>;

    async fn create_project(&self, project: NewProject) -> Result<Project>;

    async fn delete_project(&self, project_id: ProjectId) -> Result<()>;

    async fn create_column(&self, column: NewColumn) -> Result<Column>;

    async fn update_column(&self, column_id: ColumnId, update: ColumnUpdate) -> Result<Column>;

    /// Deletes the column and every task in it.
    async fn delete_column(&self, column_id: ColumnId) -> Result<()>;

    async fn create_task(&self, task: NewTask) -> Result<Task>;

    async fn update_task(&self, task_id: TaskId, patch: TaskPatch) -> Result<Task>;

    async fn delete_task(&self, task_id: TaskId) -> Result<()>;
}
