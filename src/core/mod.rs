//! Board domain types.
//!
//! This module contains the entities the backend serves (projects, columns,
//! tasks, users) and the client-side `BoardStore` that owns them.

pub mod column;
pub mod ids;
pub mod project;
pub mod store;
pub mod task;

pub use column::{Column, ColumnUpdate, NewColumn};
pub use ids::{ColumnId, ProjectId, TaskId, UserId};
pub use project::{NewProject, Project, ProjectSnapshot, User, DEFAULT_COLUMNS};
pub use store::{BoardStore, MoveRecord};
pub use task::{NewTask, Placement, Task, TaskPatch};
