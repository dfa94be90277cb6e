//! An in-process backend.
//!
//! Behaves like the real server for everything the client relies on:
//! placements renumber the affected columns, deleting a column deletes its
//! tasks, new tasks go to the end of their column. Used by `kanban demo` and
//! by tests, which can also make placement updates fail on purpose.

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use super::BoardApi;
use crate::core::{
    Column, ColumnId, ColumnUpdate, NewColumn, NewProject, NewTask, Placement, Project, ProjectId,
    ProjectSnapshot, Task, TaskId, TaskPatch, User, UserId,
};
use crate::{klog_debug, Error, Result};

#[derive(Debug, Default)]
struct ServerState {
    projects: Vec<Project>,
    columns: Vec<Column>,
    tasks: Vec<Task>,
    next_id: u64,
    failing_placements: usize,
    placement_calls: usize,
}

impl ServerState {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn project(&self, id: ProjectId) -> Result<&Project> {
        self.projects
            .iter()
            .find(|p| p.id == id)
            .ok_or(Error::ProjectNotFound(id))
    }

    fn column_project(&self, id: ColumnId) -> Result<Option<ProjectId>> {
        self.columns
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.project_id)
            .ok_or(Error::ColumnNotFound(id))
    }

    fn task_mut(&mut self, id: TaskId) -> Result<&mut Task> {
        self.tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(Error::TaskNotFound(id))
    }

    /// Ids of a column's tasks in order, excluding `skip`.
    fn column_order(&self, column_id: ColumnId, skip: TaskId) -> Vec<TaskId> {
        let mut tasks: Vec<&Task> = self
            .tasks
            .iter()
            .filter(|t| t.column_id == column_id && t.id != skip)
            .collect();
        tasks.sort_by_key(|t| t.position);
        tasks.into_iter().map(|t| t.id).collect()
    }

    fn renumber(&mut self, order: &[TaskId]) {
        for (position, id) in order.iter().enumerate() {
            if let Ok(task) = self.task_mut(*id) {
                task.position = position as u32;
            }
        }
    }

    /// Put a task before the first task of the column at or past `position`,
    /// then number both columns from 0.
    fn place(&mut self, task_id: TaskId, to: Placement) -> Result<Task> {
        self.column_project(to.column_id)?;
        let from = self.task_mut(task_id)?.column_id;

        let mut order = self.column_order(to.column_id, task_id);
        let index = order
            .iter()
            .position(|id| {
                self.tasks
                    .iter()
                    .any(|t| t.id == *id && t.position >= to.position)
            })
            .unwrap_or(order.len());
        order.insert(index, task_id);

        self.task_mut(task_id)?.column_id = to.column_id;
        self.renumber(&order);
        if from != to.column_id {
            let old = self.column_order(from, task_id);
            self.renumber(&old);
        }
        Ok(self.task_mut(task_id)?.clone())
    }
}

#[derive(Debug, Default)]
pub struct MemoryBoardApi {
    state: Mutex<ServerState>,
    latency: Option<Duration>,
}

impl MemoryBoardApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every call by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// The user `kanban demo` runs as.
    pub fn demo_user() -> User {
        User {
            id: UserId(1),
            email: "you@example.com".to_string(),
            first_name: Some("Demo".to_string()),
            last_name: Some("User".to_string()),
        }
    }

    /// A board with a few columns and tasks to play with.
    pub fn demo() -> (Self, ProjectId) {
        let api = Self::new();
        let project = api.seed_project("Demo board", &["To Do", "In Progress", "Review", "Done"]);
        api.seed_member(project, Self::demo_user());
        api.seed_member(
            project,
            User {
                id: UserId(2),
                email: "sam@example.com".to_string(),
                first_name: Some("Sam".to_string()),
                last_name: None,
            },
        );
        let columns: Vec<ColumnId> = api.columns_of(project).iter().map(|c| c.id).collect();
        let cards: [(usize, &str); 9] = [
            (0, "Write release notes"),
            (0, "Triage bug reports"),
            (0, "Update dependencies"),
            (0, "Plan next sprint"),
            (1, "Drag and drop cards"),
            (1, "Keyboard shortcuts"),
            (2, "Column reordering"),
            (3, "Project setup"),
            (3, "Login screen"),
        ];
        for (column, title) in cards {
            api.seed_task(project, columns[column], title);
        }
        (api, project)
    }

    fn lock(&self) -> MutexGuard<'_, ServerState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    async fn delay(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    /// Create a project with the given columns directly.
    pub fn seed_project(&self, name: &str, columns: &[&str]) -> ProjectId {
        let mut state = self.lock();
        let id = ProjectId(state.next_id());
        state.projects.push(Project::new(id, name));
        for (position, column) in columns.iter().enumerate() {
            let mut column = Column::new(ColumnId(state.next_id()), column, position as u32);
            column.project_id = Some(id);
            state.columns.push(column);
        }
        id
    }

    pub fn seed_member(&self, project_id: ProjectId, user: User) {
        let mut state = self.lock();
        if let Some(project) = state.projects.iter_mut().find(|p| p.id == project_id) {
            project.users.push(user);
        }
    }

    /// Append a task to a column directly.
    pub fn seed_task(&self, project_id: ProjectId, column_id: ColumnId, title: &str) -> TaskId {
        let mut state = self.lock();
        let id = TaskId(state.next_id());
        let position = state.column_order(column_id, id).len() as u32;
        let mut task = Task::new(id, title, column_id, position);
        task.project_id = Some(project_id);
        state.tasks.push(task);
        id
    }

    pub fn columns_of(&self, project_id: ProjectId) -> Vec<Column> {
        let mut columns: Vec<Column> = self
            .lock()
            .columns
            .iter()
            .filter(|c| c.project_id == Some(project_id))
            .cloned()
            .collect();
        columns.sort_by_key(|c| c.position);
        columns
    }

    /// The server's copy of a task.
    pub fn stored_task(&self, task_id: TaskId) -> Option<Task> {
        self.lock().tasks.iter().find(|t| t.id == task_id).cloned()
    }

    /// Make the next `count` placement updates fail.
    pub fn fail_next_placements(&self, count: usize) {
        self.lock().failing_placements = count;
    }

    pub fn placement_calls(&self) -> usize {
        self.lock().placement_calls
    }

    fn tasks_of(state: &ServerState, project_id: ProjectId) -> Vec<Task> {
        state
            .tasks
            .iter()
            .filter(|t| t.project_id == Some(project_id))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl BoardApi for MemoryBoardApi {
    async fn fetch_project_snapshot(&self, project_id: ProjectId) -> Result<ProjectSnapshot> {
        self.delay().await;
        let state = self.lock();
        let project = state.project(project_id)?.clone();
        let columns = state
            .columns
            .iter()
            .filter(|c| c.project_id == Some(project_id))
            .cloned()
            .collect();
        Ok(ProjectSnapshot {
            project: Some(project),
            columns,
            tasks: Self::tasks_of(&state, project_id),
        })
    }

    async fn update_task_placement(&self, task_id: TaskId, placement: Placement) -> Result<Task> {
        self.delay().await;
        let mut state = self.lock();
        state.placement_calls += 1;
        if state.failing_placements > 0 {
            state.failing_placements -= 1;
            klog_debug!("MemoryBoardApi: failing placement of task {}", task_id);
            return Err(Error::Api {
                status: 503,
                detail: "Service unavailable".to_string(),
            });
        }
        state.place(task_id, placement)
    }

    async fn fetch_tasks(&self, project_id: ProjectId) -> Result<Vec<Task>> {
        self.delay().await;
        let state = self.lock();
        state.project(project_id)?;
        Ok(Self::tasks_of(&state, project_id))
    }

    async fn list_projects(&self) -> Result<Vec<Project>> {
        self.delay().await;
        Ok(self.lock().projects.clone())
    }

    async fn create_project(&self, project: NewProject) -> Result<Project> {
        self.delay().await;
        let columns: Vec<&str> = project.columns.iter().map(String::as_str).collect();
        let id = self.seed_project(&project.name, &columns);
        let state = self.lock();
        Ok(state.project(id)?.clone())
    }

    async fn delete_project(&self, project_id: ProjectId) -> Result<()> {
        self.delay().await;
        let mut state = self.lock();
        state.project(project_id)?;
        state.projects.retain(|p| p.id != project_id);
        state.columns.retain(|c| c.project_id != Some(project_id));
        state.tasks.retain(|t| t.project_id != Some(project_id));
        Ok(())
    }

    async fn create_column(&self, column: NewColumn) -> Result<Column> {
        self.delay().await;
        let mut state = self.lock();
        state.project(column.project_id)?;
        let position = state
            .columns
            .iter()
            .filter(|c| c.project_id == Some(column.project_id))
            .map(|c| c.position + 1)
            .max()
            .unwrap_or(0);
        let mut created = Column::new(ColumnId(state.next_id()), &column.name, position);
        created.project_id = Some(column.project_id);
        state.columns.push(created.clone());
        Ok(created)
    }

    async fn update_column(&self, column_id: ColumnId, update: ColumnUpdate) -> Result<Column> {
        self.delay().await;
        let mut state = self.lock();
        let column = state
            .columns
            .iter_mut()
            .find(|c| c.id == column_id)
            .ok_or(Error::ColumnNotFound(column_id))?;
        column.name = update.name;
        column.position = update.position;
        Ok(column.clone())
    }

    async fn delete_column(&self, column_id: ColumnId) -> Result<()> {
        self.delay().await;
        let mut state = self.lock();
        state.column_project(column_id)?;
        state.columns.retain(|c| c.id != column_id);
        state.tasks.retain(|t| t.column_id != column_id);
        Ok(())
    }

    async fn create_task(&self, task: NewTask) -> Result<Task> {
        self.delay().await;
        let mut state = self.lock();
        if state.column_project(task.column_id)? != Some(task.project_id) {
            return Err(Error::Api {
                status: 400,
                detail: "Column does not belong to project".to_string(),
            });
        }
        let id = TaskId(state.next_id());
        let position = state.column_order(task.column_id, id).len() as u32;
        let mut created = Task::new(id, &task.title, task.column_id, position);
        created.description = task.description;
        created.assigned_to = task.assigned_to;
        created.project_id = Some(task.project_id);
        state.tasks.push(created.clone());
        Ok(created)
    }

    async fn update_task(&self, task_id: TaskId, patch: TaskPatch) -> Result<Task> {
        self.delay().await;
        let mut state = self.lock();
        let current = state.task_mut(task_id)?.placement();
        if patch.column_id.is_some() || patch.position.is_some() {
            let to = Placement::new(
                patch.column_id.unwrap_or(current.column_id),
                patch.position.unwrap_or(current.position),
            );
            state.place(task_id, to)?;
        }
        let task = state.task_mut(task_id)?;
        let placement = task.placement();
        patch.apply(task);
        task.set_placement(placement);
        Ok(task.clone())
    }

    async fn delete_task(&self, task_id: TaskId) -> Result<()> {
        self.delay().await;
        let mut state = self.lock();
        state.task_mut(task_id)?;
        state.tasks.retain(|t| t.id != task_id);
        Ok(())
    }
}
