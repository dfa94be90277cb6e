//! Model for the TEA (The Elm Architecture) pattern.
//!
//! The Model is pure application state - no channels, no handles, no runtime
//! infrastructure. It owns the board store and the reorder engine.

use ratatui::layout::Rect;

use crate::config::Config;
use crate::core::{BoardStore, ColumnId, NewTask, ProjectId, TaskId, User};
use crate::engine::ReorderEngine;
use crate::layout::BoardLayout;
use crate::render::{next_version, ColumnView, RenderState, TaskView};

/// Level of a notification message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    /// Displayed in red with "Error:" prefix
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Board,
    Input(InputKind),
}

/// Types of input prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    NewTask,
    /// Second step of task creation; may be left empty.
    NewTaskDescription,
    EditTask,
    EditDescription,
    AssignTask,
    NewColumn,
    RenameColumn,
    Confirm,
}

impl InputKind {
    pub fn label(&self) -> &'static str {
        match self {
            InputKind::NewTask => "New task",
            InputKind::NewTaskDescription => "Description (optional)",
            InputKind::EditTask => "Title",
            InputKind::EditDescription => "Description",
            InputKind::AssignTask => "Assignee (email or name)",
            InputKind::NewColumn => "New column",
            InputKind::RenameColumn => "Column name",
            InputKind::Confirm => "Delete? (y/n)",
        }
    }
}

/// What a confirmation prompt will delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingDelete {
    Task(TaskId),
    Column(ColumnId),
}

pub struct Model {
    pub project_id: ProjectId,
    pub store: BoardStore,
    pub engine: ReorderEngine,

    // Terminal area, for hit-testing mouse events
    pub viewport: Rect,

    pub selected_column: usize,
    pub selected_task: usize,
    pub mode: Mode,

    // Input state
    pub input_buffer: String,
    pub notification: Option<Notification>,
    pub pending_delete: Option<PendingDelete>,
    /// Task targeted by a title, description or assignee prompt
    pub pending_edit: Option<TaskId>,
    pub pending_column: Option<ColumnId>,
    /// Task being created, waiting for its description
    pub draft_task: Option<NewTask>,

    /// Whether the keymap legend is expanded (toggled by '?')
    pub show_keymap: bool,
    pub loading: bool,
    /// Sequence number of the latest full board load
    pub load_seq: u64,

    /// Logged-in user; default assignee of new tasks
    pub current_user: Option<User>,

    // Dirty flag - set when state changes and render is needed
    pub dirty: bool,

    pub config: Config,
    pub backend_label: String,
}

impl Model {
    pub fn new(project_id: ProjectId, config: Config, backend_label: &str) -> Self {
        Self {
            project_id,
            store: BoardStore::new(),
            engine: ReorderEngine::new(config.on_persist_failure),
            viewport: Rect::default(),
            selected_column: 0,
            selected_task: 0,
            mode: Mode::default(),
            input_buffer: String::new(),
            notification: None,
            pending_delete: None,
            pending_edit: None,
            pending_column: None,
            draft_task: None,
            show_keymap: false,
            loading: false,
            load_seq: 0,
            current_user: None,
            dirty: true,
            config,
            backend_label: backend_label.to_string(),
        }
    }

    pub fn with_user(mut self, user: Option<User>) -> Self {
        self.current_user = user;
        self
    }

    /// Number a full board load and mark the board as loading until the
    /// response for this number arrives.
    pub fn begin_load(&mut self) -> u64 {
        let seq = self.engine.next_refresh_seq();
        self.load_seq = seq;
        self.loading = true;
        seq
    }

    /// Project members, plus the logged-in user when the project does not
    /// list them.
    pub fn assignable_users(&self) -> Vec<&User> {
        let mut users: Vec<&User> = self
            .store
            .project()
            .map(|p| p.users.iter().collect())
            .unwrap_or_default();
        if let Some(me) = &self.current_user {
            if !users.iter().any(|u| u.id == me.id) {
                users.push(me);
            }
        }
        users
    }

    /// The assignable user whose email or full name is `query`, ignoring case.
    pub fn find_assignee(&self, query: &str) -> Option<&User> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return None;
        }
        self.assignable_users().into_iter().find(|u| {
            u.email.to_lowercase() == query || u.display_name().to_lowercase() == query
        })
    }

    pub fn layout(&self) -> BoardLayout {
        BoardLayout::for_store(self.viewport, &self.store)
    }

    pub fn selected_column_id(&self) -> Option<ColumnId> {
        self.store.columns().get(self.selected_column).map(|c| c.id)
    }

    pub fn selected_task_id(&self) -> Option<TaskId> {
        let column = self.selected_column_id()?;
        self.store
            .tasks_in_column(column)
            .get(self.selected_task)
            .map(|t| t.id)
    }

    /// Move the selection onto `task_id`, wherever it now is.
    pub fn select_task(&mut self, task_id: TaskId) {
        let Some(column_id) = self.store.placement_of(task_id).map(|p| p.column_id) else {
            return;
        };
        if let Some(column) = self.store.columns().iter().position(|c| c.id == column_id) {
            self.selected_column = column;
        }
        if let Some(index) = self.store.index_in_column(task_id) {
            self.selected_task = index;
        }
    }

    pub fn select_column(&mut self, column_id: ColumnId) {
        if let Some(column) = self.store.columns().iter().position(|c| c.id == column_id) {
            self.selected_column = column;
            self.clamp_selection();
        }
    }

    /// Keep the selection inside the board after it changed shape.
    pub fn clamp_selection(&mut self) {
        let columns = self.store.columns().len();
        self.selected_column = self.selected_column.min(columns.saturating_sub(1));
        let tasks = self
            .selected_column_id()
            .map(|c| self.store.tasks_in_column(c).len())
            .unwrap_or(0);
        self.selected_task = self.selected_task.min(tasks.saturating_sub(1));
    }

    /// Create an immutable snapshot for the render thread.
    pub fn snapshot(&self) -> RenderState {
        let dragged = self.engine.dragged_task();
        let columns = self
            .store
            .columns()
            .iter()
            .map(|c| ColumnView {
                id: c.id,
                name: c.name.clone(),
                tasks: self
                    .store
                    .tasks_in_column(c.id)
                    .iter()
                    .map(|t| TaskView {
                        id: t.id,
                        title: t.title.clone(),
                        description: t.description.clone(),
                        dragging: Some(t.id) == dragged,
                    })
                    .collect(),
            })
            .collect();

        RenderState {
            version: next_version(),
            project_name: self
                .store
                .project()
                .map(|p| p.name.clone())
                .unwrap_or_else(|| format!("Project {}", self.project_id)),
            backend: self.backend_label.clone(),
            columns,
            selected_column: self.selected_column,
            selected_task: self.selected_task,
            proxy: self.engine.proxy().cloned(),
            mode: self.mode,
            input_buffer: self.input_buffer.clone(),
            notification: self.notification.clone(),
            show_keymap: self.show_keymap,
            loading: self.loading,
        }
    }
}
