use crate::core::{ColumnId, TaskId};
use crate::engine::DragProxy;
use crate::tea::{Mode, Notification};
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, PartialEq)]
pub struct TaskView {
    pub id: TaskId,
    pub title: String,
    pub description: Option<String>,
    /// The card is the one being dragged; drawn dimmed under the proxy.
    pub dragging: bool,
}

/// A column and its cards in optimistic display order.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnView {
    pub id: ColumnId,
    pub name: String,
    pub tasks: Vec<TaskView>,
}

impl ColumnView {
    pub fn task_ids(&self) -> Vec<TaskId> {
        self.tasks.iter().map(|t| t.id).collect()
    }
}

static VERSION_COUNTER: AtomicU64 = AtomicU64::new(0);

pub fn next_version() -> u64 {
    VERSION_COUNTER.fetch_add(1, Ordering::Relaxed)
}

#[derive(Debug, Clone)]
pub struct RenderState {
    pub version: u64,
    pub project_name: String,
    pub backend: String,
    pub columns: Vec<ColumnView>,
    pub selected_column: usize,
    pub selected_task: usize,
    /// Floating card following the pointer during a drag.
    pub proxy: Option<DragProxy>,
    pub mode: Mode,
    pub input_buffer: String,
    pub notification: Option<Notification>,
    /// Whether the keymap legend is expanded (toggled by '?')
    pub show_keymap: bool,
    pub loading: bool,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            version: 0,
            project_name: String::new(),
            backend: String::new(),
            columns: Vec::new(),
            selected_column: 0,
            selected_task: 0,
            proxy: None,
            mode: Mode::Board,
            input_buffer: String::new(),
            notification: None,
            show_keymap: false,
            loading: false,
        }
    }
}

impl RenderState {
    /// Columns with their task ids, as [`BoardLayout`](crate::layout::BoardLayout) wants them.
    pub fn layout_columns(&self) -> Vec<(ColumnId, Vec<TaskId>)> {
        self.columns.iter().map(|c| (c.id, c.task_ids())).collect()
    }
}
