//! Commands for the TEA (The Elm Architecture) pattern.
//!
//! Commands are outputs from the update function: side effects the runtime
//! executes, usually by calling the backend on a spawned task.

use crate::core::{Column, ColumnId, ColumnUpdate, NewColumn, NewTask, TaskId, TaskPatch};
use crate::engine::PendingPlacement;

#[derive(Debug)]
pub enum Command {
    /// Fetch the whole board. `seq` orders it against other refreshes.
    LoadBoard {
        seq: u64,
    },
    RefreshTasks {
        seq: u64,
    },
    /// Store a placement already applied locally.
    PersistPlacement(PendingPlacement),

    CreateTask(NewTask),
    UpdateTask {
        id: TaskId,
        patch: TaskPatch,
    },
    DeleteTask(TaskId),

    CreateColumn(NewColumn),
    RenameColumn {
        id: ColumnId,
        update: ColumnUpdate,
    },
    /// Save the position of every column, in the given order.
    SaveColumnOrder(Vec<Column>),
    DeleteColumn(ColumnId),

    Quit,
}
