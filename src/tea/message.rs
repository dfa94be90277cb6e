//! Messages for the TEA (The Elm Architecture) pattern.
//!
//! Messages are inputs to the update function: terminal events, ticks from
//! background actors, and the results of commands.

use crossterm::event::{KeyEvent, MouseEvent};

use crate::core::{Column, ColumnId, ProjectSnapshot, Task, TaskId};
use crate::engine::PendingPlacement;

#[derive(Debug)]
pub enum Message {
    // Terminal events
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize(u16, u16),

    // From background actors
    RefreshTick,

    // Board loading and reconciliation
    BoardLoaded {
        seq: u64,
        snapshot: ProjectSnapshot,
    },
    TasksRefreshed {
        seq: u64,
        tasks: Vec<Task>,
    },
    /// A full board load failed.
    LoadFailed {
        seq: u64,
        error: String,
    },
    /// A task refresh failed.
    RefreshFailed(String),

    // Placement persistence
    PlacementPersisted(Task),
    PlacementFailed {
        pending: PendingPlacement,
        error: String,
    },

    // Task and column CRUD results
    TaskCreated(Task),
    TaskUpdated(Task),
    TaskDeleted(TaskId),
    ColumnCreated(Column),
    ColumnUpdated(Column),
    ColumnDeleted(ColumnId),
    ColumnOrderSaved,
    /// A CRUD command failed; `action` says what was attempted.
    OperationFailed {
        action: String,
        error: String,
    },
}
