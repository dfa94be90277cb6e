//! Where a dragged card lands.

use crate::core::{BoardStore, ColumnId, Placement, TaskId};
use crate::{Error, Result};

use super::geometry::TaskElement;

/// The resolved insertion point for a drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropTarget {
    pub column_id: ColumnId,
    /// Position the dragged task will take.
    pub position: u32,
    /// Insertion index in the column's order without the dragged task.
    pub index: usize,
}

impl DropTarget {
    pub fn placement(&self) -> Placement {
        Placement::new(self.column_id, self.position)
    }
}

/// Resolve the drop point of `dragged` in `column_id` for a cursor at
/// `cursor_y`.
///
/// `elements` are the cards as rendered, top to bottom. The first one
/// (other than the dragged card) belonging to the column whose vertical
/// midpoint lies below the cursor is the card the task is inserted before,
/// and the task takes over its position. Past the last midpoint the task
/// goes to the end: one past the last position (saturating; the store
/// renumbers a full column), or 0 in an empty column.
pub fn compute_drop_target(
    store: &BoardStore,
    dragged: TaskId,
    column_id: ColumnId,
    cursor_y: f64,
    elements: &[TaskElement],
) -> Result<DropTarget> {
    if store.column(column_id).is_none() {
        return Err(Error::ColumnNotFound(column_id));
    }

    let siblings: Vec<(TaskId, u32)> = store
        .tasks_in_column(column_id)
        .iter()
        .filter(|t| t.id != dragged)
        .map(|t| (t.id, t.position))
        .collect();

    let hit = elements
        .iter()
        .filter(|e| e.task_id != dragged)
        .filter_map(|e| {
            let index = siblings.iter().position(|(id, _)| *id == e.task_id)?;
            Some((index, e))
        })
        .find(|(_, e)| e.rect.mid_y() > cursor_y);

    let (position, index) = match hit {
        Some((index, _)) => (siblings[index].1, index),
        None => match siblings.last() {
            Some((_, last)) => (last.saturating_add(1), siblings.len()),
            None => (0, 0),
        },
    };

    Ok(DropTarget {
        column_id,
        position,
        index,
    })
}
