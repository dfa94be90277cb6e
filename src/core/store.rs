//! In-memory board state.
//!
//! `BoardStore` is the single owner of the project's columns and tasks on the
//! client. It is fed by backend snapshots and mutated through the methods
//! below, both by the reorder engine (optimistic placements, rollbacks) and
//! by the refresh path (server truth replacing local state).

use super::column::Column;
use super::ids::{ColumnId, TaskId};
use super::project::{Project, ProjectSnapshot};
use super::task::{Placement, Task};
use crate::{klog_warn, Error, Result};

/// What a local placement changed, kept so it can be undone exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRecord {
    pub task_id: TaskId,
    pub from: Placement,
    pub to: Placement,
    /// Siblings pushed down one slot to make room, with their old positions.
    pub displaced: Vec<(TaskId, u32)>,
}

#[derive(Debug, Clone, Default)]
pub struct BoardStore {
    project: Option<Project>,
    columns: Vec<Column>,
    tasks: Vec<Task>,
}

impl BoardStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: ProjectSnapshot) -> Self {
        let mut store = Self::new();
        store.replace_snapshot(snapshot);
        store
    }

    pub fn replace_snapshot(&mut self, snapshot: ProjectSnapshot) {
        if snapshot.project.is_some() {
            self.project = snapshot.project;
        }
        self.columns = snapshot.columns;
        self.tasks = snapshot.tasks;
    }

    /// Replace every task with the server's list, keeping its order for ties.
    pub fn replace_tasks(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
    }

    pub fn project(&self) -> Option<&Project> {
        self.project.as_ref()
    }

    /// Columns ordered by position (ties keep received order).
    pub fn columns(&self) -> Vec<&Column> {
        let mut columns: Vec<&Column> = self.columns.iter().collect();
        columns.sort_by_key(|c| c.position);
        columns
    }

    pub fn column(&self, id: ColumnId) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == id)
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    fn task_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    /// Tasks of a column in display order: ascending position, ties broken by
    /// the order the tasks were received in.
    pub fn tasks_in_column(&self, column_id: ColumnId) -> Vec<&Task> {
        let mut tasks: Vec<&Task> = self
            .tasks
            .iter()
            .filter(|t| t.column_id == column_id)
            .collect();
        tasks.sort_by_key(|t| t.position);
        tasks
    }

    pub fn placement_of(&self, id: TaskId) -> Option<Placement> {
        self.task(id).map(Task::placement)
    }

    /// Index of a task within its column's display order.
    pub fn index_in_column(&self, id: TaskId) -> Option<usize> {
        let task = self.task(id)?;
        self.tasks_in_column(task.column_id)
            .iter()
            .position(|t| t.id == id)
    }

    /// Move a task to `to`, in front of the first sibling whose position is
    /// `>= to.position`.
    pub fn place_task(&mut self, id: TaskId, to: Placement) -> Result<MoveRecord> {
        let index = self
            .tasks_in_column(to.column_id)
            .iter()
            .filter(|t| t.id != id && t.position < to.position)
            .count();
        self.insert_task(id, to.column_id, index, to.position)
    }

    /// Insert a task at `index` of a column's display order (the order
    /// without the task itself) with the requested `position`.
    ///
    /// Siblings from `index` on are renumbered just enough to keep positions
    /// strictly increasing, so the moved task never ties with a neighbour.
    /// If the predecessor already holds `position` (a tie in server data)
    /// the task goes one past it instead. When that would run past
    /// `u32::MAX` the whole column is numbered from 0 instead.
    pub fn insert_task(
        &mut self,
        id: TaskId,
        column_id: ColumnId,
        index: usize,
        position: u32,
    ) -> Result<MoveRecord> {
        if self.column(column_id).is_none() {
            return Err(Error::ColumnNotFound(column_id));
        }
        let from = self.placement_of(id).ok_or(Error::TaskNotFound(id))?;

        let siblings: Vec<(TaskId, u32)> = self
            .tasks_in_column(column_id)
            .iter()
            .filter(|t| t.id != id)
            .map(|t| (t.id, t.position))
            .collect();
        let index = index.min(siblings.len());

        let (position, moves) = match plan_minimal(&siblings, index, position) {
            Some(plan) => plan,
            None => {
                klog_warn!("Column {} ran out of positions; renumbering from 0", column_id);
                plan_dense(&siblings, index)
            }
        };

        let mut displaced = Vec::with_capacity(moves.len());
        for (sibling, old, new) in moves {
            if let Some(task) = self.task_mut(sibling) {
                task.position = new;
            }
            displaced.push((sibling, old));
        }

        let to = Placement::new(column_id, position);
        if let Some(task) = self.task_mut(id) {
            task.set_placement(to);
        }

        Ok(MoveRecord {
            task_id: id,
            from,
            to,
            displaced,
        })
    }

    /// Undo a placement made by [`place_task`](Self::place_task).
    ///
    /// Only applies while the task is still where the record left it; once a
    /// refresh has replaced local state the record is meaningless and this
    /// returns `false` without touching anything.
    pub fn restore(&mut self, record: &MoveRecord) -> bool {
        if self.placement_of(record.task_id) != Some(record.to) {
            return false;
        }
        for (id, position) in &record.displaced {
            if let Some(task) = self.task_mut(*id) {
                if task.column_id == record.to.column_id {
                    task.position = *position;
                }
            }
        }
        if let Some(task) = self.task_mut(record.task_id) {
            task.set_placement(record.from);
        }
        true
    }

    pub fn upsert_task(&mut self, task: Task) {
        match self.task_mut(task.id) {
            Some(existing) => *existing = task,
            None => self.tasks.push(task),
        }
    }

    pub fn remove_task(&mut self, id: TaskId) -> Option<Task> {
        let index = self.tasks.iter().position(|t| t.id == id)?;
        Some(self.tasks.remove(index))
    }

    pub fn upsert_column(&mut self, column: Column) {
        match self.columns.iter_mut().find(|c| c.id == column.id) {
            Some(existing) => *existing = column,
            None => self.columns.push(column),
        }
    }

    /// Remove a column together with its tasks.
    pub fn remove_column(&mut self, id: ColumnId) -> Option<Column> {
        let index = self.columns.iter().position(|c| c.id == id)?;
        self.tasks.retain(|t| t.column_id != id);
        Some(self.columns.remove(index))
    }

    /// Swap a column with its left (`-1`) or right (`+1`) neighbour and
    /// renumber all columns `0..n`. Returns the new order, or `None` when the
    /// column is unknown or already at that edge.
    pub fn shift_column(&mut self, id: ColumnId, offset: isize) -> Option<Vec<Column>> {
        let mut ordered: Vec<Column> = self.columns().into_iter().cloned().collect();
        let index = ordered.iter().position(|c| c.id == id)?;
        let target = index.checked_add_signed(offset)?;
        if target >= ordered.len() {
            return None;
        }
        ordered.swap(index, target);
        for (position, column) in ordered.iter_mut().enumerate() {
            column.position = position as u32;
        }
        self.columns = ordered.clone();
        Some(ordered)
    }
}

/// A sibling renumbering: `(task, old position, new position)`.
type Moves = Vec<(TaskId, u32, u32)>;

/// Push siblings down only as far as needed. `None` on `u32` overflow.
fn plan_minimal(siblings: &[(TaskId, u32)], index: usize, position: u32) -> Option<(u32, Moves)> {
    let mut position = position;
    if let Some(&(_, before)) = index.checked_sub(1).and_then(|i| siblings.get(i)) {
        position = position.max(before.checked_add(1)?);
    }

    let mut moves = Vec::new();
    let mut floor = position;
    for &(sibling, old) in &siblings[index..] {
        if old <= floor {
            floor = floor.checked_add(1)?;
            moves.push((sibling, old, floor));
        } else {
            floor = old;
        }
    }
    Some((position, moves))
}

/// Number the column `0..n` with the task at `index`.
fn plan_dense(siblings: &[(TaskId, u32)], index: usize) -> (u32, Moves) {
    let moves = siblings
        .iter()
        .enumerate()
        .filter_map(|(i, &(sibling, old))| {
            let new = (if i < index { i } else { i + 1 }) as u32;
            (new != old).then_some((sibling, old, new))
        })
        .collect();
    (index as u32, moves)
}
