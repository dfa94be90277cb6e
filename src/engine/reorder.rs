//! The drag-and-drop reorder engine.
//!
//! The engine turns pointer gestures into placements: it tracks one drag at a
//! time, resolves the drop point, applies the move to the [`BoardStore`]
//! before anything is sent to the backend, and decides what to do with the
//! local state when the backend answers.
//!
//! Lifecycle: `Idle -> Dragging -> Idle`. A drag ends through
//! [`commit_drop`](ReorderEngine::commit_drop),
//! [`on_drop`](ReorderEngine::on_drop) or
//! [`cancel_drag`](ReorderEngine::cancel_drag); all of them take the session
//! out of the engine first.

use crate::config::PersistFailurePolicy;
use crate::core::{BoardStore, ColumnId, MoveRecord, Placement, ProjectSnapshot, Task, TaskId};
use crate::{klog, klog_debug, klog_warn, Error, Result};

use super::drop_target::{compute_drop_target, DropTarget};
use super::geometry::{Point, Rect, TaskElement};
use super::session::{DragProxy, DragSession};

/// A placement applied locally and not yet confirmed by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingPlacement {
    record: MoveRecord,
}

impl PendingPlacement {
    pub fn task_id(&self) -> TaskId {
        self.record.task_id
    }

    /// Where the task was when its drag began.
    pub fn from(&self) -> Placement {
        self.record.from
    }

    /// Where the task is now, and what the backend is asked to store.
    pub fn to(&self) -> Placement {
        self.record.to
    }

    pub fn record(&self) -> &MoveRecord {
        &self.record
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    /// Dropped back where it started. Nothing to persist.
    Unchanged,
    /// The store already shows the new placement; persist it.
    Moved(PendingPlacement),
}

/// What the engine did with a placement the backend rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureResolution {
    /// The task and its displaced siblings are back where they were.
    RolledBack,
    /// The optimistic placement stays.
    Kept,
    /// Local state moved on since the drop; only a refresh can fix it.
    NeedsRefresh,
}

#[derive(Debug, Default)]
pub struct ReorderEngine {
    session: Option<DragSession>,
    policy: PersistFailurePolicy,
    issued_refresh: u64,
    applied_refresh: u64,
}

impl ReorderEngine {
    pub fn new(policy: PersistFailurePolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn policy(&self) -> PersistFailurePolicy {
        self.policy
    }

    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    pub fn dragged_task(&self) -> Option<TaskId> {
        self.session.as_ref().map(DragSession::task_id)
    }

    pub fn proxy(&self) -> Option<&DragProxy> {
        self.session.as_ref().map(DragSession::proxy)
    }

    /// Start dragging `task_id`, whose card is drawn at `source`.
    pub fn begin_drag(
        &mut self,
        store: &BoardStore,
        task_id: TaskId,
        source: Rect,
        pointer: Point,
    ) -> Result<()> {
        if let Some(active) = &self.session {
            return Err(Error::ConcurrentDrag {
                active: active.task_id(),
                requested: task_id,
            });
        }
        let task = store.task(task_id).ok_or(Error::TaskNotFound(task_id))?;
        self.session = Some(DragSession::open(task, source, pointer));
        Ok(())
    }

    /// Move the proxy with the pointer.
    pub fn update_drag_position(&mut self, pointer: Point) {
        if pointer.is_degenerate() {
            return;
        }
        if let Some(session) = self.session.as_mut() {
            session.track(pointer);
        }
    }

    /// Resolve the drop point of the current drag.
    pub fn compute_drop_target(
        &self,
        store: &BoardStore,
        column_id: ColumnId,
        cursor_y: f64,
        elements: &[TaskElement],
    ) -> Result<DropTarget> {
        let dragged = self.dragged_task().ok_or(Error::NotDragging)?;
        compute_drop_target(store, dragged, column_id, cursor_y, elements)
    }

    /// End the drag of `task_id` by placing it at `target`.
    ///
    /// The store is updated before this returns; the caller persists the
    /// returned placement afterwards.
    pub fn commit_drop(
        &mut self,
        store: &mut BoardStore,
        task_id: TaskId,
        target: DropTarget,
    ) -> Result<DropOutcome> {
        let session = self.session.take().ok_or(Error::NoDragSession(task_id))?;
        if session.task_id() != task_id {
            return Err(Error::NoDragSession(task_id));
        }

        let current = store.placement_of(task_id).ok_or(Error::TaskNotFound(task_id))?;
        if current.column_id == target.column_id
            && store.index_in_column(task_id) == Some(target.index)
        {
            klog_debug!("commit_drop: task {} dropped in place", task_id);
            return Ok(DropOutcome::Unchanged);
        }

        let mut record =
            store.insert_task(task_id, target.column_id, target.index, target.position)?;
        // Rollback goes back to where the drag picked the task up.
        if record.from != session.origin() {
            klog_warn!(
                "Task {} moved to {} during its drag; rollback target stays {}",
                task_id,
                record.from,
                session.origin()
            );
            record.from = session.origin();
        }
        klog!(
            "Moved task {} from {} to {} (displaced {})",
            task_id,
            record.from,
            record.to,
            record.displaced.len()
        );
        Ok(DropOutcome::Moved(PendingPlacement { record }))
    }

    /// Drop the dragged card at `pointer` over `column_id`. No column means
    /// the pointer was released outside the board, which cancels the drag.
    pub fn on_drop(
        &mut self,
        store: &mut BoardStore,
        column_id: Option<ColumnId>,
        pointer: Point,
        elements: &[TaskElement],
    ) -> Result<DropOutcome> {
        let Some(task_id) = self.dragged_task() else {
            return Err(Error::NotDragging);
        };
        let Some(column_id) = column_id else {
            self.cancel_drag();
            return Ok(DropOutcome::Unchanged);
        };
        match self.compute_drop_target(store, column_id, pointer.y, elements) {
            Ok(target) => self.commit_drop(store, task_id, target),
            Err(e) => {
                self.cancel_drag();
                Err(e)
            }
        }
    }

    /// Abandon the current drag. Never touches the store.
    pub fn cancel_drag(&mut self) {
        if let Some(session) = self.session.take() {
            klog_debug!("Drag of task {} cancelled", session.task_id());
        }
    }

    /// Apply the failure policy to a placement the backend did not accept.
    pub fn persist_failed(
        &self,
        store: &mut BoardStore,
        pending: &PendingPlacement,
    ) -> FailureResolution {
        match self.policy {
            PersistFailurePolicy::Keep => {
                klog_warn!(
                    "Keeping unsaved placement of task {} at {}",
                    pending.task_id(),
                    pending.to()
                );
                FailureResolution::Kept
            }
            PersistFailurePolicy::Rollback => {
                if store.restore(pending.record()) {
                    klog_warn!(
                        "Rolled task {} back to {}",
                        pending.task_id(),
                        pending.from()
                    );
                    FailureResolution::RolledBack
                } else {
                    klog_warn!(
                        "Task {} moved since its drop; refreshing instead of rolling back",
                        pending.task_id()
                    );
                    FailureResolution::NeedsRefresh
                }
            }
        }
    }

    /// Number the next refresh. Responses are applied in this order only.
    pub fn next_refresh_seq(&mut self) -> u64 {
        self.issued_refresh += 1;
        self.issued_refresh
    }

    pub fn last_applied_refresh(&self) -> u64 {
        self.applied_refresh
    }

    fn accept_refresh(&mut self, seq: u64) -> Result<()> {
        if seq <= self.applied_refresh {
            return Err(Error::StaleReconciliation {
                received: seq,
                latest: self.applied_refresh,
            });
        }
        self.applied_refresh = seq;
        Ok(())
    }

    /// Replace local tasks with a fetched list, unless a newer refresh has
    /// already been applied.
    pub fn apply_refresh(&mut self, store: &mut BoardStore, seq: u64, tasks: Vec<Task>) -> Result<()> {
        self.accept_refresh(seq)?;
        klog_debug!("Applying refresh #{} ({} tasks)", seq, tasks.len());
        store.replace_tasks(tasks);
        Ok(())
    }

    /// Same as [`apply_refresh`](Self::apply_refresh) for a whole snapshot.
    pub fn apply_snapshot(
        &mut self,
        store: &mut BoardStore,
        seq: u64,
        snapshot: ProjectSnapshot,
    ) -> Result<()> {
        self.accept_refresh(seq)?;
        klog_debug!(
            "Applying snapshot #{} ({} columns, {} tasks)",
            seq,
            snapshot.columns.len(),
            snapshot.tasks.len()
        );
        store.replace_snapshot(snapshot);
        Ok(())
    }
}
