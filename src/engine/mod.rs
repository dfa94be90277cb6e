//! Drag-and-drop reordering of task cards.

pub mod drop_target;
pub mod geometry;
pub mod reorder;
pub mod session;

pub use drop_target::{compute_drop_target, DropTarget};
pub use geometry::{Point, Rect, TaskElement};
pub use reorder::{DropOutcome, FailureResolution, PendingPlacement, ReorderEngine};
pub use session::{DragProxy, DragSession};
