//! The state of one in-progress drag gesture.

use crate::core::{Placement, Task, TaskId};
use crate::{klog_debug, klog_trace};

use super::geometry::{Point, Rect};

/// The floating card drawn under the pointer while dragging.
#[derive(Debug, Clone, PartialEq)]
pub struct DragProxy {
    pub rect: Rect,
    pub title: String,
}

/// An open drag.
///
/// Owned by the engine while the gesture lasts. Taking it out of the engine
/// and letting it drop is the only way a drag ends, so the proxy goes away
/// with it on every path.
#[derive(Debug)]
pub struct DragSession {
    task_id: TaskId,
    origin: Placement,
    grab_offset: Point,
    proxy: DragProxy,
}

impl DragSession {
    /// Start dragging `task` whose card currently occupies `source`, grabbed
    /// at `pointer`. The proxy starts exactly on top of the card.
    pub fn open(task: &Task, source: Rect, pointer: Point) -> Self {
        klog_debug!(
            "DragSession::open task={} origin={} grab=({}, {})",
            task.id,
            task.placement(),
            pointer.x - source.x,
            pointer.y - source.y
        );
        Self {
            task_id: task.id,
            origin: task.placement(),
            grab_offset: Point::new(pointer.x - source.x, pointer.y - source.y),
            proxy: DragProxy {
                rect: source,
                title: task.title.clone(),
            },
        }
    }

    pub fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Where the task was when the drag began.
    pub fn origin(&self) -> Placement {
        self.origin
    }

    pub fn proxy(&self) -> &DragProxy {
        &self.proxy
    }

    /// Keep the grab point of the proxy under the pointer.
    pub fn track(&mut self, pointer: Point) {
        let origin = Point::new(pointer.x - self.grab_offset.x, pointer.y - self.grab_offset.y);
        self.proxy.rect = self.proxy.rect.moved_to(origin);
        klog_trace!("DragSession::track proxy=({}, {})", origin.x, origin.y);
    }
}

impl Drop for DragSession {
    fn drop(&mut self) {
        klog_debug!("DragSession closed task={}", self.task_id);
    }
}
