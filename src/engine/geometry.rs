//! Screen geometry used by drag tracking and drop hit-testing.
//!
//! Coordinates are in whatever unit the input source reports (terminal
//! cells for the TUI). They are floats so midpoints of odd-height cards are
//! exact.

use crate::core::TaskId;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Some platforms report `(0, 0)` for the first motion event of a drag.
    pub fn is_degenerate(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn mid_y(&self) -> f64 {
        self.y + self.height / 2.0
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.x + self.width && p.y >= self.y && p.y < self.y + self.height
    }

    /// Same size, new top-left corner.
    pub fn moved_to(&self, origin: Point) -> Self {
        Self {
            x: origin.x,
            y: origin.y,
            ..*self
        }
    }
}

/// A rendered task card: which task it shows and where it is on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaskElement {
    pub task_id: TaskId,
    pub rect: Rect,
}

impl TaskElement {
    pub fn new(task_id: TaskId, rect: Rect) -> Self {
        Self { task_id, rect }
    }
}
