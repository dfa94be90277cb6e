//! Board geometry in terminal cells.
//!
//! Both the drawing code and mouse hit-testing go through [`BoardLayout`], so
//! a card is dropped exactly where it is drawn.

use ratatui::layout::Rect;

use crate::core::{BoardStore, ColumnId, TaskId};
use crate::engine::{self, Point, TaskElement};

pub const TITLE_HEIGHT: u16 = 1;
pub const STATUS_HEIGHT: u16 = 1;
pub const CARD_HEIGHT: u16 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardSlot {
    pub task_id: TaskId,
    pub area: Rect,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSlot {
    pub column_id: ColumnId,
    pub area: Rect,
    /// Cards that fit, top to bottom. The rest are not drawn.
    pub cards: Vec<CardSlot>,
    pub hidden: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BoardLayout {
    pub title: Rect,
    pub board: Rect,
    pub status: Rect,
    pub columns: Vec<ColumnSlot>,
}

impl BoardLayout {
    /// Lay out `columns` (each with its tasks in display order) on `area`.
    pub fn compute(area: Rect, columns: &[(ColumnId, Vec<TaskId>)]) -> Self {
        let title = Rect::new(area.x, area.y, area.width, TITLE_HEIGHT.min(area.height));
        let status_height = STATUS_HEIGHT.min(area.height.saturating_sub(title.height));
        let board = Rect::new(
            area.x,
            area.y + title.height,
            area.width,
            area.height
                .saturating_sub(title.height)
                .saturating_sub(status_height),
        );
        let status = Rect::new(area.x, board.bottom(), area.width, status_height);

        let count = columns.len() as u16;
        let slots = if count == 0 || board.width < count {
            Vec::new()
        } else {
            let width = board.width / count;
            columns
                .iter()
                .enumerate()
                .map(|(i, (column_id, tasks))| {
                    let x = board.x + width * i as u16;
                    let w = if i as u16 == count - 1 {
                        board.right() - x
                    } else {
                        width
                    };
                    column_slot(*column_id, Rect::new(x, board.y, w, board.height), tasks)
                })
                .collect()
        };

        Self {
            title,
            board,
            status,
            columns: slots,
        }
    }

    pub fn for_store(area: Rect, store: &BoardStore) -> Self {
        let columns: Vec<(ColumnId, Vec<TaskId>)> = store
            .columns()
            .iter()
            .map(|c| {
                let tasks = store.tasks_in_column(c.id).iter().map(|t| t.id).collect();
                (c.id, tasks)
            })
            .collect();
        Self::compute(area, &columns)
    }

    pub fn column(&self, id: ColumnId) -> Option<&ColumnSlot> {
        self.columns.iter().find(|c| c.column_id == id)
    }

    pub fn column_at(&self, x: u16, y: u16) -> Option<ColumnId> {
        self.columns
            .iter()
            .find(|c| contains(c.area, x, y))
            .map(|c| c.column_id)
    }

    pub fn card_at(&self, x: u16, y: u16) -> Option<&CardSlot> {
        self.columns
            .iter()
            .flat_map(|c| c.cards.iter())
            .find(|card| contains(card.area, x, y))
    }

    pub fn card(&self, task_id: TaskId) -> Option<&CardSlot> {
        self.columns
            .iter()
            .flat_map(|c| c.cards.iter())
            .find(|card| card.task_id == task_id)
    }

    /// Rendered cards of a column, as the drop computation wants them.
    pub fn elements(&self, column_id: ColumnId) -> Vec<TaskElement> {
        self.column(column_id)
            .map(|c| {
                c.cards
                    .iter()
                    .map(|card| TaskElement::new(card.task_id, to_engine_rect(card.area)))
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn column_slot(column_id: ColumnId, area: Rect, tasks: &[TaskId]) -> ColumnSlot {
    // Inside the column border.
    let inner = Rect::new(
        area.x + 1,
        area.y + 1,
        area.width.saturating_sub(2),
        area.height.saturating_sub(2),
    );
    let fits = (inner.height / CARD_HEIGHT) as usize;
    let cards: Vec<CardSlot> = tasks
        .iter()
        .take(fits)
        .enumerate()
        .map(|(i, task_id)| CardSlot {
            task_id: *task_id,
            area: Rect::new(inner.x, inner.y + CARD_HEIGHT * i as u16, inner.width, CARD_HEIGHT),
        })
        .collect();
    ColumnSlot {
        column_id,
        area,
        hidden: tasks.len() - cards.len(),
        cards,
    }
}

fn contains(area: Rect, x: u16, y: u16) -> bool {
    x >= area.x && x < area.right() && y >= area.y && y < area.bottom()
}

pub fn to_engine_rect(area: Rect) -> engine::Rect {
    engine::Rect::new(
        area.x as f64,
        area.y as f64,
        area.width as f64,
        area.height as f64,
    )
}

/// Cell under the mouse as an engine point.
pub fn pointer(column: u16, row: u16) -> Point {
    Point::new(column as f64, row as f64)
}

/// Clamp a floating proxy rect back onto the screen for drawing.
pub fn to_screen_rect(rect: engine::Rect, screen: Rect) -> Rect {
    let x = rect.x.max(screen.x as f64).min(screen.right().saturating_sub(1) as f64) as u16;
    let y = rect.y.max(screen.y as f64).min(screen.bottom().saturating_sub(1) as f64) as u16;
    let width = (rect.width as u16).min(screen.right().saturating_sub(x));
    let height = (rect.height as u16).min(screen.bottom().saturating_sub(y));
    Rect::new(x, y, width, height)
}
