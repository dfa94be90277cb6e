//! Test fixtures for integration tests.
//!
//! Provides a [`Board`]: a model wired to a `MemoryBoardApi` through the real
//! `CommandRunner`, on a 60x20 terminal. Todo spans x 0..30 and Done 30..60;
//! cards are three rows tall starting at row 2.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use tokio::sync::mpsc;

use kanban_board::api::{BoardApi, MemoryBoardApi};
use kanban_board::app::{dispatch, CommandRunner};
use kanban_board::config::Config;
use kanban_board::core::{ColumnId, ProjectId, TaskId, User, UserId};
use kanban_board::tea::{Command, Message, Model};

pub const WIDTH: u16 = 60;
pub const HEIGHT: u16 = 20;

/// How long `settle` waits for another background message.
const QUIET: Duration = Duration::from_millis(300);

pub struct Board {
    pub api: Arc<MemoryBoardApi>,
    pub model: Model,
    pub project: ProjectId,
    pub todo: ColumnId,
    pub done: ColumnId,
    runner: CommandRunner,
    rx: mpsc::UnboundedReceiver<Message>,
}

impl Board {
    /// Seed the server with two columns and load the board.
    pub async fn new(todo: &[&str], done: &[&str]) -> Self {
        Self::with_options(todo, done, Config::default(), None).await
    }

    pub async fn with_options(
        todo: &[&str],
        done: &[&str],
        config: Config,
        latency: Option<Duration>,
    ) -> Self {
        let mut api = MemoryBoardApi::new();
        if let Some(latency) = latency {
            api = api.with_latency(latency);
        }
        let project = api.seed_project("Sprint", &["Todo", "Done"]);
        let columns = api.columns_of(project);
        let (todo_id, done_id) = (columns[0].id, columns[1].id);
        for title in todo {
            api.seed_task(project, todo_id, title);
        }
        for title in done {
            api.seed_task(project, done_id, title);
        }

        let api = Arc::new(api);
        let (tx, rx) = mpsc::unbounded_channel();
        let runner = CommandRunner::new(api.clone(), tx, Duration::from_secs(2));
        let mut model = Model::new(project, config, "memory");
        model.viewport = Rect::new(0, 0, WIDTH, HEIGHT);

        let mut board = Self {
            api,
            model,
            project,
            todo: todo_id,
            done: done_id,
            runner,
            rx,
        };
        board.reload();
        board.settle().await;
        board
    }

    /// Issue a full board load the way the app does at startup.
    pub fn reload(&mut self) {
        let seq = self.model.begin_load();
        self.run(Command::LoadBoard { seq });
    }

    pub fn run(&self, cmd: Command) {
        self.runner.execute(&self.model, cmd);
    }

    /// Feed a message through `update` and start its commands.
    pub fn send(&mut self, msg: Message) {
        dispatch(&mut self.model, msg, &self.runner);
    }

    /// Wait for the next background message without dispatching it.
    pub async fn next_message(&mut self) -> Option<Message> {
        tokio::time::timeout(Duration::from_secs(2), self.rx.recv())
            .await
            .ok()
            .flatten()
    }

    /// Dispatch background messages until the backend goes quiet.
    pub async fn settle(&mut self) {
        while let Ok(Some(msg)) = tokio::time::timeout(QUIET, self.rx.recv()).await {
            dispatch(&mut self.model, msg, &self.runner);
        }
    }

    pub fn press(&mut self, x: u16, y: u16) {
        self.send(mouse(MouseEventKind::Down(MouseButton::Left), x, y));
    }

    pub fn drag_to(&mut self, x: u16, y: u16) {
        self.send(mouse(MouseEventKind::Drag(MouseButton::Left), x, y));
    }

    pub fn release(&mut self, x: u16, y: u16) {
        self.send(mouse(MouseEventKind::Up(MouseButton::Left), x, y));
    }

    /// Grab the card titled `title` and release it at `(x, y)`.
    pub fn drag_and_drop(&mut self, title: &str, x: u16, y: u16) {
        let (from_x, from_y) = self.card_cell(title);
        self.press(from_x, from_y);
        self.drag_to(x, y);
        self.release(x, y);
    }

    pub fn key(&mut self, code: KeyCode) {
        self.send(Message::Key(KeyEvent::new(code, KeyModifiers::empty())));
    }

    pub fn type_text(&mut self, text: &str) {
        for c in text.chars() {
            self.key(KeyCode::Char(c));
        }
    }

    pub fn task_id(&self, title: &str) -> TaskId {
        self.model
            .store
            .tasks()
            .iter()
            .find(|t| t.title == title)
            .map(|t| t.id)
            .unwrap_or_else(|| panic!("no task titled {:?}", title))
    }

    /// A cell inside the drawn card titled `title`.
    pub fn card_cell(&self, title: &str) -> (u16, u16) {
        let id = self.task_id(title);
        let layout = self.model.layout();
        let card = layout
            .card(id)
            .unwrap_or_else(|| panic!("card {:?} is not drawn", title));
        (card.area.x + 2, card.area.y + 1)
    }

    /// Clear the prompt's prefilled text.
    pub fn clear_input(&mut self) {
        while !self.model.input_buffer.is_empty() {
            self.key(KeyCode::Backspace);
        }
    }

    pub fn local_order(&self, column: ColumnId) -> Vec<String> {
        self.model
            .store
            .tasks_in_column(column)
            .iter()
            .map(|t| t.title.clone())
            .collect()
    }

    pub async fn server_order(&self, column: ColumnId) -> Vec<String> {
        let mut tasks: Vec<_> = self
            .api
            .fetch_tasks(self.project)
            .await
            .unwrap()
            .into_iter()
            .filter(|t| t.column_id == column)
            .collect();
        tasks.sort_by_key(|t| t.position);
        tasks.into_iter().map(|t| t.title).collect()
    }
}

/// Column x ranges on the 60x20 board.
pub fn todo_x() -> u16 {
    5
}

pub fn done_x() -> u16 {
    35
}

/// A row just above the midpoint of the card at `index`, so a drop there
/// lands before that card.
pub fn row_before(index: u16) -> u16 {
    2 + 3 * index + 1
}

pub fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Message {
    Message::Mouse(MouseEvent {
        kind,
        column,
        row,
        modifiers: KeyModifiers::empty(),
    })
}

pub fn user(id: u64, email: &str) -> User {
    User {
        id: UserId(id),
        email: email.to_string(),
        first_name: None,
        last_name: None,
    }
}

pub fn titles(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}
