//! Update function for the TEA (The Elm Architecture) pattern.
//!
//! The update function takes a model and a message, mutates the model,
//! and returns a list of commands to execute. All I/O happens via the
//! returned commands.

use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use crate::core::{ColumnUpdate, NewColumn, NewTask, TaskPatch};
use crate::engine::{DropOutcome, FailureResolution};
use crate::layout::{pointer, to_engine_rect};
use crate::{klog, klog_debug, klog_warn, Error};

use super::command::Command;
use super::message::Message;
use super::model::{InputKind, Mode, Model, Notification, PendingDelete};

fn set_error(model: &mut Model, message: String) {
    klog_warn!("UI Error: {}", message);
    model.notification = Some(Notification::error(message));
    model.dirty = true;
}

fn reload(model: &mut Model, cmds: &mut Vec<Command>) {
    cmds.push(Command::LoadBoard {
        seq: model.begin_load(),
    });
}

/// Only the answer to the latest load ends the loading state.
fn finish_load(model: &mut Model, seq: u64) {
    if seq == model.load_seq {
        model.loading = false;
    }
}

fn refresh_tasks(model: &mut Model, cmds: &mut Vec<Command>) {
    cmds.push(Command::RefreshTasks {
        seq: model.engine.next_refresh_seq(),
    });
}

pub fn update(model: &mut Model, msg: Message) -> Vec<Command> {
    let mut cmds = Vec::new();

    match msg {
        Message::Key(key) => {
            model.notification = None;
            model.dirty = true;
            match model.mode {
                Mode::Board => update_board_mode(model, key, &mut cmds),
                Mode::Input(kind) => update_input_mode(model, key, kind, &mut cmds),
            }
        }

        Message::Mouse(mouse) => update_mouse(model, mouse, &mut cmds),

        Message::Resize(width, height) => {
            model.viewport = Rect::new(0, 0, width, height);
            model.dirty = true;
        }

        Message::RefreshTick => {
            if model.engine.is_dragging() || model.loading {
                klog_debug!("RefreshTick skipped");
            } else {
                refresh_tasks(model, &mut cmds);
            }
        }

        Message::BoardLoaded { seq, snapshot } => {
            finish_load(model, seq);
            match model.engine.apply_snapshot(&mut model.store, seq, snapshot) {
                Ok(()) => {
                    klog_debug!(
                        "Board loaded: {} columns, {} tasks",
                        model.store.columns().len(),
                        model.store.tasks().len()
                    );
                    model.clamp_selection();
                }
                Err(e) => klog_debug!("{}", e),
            }
            model.dirty = true;
        }

        Message::TasksRefreshed { seq, tasks } => {
            match model.engine.apply_refresh(&mut model.store, seq, tasks) {
                Ok(()) => model.clamp_selection(),
                Err(e) => klog_debug!("{}", e),
            }
            model.dirty = true;
        }

        Message::LoadFailed { seq, error } => {
            if seq == model.load_seq {
                finish_load(model, seq);
                set_error(model, format!("Failed to load board: {}", error));
            } else {
                klog_debug!("Ignoring failure of superseded load #{}: {}", seq, error);
            }
        }

        Message::RefreshFailed(err) => {
            set_error(model, format!("Failed to refresh tasks: {}", err));
        }

        Message::PlacementPersisted(task) => {
            klog_debug!("Placement of task {} saved at {}", task.id, task.placement());
            refresh_tasks(model, &mut cmds);
        }

        Message::PlacementFailed { pending, error } => {
            let err = Error::Persistence {
                task_id: pending.task_id(),
                reason: error,
            };
            let title = model
                .store
                .task(pending.task_id())
                .map(|t| t.title.clone())
                .unwrap_or_else(|| pending.task_id().to_string());
            let outcome = match model.engine.persist_failed(&mut model.store, &pending) {
                FailureResolution::RolledBack => "moved back",
                FailureResolution::Kept => "kept locally",
                FailureResolution::NeedsRefresh => {
                    refresh_tasks(model, &mut cmds);
                    "reloading"
                }
            };
            klog_warn!("{}", err);
            model.clamp_selection();
            set_error(
                model,
                format!("Could not move '{}' ({}): {}", title, outcome, err),
            );
        }

        Message::TaskCreated(task) => {
            klog!("Task created: {} '{}'", task.id, task.title);
            let id = task.id;
            model.store.upsert_task(task);
            model.select_task(id);
            model.dirty = true;
        }

        Message::TaskUpdated(task) => {
            model.store.upsert_task(task);
            model.dirty = true;
        }

        Message::TaskDeleted(id) => {
            klog!("Task deleted: {}", id);
            model.store.remove_task(id);
            model.clamp_selection();
            model.dirty = true;
        }

        Message::ColumnCreated(column) => {
            klog!("Column created: {} '{}'", column.id, column.name);
            let id = column.id;
            model.store.upsert_column(column);
            model.select_column(id);
            model.dirty = true;
        }

        Message::ColumnUpdated(column) => {
            klog!("Column renamed: {} '{}'", column.id, column.name);
            model.store.upsert_column(column);
            model.dirty = true;
        }

        Message::ColumnDeleted(id) => {
            klog!("Column deleted: {}", id);
            model.store.remove_column(id);
            model.clamp_selection();
            model.dirty = true;
        }

        Message::ColumnOrderSaved => {
            klog_debug!("Column order saved");
        }

        Message::OperationFailed { action, error } => {
            set_error(model, format!("Failed to {}: {}", action, error));
            reload(model, &mut cmds);
        }
    }

    cmds
}

fn update_mouse(model: &mut Model, mouse: MouseEvent, cmds: &mut Vec<Command>) {
    if model.mode != Mode::Board {
        return;
    }
    let at = pointer(mouse.column, mouse.row);

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            let layout = model.layout();
            let Some(card) = layout.card_at(mouse.column, mouse.row) else {
                if let Some(column) = layout.column_at(mouse.column, mouse.row) {
                    model.select_column(column);
                    model.dirty = true;
                }
                return;
            };
            let task_id = card.task_id;
            match model
                .engine
                .begin_drag(&model.store, task_id, to_engine_rect(card.area), at)
            {
                Ok(()) => {
                    model.select_task(task_id);
                    model.notification = None;
                }
                Err(e @ Error::ConcurrentDrag { .. }) => klog_warn!("{}", e),
                Err(e) => set_error(model, e.to_string()),
            }
            model.dirty = true;
        }

        MouseEventKind::Drag(MouseButton::Left) => {
            if model.engine.is_dragging() {
                model.engine.update_drag_position(at);
                model.dirty = true;
            }
        }

        MouseEventKind::Up(MouseButton::Left) => {
            let Some(task_id) = model.engine.dragged_task() else {
                return;
            };
            let layout = model.layout();
            let column = layout.column_at(mouse.column, mouse.row);
            let elements = column.map(|c| layout.elements(c)).unwrap_or_default();

            match model.engine.on_drop(&mut model.store, column, at, &elements) {
                Ok(DropOutcome::Moved(pending)) => {
                    model.select_task(task_id);
                    cmds.push(Command::PersistPlacement(pending));
                }
                Ok(DropOutcome::Unchanged) => {}
                Err(e) => set_error(model, e.to_string()),
            }
            model.dirty = true;
        }

        _ => {}
    }
}

fn update_board_mode(model: &mut Model, key: KeyEvent, cmds: &mut Vec<Command>) {
    if model.engine.is_dragging() {
        if key.code == KeyCode::Esc {
            model.engine.cancel_drag();
        }
        return;
    }

    match key.code {
        KeyCode::Char('h') | KeyCode::Left => {
            model.selected_column = model.selected_column.saturating_sub(1);
            model.clamp_selection();
        }

        KeyCode::Char('l') | KeyCode::Right => {
            model.selected_column += 1;
            model.clamp_selection();
        }

        KeyCode::Char('j') | KeyCode::Down => {
            model.selected_task += 1;
            model.clamp_selection();
        }

        KeyCode::Char('k') | KeyCode::Up => {
            model.selected_task = model.selected_task.saturating_sub(1);
        }

        KeyCode::Char('n') => {
            if model.selected_column_id().is_none() {
                set_error(model, "Create a column first".to_string());
            } else {
                model.mode = Mode::Input(InputKind::NewTask);
                model.input_buffer.clear();
            }
        }

        KeyCode::Char('e') | KeyCode::Char('E') | KeyCode::Char('a') => {
            let kind = match key.code {
                KeyCode::Char('e') => InputKind::EditTask,
                KeyCode::Char('E') => InputKind::EditDescription,
                _ => InputKind::AssignTask,
            };
            let selected = model.selected_task_id().and_then(|id| model.store.task(id));
            let Some(task) = selected else {
                return;
            };
            let id = task.id;
            let prefill = match kind {
                InputKind::EditTask => task.title.clone(),
                InputKind::EditDescription => task.description.clone().unwrap_or_default(),
                _ => task
                    .assigned_to
                    .and_then(|user| model.assignable_users().into_iter().find(|u| u.id == user))
                    .map(|u| u.email.clone())
                    .unwrap_or_default(),
            };
            model.pending_edit = Some(id);
            model.input_buffer = prefill;
            model.mode = Mode::Input(kind);
        }

        KeyCode::Char('d') => {
            if let Some(id) = model.selected_task_id() {
                model.pending_delete = Some(PendingDelete::Task(id));
                model.mode = Mode::Input(InputKind::Confirm);
                model.input_buffer.clear();
            }
        }

        KeyCode::Char('N') => {
            model.mode = Mode::Input(InputKind::NewColumn);
            model.input_buffer.clear();
        }

        KeyCode::Char('R') => {
            let selected = model
                .selected_column_id()
                .and_then(|id| model.store.column(id))
                .map(|c| (c.id, c.name.clone()));
            if let Some((id, name)) = selected {
                model.pending_column = Some(id);
                model.input_buffer = name;
                model.mode = Mode::Input(InputKind::RenameColumn);
            }
        }

        KeyCode::Char('H') | KeyCode::Char('L') => {
            let offset = if key.code == KeyCode::Char('H') { -1 } else { 1 };
            if let Some(id) = model.selected_column_id() {
                if let Some(order) = model.store.shift_column(id, offset) {
                    model.select_column(id);
                    cmds.push(Command::SaveColumnOrder(order));
                }
            }
        }

        KeyCode::Char('D') => {
            if let Some(id) = model.selected_column_id() {
                model.pending_delete = Some(PendingDelete::Column(id));
                model.mode = Mode::Input(InputKind::Confirm);
                model.input_buffer.clear();
            }
        }

        KeyCode::Char('r') => reload(model, cmds),

        KeyCode::Char('?') => {
            model.show_keymap = !model.show_keymap;
        }

        KeyCode::Char('q') => cmds.push(Command::Quit),

        _ => {}
    }
}

fn update_input_mode(model: &mut Model, key: KeyEvent, kind: InputKind, cmds: &mut Vec<Command>) {
    if kind == InputKind::Confirm {
        let pending = model.pending_delete.take();
        model.mode = Mode::Board;
        if matches!(key.code, KeyCode::Char('y') | KeyCode::Enter) {
            match pending {
                Some(PendingDelete::Task(id)) => cmds.push(Command::DeleteTask(id)),
                Some(PendingDelete::Column(id)) => cmds.push(Command::DeleteColumn(id)),
                None => {}
            }
        }
        return;
    }

    match key.code {
        KeyCode::Enter => {
            let value = std::mem::take(&mut model.input_buffer);
            model.mode = Mode::Board;
            submit_input(model, kind, &value, cmds);
        }

        KeyCode::Esc => {
            model.input_buffer.clear();
            model.pending_edit = None;
            model.pending_column = None;
            model.draft_task = None;
            model.mode = Mode::Board;
        }

        KeyCode::Backspace => {
            model.input_buffer.pop();
        }

        KeyCode::Char(c) => {
            model.input_buffer.push(c);
        }

        _ => {}
    }
}

fn submit_input(model: &mut Model, kind: InputKind, value: &str, cmds: &mut Vec<Command>) {
    let project_id = model.project_id;
    match kind {
        InputKind::NewTask => {
            let Some(column_id) = model.selected_column_id() else {
                set_error(model, "Create a column first".to_string());
                return;
            };
            match NewTask::new(project_id, column_id, value, None) {
                Ok(task) => {
                    let assignee = model.current_user.as_ref().map(|u| u.id);
                    model.draft_task = Some(task.assigned_to(assignee));
                    model.mode = Mode::Input(InputKind::NewTaskDescription);
                }
                Err(e) => set_error(model, e.to_string()),
            }
        }
        InputKind::NewTaskDescription => {
            if let Some(task) = model.draft_task.take() {
                cmds.push(Command::CreateTask(task.with_description(value)));
            }
        }
        InputKind::EditTask => {
            let Some(id) = model.pending_edit.take() else {
                return;
            };
            let title = value.trim();
            if title.is_empty() {
                set_error(model, "Task title is required".to_string());
            } else {
                cmds.push(Command::UpdateTask {
                    id,
                    patch: TaskPatch::title(title),
                });
            }
        }
        InputKind::EditDescription => {
            if let Some(id) = model.pending_edit.take() {
                cmds.push(Command::UpdateTask {
                    id,
                    patch: TaskPatch::description(value),
                });
            }
        }
        InputKind::AssignTask => {
            let Some(id) = model.pending_edit.take() else {
                return;
            };
            match model.find_assignee(value).map(|u| u.id) {
                Some(user) => cmds.push(Command::UpdateTask {
                    id,
                    patch: TaskPatch::assign(user),
                }),
                None => set_error(model, format!("No project member matches '{}'", value.trim())),
            }
        }
        InputKind::NewColumn => match NewColumn::new(project_id, value) {
            Ok(column) => cmds.push(Command::CreateColumn(column)),
            Err(e) => set_error(model, e.to_string()),
        },
        InputKind::RenameColumn => {
            let Some(column) = model.pending_column.take().and_then(|id| model.store.column(id))
            else {
                return;
            };
            let (id, position) = (column.id, column.position);
            let name = value.trim();
            if name.is_empty() {
                set_error(model, "Column name is required".to_string());
            } else {
                cmds.push(Command::RenameColumn {
                    id,
                    update: ColumnUpdate {
                        name: name.to_string(),
                        position,
                    },
                });
            }
        }
        InputKind::Confirm => {}
    }
}
