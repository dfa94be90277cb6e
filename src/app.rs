use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::Sender;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::layout::Rect;
use tokio::runtime::Runtime;
use tokio::sync::mpsc;

use crate::actors::{ActorHandle, RefreshActor};
use crate::api::BoardApi;
use crate::render::RenderState;
use crate::tea::{update, Command, Message, Model};
use crate::util::with_timeout;
use crate::{klog_debug, klog_error, klog_warn, Result};

const MAX_BG_MESSAGES: usize = 50;

/// Runs commands against the backend. Every command becomes a spawned task
/// that reports back with a [`Message`].
#[derive(Clone)]
pub struct CommandRunner {
    api: Arc<dyn BoardApi>,
    msg_tx: mpsc::UnboundedSender<Message>,
    timeout: Duration,
}

impl CommandRunner {
    pub fn new(
        api: Arc<dyn BoardApi>,
        msg_tx: mpsc::UnboundedSender<Message>,
        timeout: Duration,
    ) -> Self {
        Self {
            api,
            msg_tx,
            timeout,
        }
    }

    /// Start `cmd`. Returns `true` when the app should quit.
    pub fn execute(&self, model: &Model, cmd: Command) -> bool {
        let api = self.api.clone();
        let tx = self.msg_tx.clone();
        let timeout = self.timeout;
        let project_id = model.project_id;

        match cmd {
            Command::LoadBoard { seq } => {
                klog_debug!("Command::LoadBoard seq={}", seq);
                tokio::spawn(async move {
                    let msg = match with_timeout(timeout, api.fetch_project_snapshot(project_id)).await
                    {
                        Ok(snapshot) => Message::BoardLoaded { seq, snapshot },
                        Err(e) => {
                            klog_error!("Board load failed: {}", e);
                            Message::LoadFailed {
                                seq,
                                error: e.to_string(),
                            }
                        }
                    };
                    let _ = tx.send(msg);
                });
            }

            Command::RefreshTasks { seq } => {
                klog_debug!("Command::RefreshTasks seq={}", seq);
                tokio::spawn(async move {
                    let msg = match with_timeout(timeout, api.fetch_tasks(project_id)).await {
                        Ok(tasks) => Message::TasksRefreshed { seq, tasks },
                        Err(e) => {
                            klog_warn!("Task refresh failed: {}", e);
                            Message::RefreshFailed(e.to_string())
                        }
                    };
                    let _ = tx.send(msg);
                });
            }

            Command::PersistPlacement(pending) => {
                klog_debug!(
                    "Command::PersistPlacement task={} to={}",
                    pending.task_id(),
                    pending.to()
                );
                tokio::spawn(async move {
                    let result = with_timeout(
                        timeout,
                        api.update_task_placement(pending.task_id(), pending.to()),
                    )
                    .await;
                    let msg = match result {
                        Ok(task) => Message::PlacementPersisted(task),
                        Err(e) => Message::PlacementFailed {
                            pending,
                            error: e.to_string(),
                        },
                    };
                    let _ = tx.send(msg);
                });
            }

            Command::CreateTask(task) => {
                klog_debug!("Command::CreateTask title={}", task.title);
                tokio::spawn(async move {
                    let msg = match with_timeout(timeout, api.create_task(task)).await {
                        Ok(task) => Message::TaskCreated(task),
                        Err(e) => failed("create task", e),
                    };
                    let _ = tx.send(msg);
                });
            }

            Command::UpdateTask { id, patch } => {
                klog_debug!("Command::UpdateTask id={}", id);
                tokio::spawn(async move {
                    let msg = match with_timeout(timeout, api.update_task(id, patch)).await {
                        Ok(task) => Message::TaskUpdated(task),
                        Err(e) => failed("update task", e),
                    };
                    let _ = tx.send(msg);
                });
            }

            Command::DeleteTask(id) => {
                klog_debug!("Command::DeleteTask id={}", id);
                tokio::spawn(async move {
                    let msg = match with_timeout(timeout, api.delete_task(id)).await {
                        Ok(()) => Message::TaskDeleted(id),
                        Err(e) => failed("delete task", e),
                    };
                    let _ = tx.send(msg);
                });
            }

            Command::CreateColumn(column) => {
                klog_debug!("Command::CreateColumn name={}", column.name);
                tokio::spawn(async move {
                    let msg = match with_timeout(timeout, api.create_column(column)).await {
                        Ok(column) => Message::ColumnCreated(column),
                        Err(e) => failed("create column", e),
                    };
                    let _ = tx.send(msg);
                });
            }

            Command::RenameColumn { id, update } => {
                klog_debug!("Command::RenameColumn id={} name={}", id, update.name);
                tokio::spawn(async move {
                    let msg = match with_timeout(timeout, api.update_column(id, update)).await {
                        Ok(column) => Message::ColumnUpdated(column),
                        Err(e) => failed("rename column", e),
                    };
                    let _ = tx.send(msg);
                });
            }

            Command::SaveColumnOrder(columns) => {
                klog_debug!("Command::SaveColumnOrder columns={}", columns.len());
                tokio::spawn(async move {
                    let save = async {
                        for column in columns {
                            let update = crate::core::ColumnUpdate {
                                name: column.name,
                                position: column.position,
                            };
                            api.update_column(column.id, update).await?;
                        }
                        Ok::<(), crate::Error>(())
                    };
                    let msg = match with_timeout(timeout, save).await {
                        Ok(()) => Message::ColumnOrderSaved,
                        Err(e) => failed("save column order", e),
                    };
                    let _ = tx.send(msg);
                });
            }

            Command::DeleteColumn(id) => {
                klog_debug!("Command::DeleteColumn id={}", id);
                tokio::spawn(async move {
                    let msg = match with_timeout(timeout, api.delete_column(id)).await {
                        Ok(()) => Message::ColumnDeleted(id),
                        Err(e) => failed("delete column", e),
                    };
                    let _ = tx.send(msg);
                });
            }

            Command::Quit => {
                klog_debug!("Command::Quit");
                return true;
            }
        }

        false
    }
}

fn failed(action: &str, e: crate::Error) -> Message {
    klog_warn!("Failed to {}: {}", action, e);
    Message::OperationFailed {
        action: action.to_string(),
        error: e.to_string(),
    }
}

pub struct LogicThread;

impl LogicThread {
    pub fn run(
        api: Arc<dyn BoardApi>,
        model: Model,
        state_tx: Sender<RenderState>,
        shutdown: Arc<AtomicBool>,
    ) -> Result<()> {
        Runtime::new()?.block_on(Self::run_async(api, model, state_tx, shutdown))
    }

    async fn run_async(
        api: Arc<dyn BoardApi>,
        mut model: Model,
        state_tx: Sender<RenderState>,
        shutdown: Arc<AtomicBool>,
    ) -> Result<()> {
        klog_debug!(
            "LogicThread::run_async project={} backend={}",
            model.project_id,
            model.backend_label
        );
        let (width, height) = crossterm::terminal::size()?;
        model.viewport = Rect::new(0, 0, width, height);

        let (msg_tx, mut msg_rx) = mpsc::unbounded_channel::<Message>();
        let runner = CommandRunner::new(api, msg_tx.clone(), model.config.request_timeout());
        let actors = spawn_actors(&model, msg_tx.clone());

        let seq = model.begin_load();
        runner.execute(&model, Command::LoadBoard { seq });
        send_state(&state_tx, &model);

        loop {
            if shutdown.load(Ordering::Relaxed) {
                break;
            }

            // Terminal input (priority)
            while event::poll(Duration::ZERO)? {
                let msg = match event::read()? {
                    Event::Key(key) if key.kind != KeyEventKind::Release => Message::Key(key),
                    Event::Mouse(mouse) => Message::Mouse(mouse),
                    Event::Resize(w, h) => Message::Resize(w, h),
                    _ => continue,
                };

                if dispatch(&mut model, msg, &runner) {
                    shutdown.store(true, Ordering::Relaxed);
                    shutdown_actors(&actors);
                    return Ok(());
                }

                if model.dirty {
                    send_state(&state_tx, &model);
                    model.dirty = false;
                }
            }

            // Background messages (bounded)
            for _ in 0..MAX_BG_MESSAGES {
                let Ok(msg) = msg_rx.try_recv() else { break };
                if dispatch(&mut model, msg, &runner) {
                    shutdown.store(true, Ordering::Relaxed);
                    shutdown_actors(&actors);
                    return Ok(());
                }
            }

            if model.dirty {
                send_state(&state_tx, &model);
                model.dirty = false;
            }

            tokio::time::sleep(Duration::from_micros(500)).await;
        }

        shutdown_actors(&actors);
        Ok(())
    }
}

/// Feed one message through `update` and run the resulting commands.
/// Returns `true` when a command asked to quit.
pub fn dispatch(model: &mut Model, msg: Message, runner: &CommandRunner) -> bool {
    let mut quit = false;
    for cmd in update(model, msg) {
        quit |= runner.execute(model, cmd);
    }
    quit
}

fn send_state(state_tx: &Sender<RenderState>, model: &Model) {
    let _ = state_tx.try_send(model.snapshot());
}

fn spawn_actors(model: &Model, msg_tx: mpsc::UnboundedSender<Message>) -> Vec<ActorHandle> {
    match model.config.auto_refresh() {
        Some(interval) => {
            klog_debug!("Spawning refresh actor every {:?}", interval);
            vec![RefreshActor::new(msg_tx, interval).spawn()]
        }
        None => Vec::new(),
    }
}

fn shutdown_actors(actors: &[ActorHandle]) {
    klog_debug!("Shutting down {} actors", actors.len());
    for actor in actors {
        actor.shutdown();
    }
}
