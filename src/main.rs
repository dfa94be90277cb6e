use std::io::{self, stdout, BufRead, IsTerminal, Stdout};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use crossbeam_channel::{Receiver, TryRecvError};
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use dialoguer::Password;
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::runtime::Runtime;

use kanban_board::api::{
    BoardApi, Credentials, HttpBoardApi, MemoryBoardApi, ProfileUpdate, Registration,
};
use kanban_board::app::LogicThread;
use kanban_board::config::Config;
use kanban_board::core::{NewProject, ProjectId, DEFAULT_COLUMNS};
use kanban_board::credentials::{CredentialStore, StoredSession};
use kanban_board::render::RenderState;
use kanban_board::tea::Model;
use kanban_board::{klog, klog_warn, ui, Error, Result};

const FRAME_DURATION: Duration = Duration::from_micros(16_666); // 60fps

/// Read by `login` and `register` before prompting.
const PASSWORD_ENV: &str = "KANBAN_PASSWORD";

/// Kanban - terminal client for a kanban board backend
#[derive(Parser, Debug)]
#[command(name = "kanban")]
#[command(version, about, long_about = None)]
#[command(after_help = "ENVIRONMENT:\n    KANBAN_DEBUG=1         Enable debug logging (alternative to --debug)\n    KANBAN_BACKEND_URL     Backend base URL (alternative to --backend)\n    KANBAN_PASSWORD        Password for login/register (otherwise prompted, or read from piped stdin)")]
pub struct Cli {
    /// Enable debug logging (writes to ~/.kanban/kanban.log)
    #[arg(short = 'd', long, global = true)]
    pub debug: bool,

    /// Backend base URL, overrides the config file
    #[arg(short = 'b', long, global = true)]
    pub backend: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Open a project board
    Board {
        project_id: ProjectId,
    },

    /// Open a sample board backed by memory (no server needed)
    Demo,

    /// List projects visible to the current user
    Projects,

    /// Create a project with its columns
    CreateProject {
        name: String,

        /// Comma-separated column names
        #[arg(long, value_delimiter = ',')]
        columns: Vec<String>,

        /// Comma-separated member emails
        #[arg(long, value_delimiter = ',')]
        members: Vec<String>,
    },

    /// Delete a project and everything on it
    DeleteProject {
        project_id: ProjectId,
    },

    /// Log in and remember the access token
    Login {
        email: String,
    },

    /// Create an account
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
    },

    /// Forget the stored access token
    Logout,

    /// Show the logged-in user
    Whoami,

    /// Change the logged-in user's name
    UpdateProfile {
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        middle_name: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    kanban_board::log::init_with_debug(cli.debug);
    klog!("Kanban starting (debug={})", cli.debug);

    let mut config = Config::load()?;
    if let Some(url) = cli.backend.clone() {
        config.backend_url = url;
    }

    match cli.command {
        Command::Board { project_id } => {
            let session = CredentialStore::open_default()?.load_sync()?;
            let api = HttpBoardApi::new(&config.backend_url, config.request_timeout())?
                .with_token(session.access_token);
            let label = config.backend_url.clone();
            let model = Model::new(project_id, config, &label).with_user(session.user);
            run_tui(Arc::new(api), model)
        }
        Command::Demo => {
            let (api, project_id) = MemoryBoardApi::demo();
            let model = Model::new(project_id, config, "memory")
                .with_user(Some(MemoryBoardApi::demo_user()));
            run_tui(Arc::new(api), model)
        }
        other => Runtime::new()?.block_on(run_command(other, &config)),
    }
}

/// Non-interactive subcommands, printed to stdout.
async fn run_command(command: Command, config: &Config) -> Result<()> {
    let store = CredentialStore::open_default()?;
    let session = store.load().await?;
    let api = HttpBoardApi::new(&config.backend_url, config.request_timeout())?
        .with_token(session.access_token.clone());

    match command {
        Command::Projects => {
            let projects = api.list_projects().await?;
            if projects.is_empty() {
                println!("No projects.");
            }
            for project in projects {
                println!("{:>6}  {}", project.id, project.name);
            }
        }

        Command::CreateProject {
            name,
            columns,
            members,
        } => {
            let columns = if columns.is_empty() {
                DEFAULT_COLUMNS.iter().map(|c| c.to_string()).collect()
            } else {
                columns
            };
            let mut project = NewProject::new(&name, &columns, &members)?;
            project.created_by = session.user.as_ref().map(|u| u.id);
            let created = api.create_project(project).await?;
            println!("Created project {} ({})", created.name, created.id);
        }

        Command::DeleteProject { project_id } => {
            api.delete_project(project_id).await?;
            println!("Deleted project {}", project_id);
        }

        Command::Login { email } => {
            let password = read_password(false)?;
            let response = api.login(&Credentials { email, password }).await?;
            let api = api.with_token(response.token.clone());
            let user = match response.user {
                Some(user) => Some(user),
                None => api.me().await.ok(),
            };
            if let Some(ref user) = user {
                println!("Logged in as {}", user.display_name());
            } else {
                println!("Logged in");
            }
            store
                .save(StoredSession {
                    access_token: response.token,
                    user,
                    saved_at: None,
                })
                .await?;
        }

        Command::Register {
            email,
            first_name,
            last_name,
        } => {
            let password = read_password(true)?;
            let registration = Registration {
                email,
                password,
                first_name,
                last_name,
            };
            registration.validate()?;
            api.register(&registration).await?;
            println!("Registered {}. Log in to continue.", registration.email);
        }

        Command::Logout => {
            if session.access_token.is_some() {
                if let Err(e) = api.logout().await {
                    klog_warn!("Backend logout failed, clearing local session anyway: {}", e);
                }
            }
            store.clear().await?;
            println!("Logged out");
        }

        Command::Whoami => {
            let user = api.me().await?;
            println!("{} <{}> (id {})", user.display_name(), user.email, user.id);
        }

        Command::UpdateProfile {
            first_name,
            last_name,
            middle_name,
        } => {
            let user = match session.user {
                Some(user) => user,
                None => api.me().await?,
            };
            let update = ProfileUpdate {
                first_name,
                last_name,
                middle_name,
            };
            let user = api.update_profile(user.id, &update).await?;
            println!("Profile updated: {}", user.display_name());
            store
                .save(StoredSession {
                    access_token: session.access_token,
                    user: Some(user),
                    saved_at: None,
                })
                .await?;
        }

        Command::Board { .. } | Command::Demo => {
            return Err(Error::Validation("Board commands need a terminal".to_string()));
        }
    }

    Ok(())
}

/// The password from `KANBAN_PASSWORD`, an interactive prompt, or the
/// first line of piped stdin, in that order.
fn read_password(confirm: bool) -> Result<String> {
    if let Ok(password) = std::env::var(PASSWORD_ENV) {
        return Ok(password);
    }
    if io::stdin().is_terminal() {
        let mut prompt = Password::new().with_prompt("Password");
        if confirm {
            prompt = prompt.with_confirmation("Repeat password", "Passwords do not match");
        }
        return prompt
            .interact()
            .map_err(|e| Error::Prompt(e.to_string()));
    }
    read_password_line(io::stdin().lock())
}

fn read_password_line(mut reader: impl BufRead) -> Result<String> {
    let mut line = String::new();
    reader.read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']);
    if password.is_empty() {
        return Err(Error::Validation("Password is required".to_string()));
    }
    Ok(password.to_string())
}

fn run_tui(api: Arc<dyn BoardApi>, model: Model) -> Result<()> {
    let shutdown = Arc::new(AtomicBool::new(false));
    let (state_tx, state_rx) = crossbeam_channel::bounded::<RenderState>(1);

    let shutdown_clone = shutdown.clone();
    let logic_handle =
        thread::spawn(move || LogicThread::run(api, model, state_tx, shutdown_clone));

    let mut terminal = setup_terminal()?;
    let result = render_loop(&mut terminal, state_rx, &shutdown);

    shutdown.store(true, Ordering::SeqCst);
    let logic_result = logic_handle
        .join()
        .map_err(|_| Error::TaskJoin("logic thread panicked".to_string()))?;
    restore_terminal(&mut terminal)?;
    klog!("Kanban exiting");
    result.and(logic_result)
}

fn render_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    state_rx: Receiver<RenderState>,
    shutdown: &AtomicBool,
) -> Result<()> {
    let mut state = RenderState::default();
    let mut last_version: u64 = 0;
    let mut last_frame = Instant::now();
    let mut dirty = true;

    loop {
        if shutdown.load(Ordering::Relaxed) {
            break;
        }

        match state_rx.try_recv() {
            Ok(s) => {
                dirty = dirty || s.version != last_version;
                state = s;
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => break,
        }

        if last_frame.elapsed() < FRAME_DURATION {
            thread::sleep(Duration::from_micros(500));
            continue;
        }
        last_frame = Instant::now();

        if dirty {
            terminal.draw(|f| ui::draw(f, &state))?;
            last_version = state.version;
            dirty = false;
        }
    }
    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    execute!(io::stdout(), EnterAlternateScreen, EnableMouseCapture)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    terminal.hide_cursor()?;
    terminal.clear()?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    terminal.show_cursor()?;
    execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen)?;
    Ok(disable_raw_mode()?)
}
