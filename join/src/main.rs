//! Kanban board and address book in the terminal.
//!
//! Without a subcommand (or with `board`) the interactive board opens;
//! every other subcommand prints a report and exits. Configuration via CLI
//! flags, environment variables, or config file
//! (`~/.config/join/config.toml`).
//!
//! ```bash
//! # Start a local store, then open the board
//! cargo run --bin join-store
//! cargo run --bin join
//!
//! # Batch commands
//! cargo run --bin join -- guest
//! cargo run --bin join -- task add "Write docs" --due 2026-08-01 --category "User Story"
//! JOIN_STORE_URL=http://127.0.0.1:9100 cargo run --bin join -- summary
//! ```

use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use chrono::Timelike;
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend, layout::Rect};
use tokio::sync::mpsc;
use tracing_appender::non_blocking::WorkerGuard;

use join::app::App;
use join::board::BoardService;
use join::commands::Runner;
use join::config::{CliArgs, ClientConfig, Command};
use join::session::SessionStore;
use join::store::HttpStore;
use join::ui;
use join::worker::{self, BoardCommand, BoardEvent};
use join_core::user::greeting;

#[tokio::main]
async fn main() -> io::Result<()> {
    let cli = CliArgs::parse();

    // Load and resolve configuration (CLI args > env > config file > defaults).
    let config = match ClientConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    // Initialize logging before terminal setup (logs go to file, not stdout).
    let _log_guard = init_logging(&cli.log_level, cli.log_file.as_deref());

    tracing::info!(store = %config.store_url, "join starting");

    let store = match HttpStore::new(&config.store_url, config.request_timeout) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    let session = SessionStore::new(config.session_file.clone());

    match cli.command {
        None | Some(Command::Board) => run_board(store, &session, &config).await,
        Some(command) => {
            let runner = Runner::new(store, session);
            if let Err(e) = runner.run(command, &mut io::stdout()).await {
                tracing::warn!(error = %e, "command failed");
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
            Ok(())
        }
    }
}

/// Initialize file-based logging.
///
/// Logs are written to a file (never stdout, since ratatui owns the terminal).
/// Returns a [`WorkerGuard`] that must be held until shutdown to ensure all
/// buffered log entries are flushed.
fn init_logging(level: &str, file_path: Option<&Path>) -> Option<WorkerGuard> {
    let default_path = std::env::temp_dir().join("join.log");
    let log_path = file_path.unwrap_or(&default_path);

    let log_dir = log_path.parent()?;
    let file_name = log_path.file_name()?.to_str()?;

    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .init();

    Some(guard)
}

/// Sets up the terminal, runs the board and restores the terminal.
async fn run_board(store: Arc<HttpStore>, session: &SessionStore, config: &ClientConfig) -> io::Result<()> {
    let user = match session.load() {
        Ok(data) => data.active_user,
        Err(e) => {
            tracing::warn!(error = %e, "session unreadable, continuing without user");
            None
        }
    };
    let mut app = App::new(config).with_user(user);
    if session.take_greeting().unwrap_or(false)
        && let Some(user) = &app.user
    {
        let (salutation, name) = greeting(user, chrono::Local::now().hour());
        app.status_message = Some(name.map_or_else(|| salutation.clone(), |n| format!("{salutation} {n}")));
    }

    let (cmd_tx, evt_rx) = worker::spawn_worker(
        BoardService::new(store, config.commit_policy),
        worker::DEFAULT_CHANNEL_CAPACITY,
    );

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, &cmd_tx, evt_rx, config);

    // Restore terminal.
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    let _ = cmd_tx.send(BoardCommand::Shutdown).await;
    tracing::info!("join exiting");
    result
}

/// Main application loop.
fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    cmd_tx: &mpsc::Sender<BoardCommand>,
    mut evt_rx: mpsc::Receiver<BoardEvent>,
    config: &ClientConfig,
) -> io::Result<()> {
    send(app, cmd_tx, BoardCommand::Reload);

    loop {
        // Step 1: Lay out for the current size and draw.
        let size = terminal.size()?;
        app.resize(Rect::new(0, 0, size.width, size.height));
        terminal.draw(|frame| ui::draw(frame, app))?;

        // Step 2: Drain all pending BoardEvents (non-blocking).
        while let Ok(event) = evt_rx.try_recv() {
            app.apply_event(event);
        }

        // Step 3: Promote held presses and run scroll frames.
        let now = Instant::now();
        app.tick(now);

        // Step 4: Poll for terminal input, waking early for a pending
        // long-press or scroll frame.
        let mut timeout = config.poll_timeout;
        if app.surface.pending_frames() > 0 {
            timeout = timeout.min(config.frame_interval);
        }
        if let Some(deadline) = app.deadline() {
            timeout = timeout.min(deadline.saturating_duration_since(now));
        }

        if event::poll(timeout)? {
            let command = match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key_event(key),
                Event::Mouse(mouse) => app.handle_mouse_event(mouse, Instant::now()),
                Event::Resize(width, height) => {
                    app.resize(Rect::new(0, 0, width, height));
                    None
                }
                _ => None,
            };
            if let Some(command) = command {
                send(app, cmd_tx, command);
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn send(app: &mut App, cmd_tx: &mpsc::Sender<BoardCommand>, command: BoardCommand) {
    match cmd_tx.try_send(command) {
        Ok(()) => {}
        Err(mpsc::error::TrySendError::Full(_)) => {
            app.status_message = Some("Store busy, try again".to_string());
        }
        Err(mpsc::error::TrySendError::Closed(_)) => {
            app.status_message = Some("Board worker stopped".to_string());
        }
    }
}
