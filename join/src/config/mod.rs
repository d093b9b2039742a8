//! Configuration system for the Join client.
//!
//! Supports layered configuration with the following priority (highest first):
//! 1. CLI arguments
//! 2. Environment variables (via clap `env` attribute)
//! 3. TOML config file (`~/.config/join/config.toml`)
//! 4. Compiled defaults
//!
//! Missing config file is not an error (defaults are used). An explicit
//! `--config` path that doesn't exist is an error.

use std::path::PathBuf;
use std::time::Duration;

use join_core::drag::{ActivationMode, DragConfig, GateConfig, ScrollConfig};

use crate::board::CommitPolicy;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse the TOML configuration.
    #[error("failed to parse config file: {0}")]
    ParseToml(#[from] toml::de::Error),
}

// ---------------------------------------------------------------------------
// TOML file structs (all fields Option for partial overrides)
// ---------------------------------------------------------------------------

/// Top-level TOML config file structure.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ConfigFile {
    store: StoreFileConfig,
    drag: DragFileConfig,
    ui: UiFileConfig,
    session: SessionFileConfig,
}

/// `[store]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct StoreFileConfig {
    url: Option<String>,
    request_timeout_ms: Option<u64>,
}

/// `[drag]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct DragFileConfig {
    long_press_ms: Option<u64>,
    jitter: Option<f64>,
    edge_zone: Option<f64>,
    max_scroll_speed: Option<f64>,
    haptic_ms: Option<u64>,
    pointer_mode: Option<PointerMode>,
    commit_policy: Option<CommitPolicy>,
}

/// `[ui]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct UiFileConfig {
    poll_timeout_ms: Option<u64>,
    frame_interval_ms: Option<u64>,
    max_visible_assignees: Option<usize>,
}

/// `[session]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct SessionFileConfig {
    file: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Resolved configuration (concrete types, all fields populated)
// ---------------------------------------------------------------------------

/// How mouse input is fed to the drag engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum PointerMode {
    /// Press and hold on a card before it lifts, like a touch screen.
    Touch,
    /// The card lifts as soon as it is pressed.
    Native,
}

impl From<PointerMode> for ActivationMode {
    fn from(mode: PointerMode) -> Self {
        match mode {
            PointerMode::Touch => Self::Touch,
            PointerMode::Native => Self::Native,
        }
    }
}

/// Fully resolved client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    // -- Store --
    /// Base URL of the document store.
    pub store_url: String,
    /// Per-request timeout.
    pub request_timeout: Duration,

    // -- Drag --
    /// Drag engine tunables.
    pub drag: DragConfig,
    /// Mouse input mapping.
    pub pointer_mode: PointerMode,
    /// What happens after a drop's status write.
    pub commit_policy: CommitPolicy,

    // -- UI --
    /// Poll timeout for the TUI event loop.
    pub poll_timeout: Duration,
    /// Interval between auto-scroll frames.
    pub frame_interval: Duration,
    /// Assignee badges shown on a card before `+N`.
    pub max_visible_assignees: usize,

    // -- Session --
    /// Where the logged-in user is remembered.
    pub session_file: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            store_url: "http://127.0.0.1:9100".to_string(),
            request_timeout: Duration::from_secs(10),
            drag: DragConfig::default(),
            pointer_mode: PointerMode::Touch,
            commit_policy: CommitPolicy::ReloadAlways,
            poll_timeout: Duration::from_millis(50),
            frame_interval: Duration::from_millis(16),
            max_visible_assignees: join_core::board::MAX_VISIBLE_ASSIGNEES,
            session_file: default_session_file(),
        }
    }
}

impl ClientConfig {
    /// Load configuration by merging CLI args, env vars, and a TOML file.
    ///
    /// If `--config` is given and the file does not exist, returns an error.
    /// If no `--config` is given, the default path
    /// (`~/.config/join/config.toml`) is tried and silently ignored if
    /// missing.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the explicit config file cannot be read
    /// or parsed.
    pub fn load(cli: &CliArgs) -> Result<Self, ConfigError> {
        let file = load_config_file(cli.config.as_deref())?;
        Ok(Self::resolve(cli, &file))
    }

    /// Priority: CLI > file > default.
    #[must_use]
    fn resolve(cli: &CliArgs, file: &ConfigFile) -> Self {
        let defaults = Self::default();
        let gate = defaults.drag.gate;
        let scroll = defaults.drag.scroll;

        Self {
            store_url: cli
                .store_url
                .clone()
                .or_else(|| file.store.url.clone())
                .unwrap_or(defaults.store_url),
            request_timeout: file
                .store
                .request_timeout_ms
                .map_or(defaults.request_timeout, Duration::from_millis),
            drag: DragConfig {
                gate: GateConfig {
                    dwell: file
                        .drag
                        .long_press_ms
                        .map_or(gate.dwell, Duration::from_millis),
                    jitter: file.drag.jitter.unwrap_or(gate.jitter),
                },
                scroll: ScrollConfig {
                    edge_zone: file.drag.edge_zone.unwrap_or(scroll.edge_zone),
                    max_speed: file.drag.max_scroll_speed.unwrap_or(scroll.max_speed),
                },
                haptic: file
                    .drag
                    .haptic_ms
                    .map_or(defaults.drag.haptic, Duration::from_millis),
            },
            pointer_mode: cli
                .pointer_mode
                .or(file.drag.pointer_mode)
                .unwrap_or(defaults.pointer_mode),
            commit_policy: cli
                .commit_policy
                .or(file.drag.commit_policy)
                .unwrap_or(defaults.commit_policy),
            poll_timeout: file
                .ui
                .poll_timeout_ms
                .map_or(defaults.poll_timeout, Duration::from_millis),
            frame_interval: file
                .ui
                .frame_interval_ms
                .map_or(defaults.frame_interval, Duration::from_millis),
            max_visible_assignees: file
                .ui
                .max_visible_assignees
                .unwrap_or(defaults.max_visible_assignees),
            session_file: cli
                .session_file
                .clone()
                .or_else(|| file.session.file.clone())
                .unwrap_or(defaults.session_file),
        }
    }
}

/// CLI arguments parsed by clap.
#[derive(clap::Parser, Debug, Default)]
#[command(version, about = "Kanban board and address book in the terminal")]
pub struct CliArgs {
    /// Base URL of the document store.
    #[arg(long, env = "JOIN_STORE_URL")]
    pub store_url: Option<String>,

    /// Path to config file (default: `~/.config/join/config.toml`).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// How mouse presses start a drag.
    #[arg(long, value_enum)]
    pub pointer_mode: Option<PointerMode>,

    /// What to do after a dropped card's status is written.
    #[arg(long, value_enum)]
    pub commit_policy: Option<CommitPolicy>,

    /// Where the logged-in user is remembered.
    #[arg(long, env = "JOIN_SESSION_FILE")]
    pub session_file: Option<PathBuf>,

    /// Log level filter (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", env = "JOIN_LOG")]
    pub log_level: String,

    /// Path to log file (default: `$TMPDIR/join.log`).
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// What to do; opens the board when omitted.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Top-level subcommands.
#[derive(clap::Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Open the interactive board.
    Board,
    /// Print task counts and the next urgent deadline.
    Summary,
    /// Manage tasks.
    #[command(subcommand)]
    Task(TaskCommand),
    /// Manage the address book.
    #[command(subcommand)]
    Contact(ContactCommand),
    /// Create an account and log in.
    Signup {
        /// Full name.
        name: String,
        /// Login email.
        email: String,
        /// Password.
        password: String,
        /// Password again.
        #[arg(long)]
        confirm: String,
        /// Accept the privacy policy.
        #[arg(long)]
        accept_policy: bool,
    },
    /// Log in with email and password.
    Login {
        /// Login email.
        email: String,
        /// Password.
        password: String,
    },
    /// Continue as the shared guest user.
    Guest,
    /// Forget the logged-in user.
    Logout,
    /// Show the logged-in user and greeting.
    Whoami,
}

/// `task` subcommands.
#[derive(clap::Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum TaskCommand {
    /// List tasks by column.
    List {
        /// Only tasks whose title or description contains this.
        #[arg(long)]
        query: Option<String>,
    },
    /// Create a task.
    Add {
        /// Card heading.
        title: String,
        /// Longer text.
        #[arg(long, default_value = "")]
        description: String,
        /// Due date, `YYYY-MM-DD`.
        #[arg(long)]
        due: String,
        /// `urgent`, `medium` or `low`.
        #[arg(long, default_value = "medium")]
        priority: String,
        /// "Technical Task" or "User Story".
        #[arg(long)]
        category: String,
        /// Starting column.
        #[arg(long, default_value = "todo")]
        status: String,
        /// Checklist entry; repeatable.
        #[arg(long = "subtask")]
        subtasks: Vec<String>,
        /// Contact id to assign; repeatable.
        #[arg(long = "assignee")]
        assignees: Vec<String>,
    },
    /// Edit a task; omitted flags keep the stored value.
    Edit {
        /// Task id.
        id: String,
        /// New heading.
        #[arg(long)]
        title: Option<String>,
        /// New longer text.
        #[arg(long)]
        description: Option<String>,
        /// New due date, `YYYY-MM-DD`.
        #[arg(long)]
        due: Option<String>,
        /// `urgent`, `medium` or `low`.
        #[arg(long)]
        priority: Option<String>,
        /// Replacement checklist; repeatable. Entries with unchanged text keep their tick.
        #[arg(long = "subtask")]
        subtasks: Vec<String>,
        /// Replacement assignees by contact id; repeatable.
        #[arg(long = "assignee")]
        assignees: Vec<String>,
    },
    /// Move a task to another column.
    Move {
        /// Task id.
        id: String,
        /// Target column.
        status: String,
    },
    /// Delete a task.
    Delete {
        /// Task id.
        id: String,
    },
    /// Tick or untick a checklist entry.
    ToggleSubtask {
        /// Task id.
        id: String,
        /// Subtask id.
        subtask: String,
    },
}

/// `contact` subcommands.
#[derive(clap::Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ContactCommand {
    /// List contacts grouped by initial.
    List,
    /// Add a contact.
    Add {
        /// Full name.
        name: String,
        /// Email address.
        email: String,
        /// Phone number.
        phone: String,
    },
    /// Change a contact.
    Edit {
        /// Contact id.
        id: String,
        /// New name.
        #[arg(long)]
        name: Option<String>,
        /// New email.
        #[arg(long)]
        email: Option<String>,
        /// New phone number.
        #[arg(long)]
        phone: Option<String>,
    },
    /// Delete a contact.
    Delete {
        /// Contact id.
        id: String,
    },
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn default_session_file() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("join")
        .join("session.json")
}

/// Load and parse a TOML config file.
///
/// If `explicit_path` is `Some`, the file must exist (error if not).
/// If `explicit_path` is `None`, the default path is tried and missing file
/// is treated as empty config.
fn load_config_file(explicit_path: Option<&std::path::Path>) -> Result<ConfigFile, ConfigError> {
    let path = if let Some(p) = explicit_path {
        let contents = std::fs::read_to_string(p).map_err(|e| ConfigError::ReadFile {
            path: p.to_path_buf(),
            source: e,
        })?;
        return Ok(toml::from_str(&contents)?);
    } else {
        let Some(config_dir) = dirs::config_dir() else {
            return Ok(ConfigFile::default());
        };
        config_dir.join("join").join("config.toml")
    };

    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ConfigFile::default()),
        Err(e) => Err(ConfigError::ReadFile { path, source: e }),
    }
}
